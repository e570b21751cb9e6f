//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Inspect and transform single files.
pub mod apply;
pub mod probe;

/// Module containing the implementation of the `run` command.
/// This command generates numbered variants for a directory of uploads.
pub mod run;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// RNG for a command: seeded when requested, entropy-backed otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            log::debug!("Using RNG seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}
