// vidmorph-cli/src/lib.rs
//
// Library portion of the Vidmorph CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{ApplyArgs, Cli, Commands, ProbeArgs, RunArgs};
pub use commands::apply::run_apply;
pub use commands::probe::run_probe;
pub use commands::run::run_batch_command;
pub use error::CliResult;
