//! Implementation of the 'probe' subcommand.

use crate::cli::ProbeArgs;
use crate::error::CliResult;

use vidmorph_core::CoreError;
use vidmorph_core::external::{CrateFfprobeExecutor, FfprobeExecutor};

/// Probes one file and prints the result as pretty JSON on stdout.
pub fn run_probe(args: &ProbeArgs) -> CliResult<()> {
    vidmorph_core::check_dependency("ffprobe")?;
    let info = CrateFfprobeExecutor::new().probe(&args.file)?;
    let json = serde_json::to_string_pretty(&info).map_err(|e| CoreError::JsonParseError(e.to_string()))?;
    println!("{json}");
    if !info.has_even_dimensions() {
        log::warn!(
            "{}x{} has odd dimensions; variants will be scaled to even ones",
            info.width,
            info.height
        );
    }
    Ok(())
}
