//! Implementation of the 'apply' subcommand.
//!
//! Runs exactly one catalog transform, with randomly drawn parameters, from
//! `--input` to `--output`. Useful for checking what a single stage does to
//! a file before it shows up inside a variant chain.

use crate::cli::ApplyArgs;
use crate::commands::make_rng;
use crate::error::CliResult;

use vidmorph_core::external::{CrateFfprobeExecutor, FfprobeExecutor, SidecarSpawner};
use vidmorph_core::{CoreConfig, MediaTools, apply_step};

use log::info;

pub fn run_apply(args: &ApplyArgs) -> CliResult<()> {
    vidmorph_core::check_dependency("ffmpeg")?;
    vidmorph_core::check_dependency("ffprobe")?;

    let config = CoreConfig::new();
    let spawner = SidecarSpawner::new(config.stall_timeout);
    let prober = CrateFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);

    let info = prober.probe(&args.input)?;
    let mut rng = make_rng(args.seed);
    let step = args.transform.draw(&mut rng, args.orientation);
    let mode = if args.transform.is_non_destructive() {
        "stream copy"
    } else {
        "re-encode"
    };
    info!("Applying {step} ({mode}) to {}", args.input.display());

    let written = apply_step(tools, &step, &args.input, &info, &args.output)?;
    println!("{}", written.display());
    Ok(())
}
