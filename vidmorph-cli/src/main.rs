// vidmorph-cli/src/main.rs
//
// Entry point for the `vidmorph` binary.
//
// Responsibilities include:
// - Parsing command-line arguments.
// - Validating run arguments before detaching into the background.
// - Setting up logging to the console and, for batch runs, a log file.
// - Dispatching to the subcommand implementations.
// - Mapping the outcome onto the process exit code.

use clap::Parser;
use owo_colors::OwoColorize;
use vidmorph_cli::commands::run::{absolutize, daemonize, validate_run_args};
use vidmorph_cli::logging::setup_logging;
use vidmorph_cli::{Cli, CliResult, Commands, run_apply, run_batch_command, run_probe};

use std::process::ExitCode;

fn run(cli: Cli) -> CliResult<bool> {
    match cli.command {
        Commands::Run(mut args) => {
            validate_run_args(&args)?;
            absolutize(&mut args)?;
            let log_dir = args.effective_log_dir();

            if args.daemon {
                daemonize(&log_dir)?;
            }
            if let Some(log_path) = setup_logging(cli.verbose, Some(&log_dir))? {
                log::info!("Log file: {}", log_path.display());
            }

            let result = run_batch_command(&args, !args.daemon)?;
            Ok(result.is_success())
        }
        Commands::Probe(args) => {
            setup_logging(cli.verbose, None)?;
            run_probe(&args)?;
            Ok(true)
        }
        Commands::Apply(args) => {
            setup_logging(cli.verbose, None)?;
            run_apply(&args)?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
