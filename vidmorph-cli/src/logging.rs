// ============================================================================
// vidmorph-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: fern Dispatch for Console and Log File
//
// The core library only uses the `log` macros; this module installs the
// backend. Console output is coloured when stderr is a terminal, the log
// file always receives timestamped plain text.
//
// LEVELS:
// - default: info for vidmorph, warnings only for raw ffmpeg output
// - --verbose: debug everywhere, including the `ffmpeg_log` target

use crate::error::{CliResult, PathContext};

use log::{Level, LevelFilter};
use owo_colors::OwoColorize;

use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// File name of the per-run log.
pub fn log_file_name(timestamp: &str) -> String {
    format!("vidmorph_run_{timestamp}.log")
}

fn colored_level(level: Level) -> String {
    match level {
        Level::Error => "ERROR".red().bold().to_string(),
        Level::Warn => "WARN ".yellow().to_string(),
        Level::Info => "INFO ".green().to_string(),
        Level::Debug => "DEBUG".blue().to_string(),
        Level::Trace => "TRACE".magenta().to_string(),
    }
}

fn base_dispatch(verbose: bool) -> fern::Dispatch {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let ffmpeg_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    fern::Dispatch::new()
        .level(LevelFilter::Warn)
        .level_for("vidmorph_core", level)
        .level_for("vidmorph_cli", level)
        .level_for("vidmorph", level)
        .level_for("ffmpeg_log", ffmpeg_level)
}

fn console_dispatch(use_color: bool) -> fern::Dispatch {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            if use_color {
                out.finish(format_args!("{} {message}", colored_level(record.level())));
            } else {
                out.finish(format_args!("{:<5} {message}", record.level()));
            }
        })
        .chain(std::io::stderr())
}

fn file_dispatch(log_path: &Path) -> CliResult<fern::Dispatch> {
    let file = fern::log_file(log_path)
        .path_context(format!("Failed to open log file '{}'", log_path.display()))?;
    Ok(fern::Dispatch::new()
        .format(|out, message, record| {
            let plain = strip_ansi_escapes::strip_str(message.to_string());
            out.finish(format_args!(
                "{} {:<5} [{}] {plain}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target()
            ));
        })
        .chain(file))
}

/// Installs the global logger. With `log_dir`, also logs to a per-run file whose path is returned.
pub fn setup_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let use_color = console::colors_enabled_stderr() && console::Term::stderr().is_term();
    let mut dispatch = base_dispatch(verbose).chain(console_dispatch(use_color));

    let log_path = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .path_context(format!("Failed to create log directory '{}'", dir.display()))?;
            let path = dir.join(log_file_name(&get_timestamp()));
            dispatch = dispatch.chain(file_dispatch(&path)?);
            Some(path)
        }
        None => None,
    };

    dispatch.apply().map_err(|e| {
        vidmorph_core::CoreError::Config(format!("Failed to initialise logging: {e}"))
    })?;
    Ok(log_path)
}
