//! Implementation of the 'run' subcommand.
//!
//! This module validates the job arguments, builds the core configuration,
//! optionally detaches into the background, then hands the job to
//! `vidmorph_core::run_batch` and reports the terminal result.

use crate::cli::RunArgs;
use crate::commands::make_rng;
use crate::error::{CliResult, PathContext};
use crate::progress::SpinnerSink;

use vidmorph_core::external::{CrateFfprobeExecutor, SidecarSpawner};
use vidmorph_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
use vidmorph_core::{BatchJob, CoreConfig, CoreError, JobResult, MediaTools, run_batch};

use daemonize::Daemonize;
use log::{debug, info, warn};

use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Checks paths before anything is started or detached.
pub fn validate_run_args(args: &RunArgs) -> CliResult<()> {
    let metadata = fs::metadata(&args.input_dir).path_context(format!(
        "Failed to access input directory '{}'",
        args.input_dir.display()
    ))?;
    if !metadata.is_dir() {
        return Err(CoreError::PathError(format!(
            "Input path '{}' is not a directory",
            args.input_dir.display()
        )));
    }
    if args.output_dir.is_file() {
        return Err(CoreError::PathError(format!(
            "Output path '{}' is a file",
            args.output_dir.display()
        )));
    }
    Ok(())
}

/// Builds the core configuration from CLI arguments.
pub fn create_core_config(args: &RunArgs) -> CliResult<CoreConfig> {
    let mut config = CoreConfig::new();
    config.temp_dir.clone_from(&args.temp_dir);
    config.seed = args.seed;
    config.ntfy_topic.clone_from(&args.ntfy);
    config.validate()?;
    Ok(config)
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()
        .path_context("Failed to read current directory")?
        .join(path))
}

/// Makes every path absolute so the job survives the daemon's chdir.
pub fn absolutize(args: &mut RunArgs) -> CliResult<()> {
    args.input_dir = absolute(&args.input_dir)?;
    args.output_dir = absolute(&args.output_dir)?;
    if let Some(dir) = &args.temp_dir {
        args.temp_dir = Some(absolute(dir)?);
    }
    args.log_dir = Some(absolute(&args.effective_log_dir())?);
    Ok(())
}

/// Detaches from the terminal; stdout/stderr go to files in `log_dir`.
pub fn daemonize(log_dir: &Path) -> CliResult<()> {
    fs::create_dir_all(log_dir)
        .path_context(format!("Failed to create log directory '{}'", log_dir.display()))?;
    let stdout = File::create(log_dir.join("vidmorph_daemon.out"))
        .path_context("Failed to create daemon stdout file")?;
    let stderr = File::create(log_dir.join("vidmorph_daemon.err"))
        .path_context("Failed to create daemon stderr file")?;

    eprintln!("Starting vidmorph in the background; logs in {}", log_dir.display());
    Daemonize::new()
        .pid_file(log_dir.join("vidmorph.pid"))
        .working_directory(log_dir)
        .stdout(stdout)
        .stderr(stderr)
        .start()
        .map_err(|e| CoreError::Config(format!("Failed to daemonize: {e}")))
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
}

fn notifier(config: &CoreConfig) -> Option<NtfyNotificationSender> {
    let topic = config.ntfy_topic.as_deref()?;
    match NtfyNotificationSender::new(topic) {
        Ok(sender) => Some(sender),
        Err(e) => {
            warn!("Notifications disabled: {e}");
            None
        }
    }
}

fn notify(sender: Option<&NtfyNotificationSender>, notification: &NotificationType) {
    if let Some(sender) = sender {
        if let Err(e) = sender.send_notification(notification) {
            warn!("Failed to send notification: {e}");
        }
    }
}

/// Runs the batch and prints the job result JSON on stdout.
pub fn run_batch_command(args: &RunArgs, interactive: bool) -> CliResult<JobResult> {
    vidmorph_core::check_dependency("ffmpeg")?;
    vidmorph_core::check_dependency("ffprobe")?;

    let config = create_core_config(args)?;
    let job = BatchJob::new(&args.input_dir, &args.output_dir, args.copies, args.orientation);
    job.validate()?;

    info!("Input directory: {}", job.input_dir.display());
    info!("Output directory: {}", job.output_dir.display());
    info!("Copies per file: {} ({})", job.copies, job.orientation);
    debug!("Run started: {}", chrono::Local::now());

    let sender = notifier(&config);
    let host = hostname();
    notify(
        sender.as_ref(),
        &NotificationType::BatchStart {
            input_dir: job.input_dir.clone(),
            copies: job.copies,
            hostname: host.clone(),
        },
    );

    let spawner = SidecarSpawner::new(config.stall_timeout);
    let prober = CrateFfprobeExecutor::new();
    let tools = MediaTools::new(&spawner, &prober, &config);
    let sink = SpinnerSink::new(interactive);
    let mut rng = make_rng(config.seed);

    let report = run_batch(tools, &job, &sink, &mut rng);

    let notification = match &report.result {
        JobResult::Success { files } => {
            sink.finish(&format!("Generated {} variant(s)", files.len()));
            NotificationType::BatchComplete {
                input_dir: job.input_dir.clone(),
                files: files.clone(),
                duration: report.elapsed,
                hostname: host,
            }
        }
        JobResult::Error { error } => {
            sink.finish("Batch failed");
            NotificationType::BatchError {
                input_dir: job.input_dir.clone(),
                message: error.clone(),
                hostname: host,
            }
        }
    };
    notify(sender.as_ref(), &notification);

    for (path, reason) in &report.skipped_inputs {
        warn!("Skipped {}: {reason}", path.display());
    }
    if !report.fallback_variants.is_empty() {
        warn!("Stream-copy fallback used for: {:?}", report.fallback_variants);
    }

    println!("{}", report.result.to_json()?);
    debug!("Finished at: {}", chrono::Local::now());
    Ok(report.result)
}
