//! FFmpeg command execution for transform stages
//!
//! Every catalog transform ends in [`run_ffmpeg`]: spawn through the injected
//! spawner, stream events into an [`FfmpegProgressHandler`], check the exit
//! status and insist on a non-empty output file. A run that exits cleanly
//! but leaves nothing behind is still an encode failure.

use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg_builder::FfmpegCommandBuilder;
use crate::external::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, exit_status_error};
use crate::progress_reporting::ffmpeg_handler::FfmpegProgressHandler;
use crate::utils::is_nonempty_file;

use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, warn};

use std::path::Path;
use std::time::Instant;

/// Starts a command reading `input` with the shared flags.
#[must_use]
pub fn command_for_input(input: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommandBuilder::new().build();
    cmd.input(input.to_string_lossy().as_ref());
    cmd
}

/// Builds a plain stream copy of every default stream from `input` to `output`.
#[must_use]
pub fn stream_copy_command(input: &Path, output: &Path) -> FfmpegCommand {
    let mut cmd = command_for_input(input);
    cmd.args(["-c", "copy"]);
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Runs a fully built command and verifies that `output` was written.
///
/// `label` names the stage in logs and errors; `duration` (seconds) enables
/// percent-complete progress logging.
///
/// # Errors
///
/// Any spawn, watchdog, exit-status or empty-output failure, all of which
/// satisfy [`CoreError::is_encode_error`].
pub fn run_ffmpeg<S: FfmpegSpawner>(
    spawner: &S,
    cmd: FfmpegCommand,
    output: &Path,
    label: &str,
    duration: Option<f64>,
) -> CoreResult<()> {
    debug!("FFmpeg command ({label}): {cmd:?}");
    let start = Instant::now();

    let mut process = spawner.spawn(cmd)?;
    let mut handler = FfmpegProgressHandler::new(label, duration);

    if let Err(e) = process.handle_events(|event| handler.handle_event(event)) {
        if let Err(wait_err) = process.wait() {
            warn!("Could not reap ffmpeg after {label} failed: {wait_err}");
        }
        return Err(e);
    }

    let status = process.wait()?;
    if !status.success() {
        return Err(exit_status_error(
            &format!("ffmpeg ({label})"),
            status,
            handler.stderr_buffer(),
        ));
    }

    if !is_nonempty_file(output) {
        return Err(CoreError::Encode(format!(
            "{label} produced no output at {}",
            output.display()
        )));
    }

    debug!(
        "{label} finished in {:.1}s ({} progress updates)",
        start.elapsed().as_secs_f64(),
        handler.progress_events()
    );
    Ok(())
}

/// Stream-copies `input` to `output` and verifies the result.
pub fn stream_copy<S: FfmpegSpawner>(spawner: &S, input: &Path, output: &Path, label: &str) -> CoreResult<()> {
    run_ffmpeg(spawner, stream_copy_command(input, output), output, label, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, MockOutcome};

    #[test]
    fn stream_copy_command_puts_output_last() {
        let mut cmd = stream_copy_command(Path::new("/in/a.mp4"), Path::new("/out/1.mp4"));
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args.last().map(String::as_str), Some("/out/1.mp4"));
        let joined = args.join(" ");
        assert!(joined.contains("-i /in/a.mp4"));
        assert!(joined.contains("-c copy"));
    }

    #[test]
    fn run_ffmpeg_reports_exit_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"video").unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.set_default(MockOutcome::ExitFailure(1));
        let err = stream_copy(&spawner, &input, &output, "copy").unwrap_err();
        assert!(err.is_encode_error());
        assert!(!output.exists());
    }

    #[test]
    fn run_ffmpeg_rejects_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"video").unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.set_default(MockOutcome::EmptyOutput);
        let err = stream_copy(&spawner, &input, &output, "copy").unwrap_err();
        assert!(matches!(err, CoreError::Encode(_)));
    }

    #[test]
    fn run_ffmpeg_propagates_stall() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"video").unwrap();

        let spawner = MockFfmpegSpawner::new();
        spawner.set_default(MockOutcome::Stall);
        let err = stream_copy(&spawner, &input, &output, "copy").unwrap_err();
        assert!(matches!(err, CoreError::Stalled(..)));
    }

    #[test]
    fn run_ffmpeg_success_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"video").unwrap();

        let spawner = MockFfmpegSpawner::new();
        stream_copy(&spawner, &input, &output, "copy").unwrap();
        assert!(is_nonempty_file(&output));
        assert_eq!(spawner.received_calls().len(), 1);
    }
}
