//! `FFmpeg` progress handler
//!
//! Turns the sidecar event stream of one encoder run into log output:
//! percent-complete lines at 10% steps, encoder log lines under the
//! `ffmpeg_log` target, and a buffer of stderr errors for failure reports.

use crate::error::CoreResult;
use crate::utils::{format_duration, parse_ffmpeg_time};
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};
use std::time::{Duration, Instant};

/// Handler for `FFmpeg` progress events
pub struct FfmpegProgressHandler {
    label: String,
    duration: Option<f64>,
    start_time: Instant,
    last_log_time: Instant,
    last_logged_percent_threshold: i32,
    progress_events: u64,
    stderr_buffer: String,
}

impl FfmpegProgressHandler {
    /// Creates a handler for the run named `label`. `duration` (seconds) enables percentages.
    #[must_use]
    pub fn new(label: &str, duration: Option<f64>) -> Self {
        Self {
            label: label.to_string(),
            duration: duration.filter(|d| *d > 0.0),
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            last_logged_percent_threshold: -1,
            progress_events: 0,
            stderr_buffer: String::new(),
        }
    }

    /// Handles an `FFmpeg` event
    pub fn handle_event(&mut self, event: FfmpegEvent) -> CoreResult<()> {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
        Ok(())
    }

    /// Gets the accumulated stderr buffer
    #[must_use]
    pub fn stderr_buffer(&self) -> &str {
        &self.stderr_buffer
    }

    /// Number of progress events seen so far.
    #[must_use]
    pub fn progress_events(&self) -> u64 {
        self.progress_events
    }

    /// Percent complete for an encoder timestamp, when the duration is known.
    #[must_use]
    pub fn percent_for(&self, current_secs: f64) -> Option<f64> {
        self.duration
            .map(|total| (current_secs / total * 100.0).clamp(0.0, 100.0))
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress) {
        self.progress_events += 1;
        let current_secs = parse_ffmpeg_time(&progress.time).unwrap_or(0.0);

        let Some(percent) = self.percent_for(current_secs) else {
            log::trace!(
                target: "vidmorph::progress",
                "{}: {} processed at {:.2}x",
                self.label,
                format_duration(current_secs),
                progress.speed
            );
            return;
        };

        let current_threshold = (percent as i32 / 10) * 10;
        let should_log = current_threshold > self.last_logged_percent_threshold
            || self.last_log_time.elapsed() >= Duration::from_secs(60);

        if should_log {
            let eta = self.calculate_eta(current_secs, progress.speed);
            log::debug!(
                target: "vidmorph::progress",
                "{}: {:.1}% | Time: {} / {} | Speed: {:.2}x | ETA: {} | Elapsed: {}",
                self.label,
                percent,
                format_duration(current_secs),
                format_duration(self.duration.unwrap_or(0.0)),
                progress.speed,
                format_duration(eta),
                format_duration(self.start_time.elapsed().as_secs_f64())
            );
            self.last_log_time = Instant::now();
            self.last_logged_percent_threshold = current_threshold;
        }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        match map_ffmpeg_log_level(level) {
            log::Level::Error => {
                self.stderr_buffer.push_str(message);
                self.stderr_buffer.push('\n');
                log::debug!(target: "ffmpeg_log", "{message}");
            }
            log::Level::Warn => log::debug!(target: "ffmpeg_log", "{message}"),
            _ => log::trace!(target: "ffmpeg_log", "{message}"),
        }
    }

    fn handle_error(&mut self, error: &str) {
        if is_non_critical_ffmpeg_error(error) {
            log::debug!("ffmpeg non-critical message: {error}");
        } else {
            log::debug!(target: "ffmpeg_log", "{}: {error}", self.label);
        }

        self.stderr_buffer.push_str(error);
        self.stderr_buffer.push('\n');
    }

    fn calculate_eta(&self, current_secs: f64, speed: f32) -> f64 {
        match self.duration {
            Some(total) if speed > 0.01 && total > current_secs => {
                (total - current_secs) / f64::from(speed)
            }
            _ => 0.0,
        }
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Trace,
    }
}

/// Determines if an `FFmpeg` error message is non-critical.
///
/// These are `FFmpeg` messages that appear in stderr but don't indicate actual problems.
fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("automatically inserted filter")
        || error.contains("Timestamps are unset")
        || error.contains("Queue input is backward")
        || error.contains("first frame is no keyframe")
}
