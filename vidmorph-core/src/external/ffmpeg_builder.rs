//! FFmpeg command builder utilities
//!
//! This module provides a builder pattern for constructing FFmpeg commands
//! with the options every transform shares (banner suppression, overwrite)
//! plus helpers that expand an [`EncoderSettings`] template into encoder
//! arguments.

use crate::config::EncoderSettings;
use ffmpeg_sidecar::command::FfmpegCommand;

/// Builder for creating `FFmpeg` commands with common configurations
pub struct FfmpegCommandBuilder {
    cmd: FfmpegCommand,
}

impl Default for FfmpegCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCommandBuilder {
    /// Creates a new `FFmpeg` command builder with sensible defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            cmd: FfmpegCommand::new(),
        }
    }

    /// Builds the command with the banner hidden and overwrite (`-y`) on.
    #[must_use]
    pub fn build(mut self) -> FfmpegCommand {
        self.cmd.arg("-hide_banner");
        self.cmd.arg("-y");
        self.cmd
    }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty strings are ignored
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// Appends the H.264 video encoder arguments of `settings`.
pub fn add_video_encode_args(cmd: &mut FfmpegCommand, settings: &EncoderSettings) {
    cmd.args(["-c:v", settings.video_codec.as_str()]);
    cmd.args(["-preset", settings.preset.as_str()]);
    cmd.args(["-profile:v", settings.profile.as_str()]);
    cmd.args(["-crf", &settings.crf.to_string()]);
    cmd.args(["-pix_fmt", settings.pix_fmt.as_str()]);
}

/// Appends the audio encoder arguments of `settings`.
pub fn add_audio_encode_args(cmd: &mut FfmpegCommand, settings: &EncoderSettings) {
    cmd.args(["-c:a", settings.audio_codec.as_str()]);
    cmd.args(["-b:a", settings.audio_bitrate.as_str()]);
}

/// Appends a complete video + audio re-encode.
pub fn add_full_encode_args(cmd: &mut FfmpegCommand, settings: &EncoderSettings) {
    add_video_encode_args(cmd, settings);
    add_audio_encode_args(cmd, settings);
}
