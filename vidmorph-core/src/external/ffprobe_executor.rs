//! FFprobe integration for media analysis
//!
//! This module is the media inspector: it runs ffprobe (through the `ffprobe`
//! crate, which requests JSON stream and format output) and reduces the
//! result to the geometry the pipeline branches on. Every failure maps to
//! `CoreError::Probe`, which callers treat as "invalid or unreadable input"
//! and never retry.

use crate::error::{CoreError, CoreResult};
use crate::utils::{is_nonempty_file, parse_frame_rate};
use ffprobe::{FfProbe, FfProbeError, ffprobe};
use serde::Serialize;
use std::path::Path;

/// Stream geometry of a probed media file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    /// Width of the first video stream
    pub width: u32,
    /// Height of the first video stream
    pub height: u32,
    /// Frames per second, when ffprobe reports a usable rate
    pub frame_rate: Option<f64>,
    /// Container duration in seconds
    pub duration_secs: Option<f64>,
    /// Whether any audio stream is present
    pub has_audio: bool,
    /// ffprobe's container format name (e.g. "mov,mp4,m4a,3gp,3g2,mj2")
    pub format_name: String,
}

impl MediaInfo {
    /// True when both dimensions are divisible by two.
    #[must_use]
    pub fn has_even_dimensions(&self) -> bool {
        self.width % 2 == 0 && self.height % 2 == 0
    }
}

/// Trait for running the media inspector.
pub trait FfprobeExecutor {
    /// Probes `path` and returns its first video stream's geometry.
    fn probe(&self, path: &Path) -> CoreResult<MediaInfo>;
}

/// Concrete implementation using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe(&self, path: &Path) -> CoreResult<MediaInfo> {
        log::debug!("Running ffprobe (via crate) on: {}", path.display());

        if !is_nonempty_file(path) {
            return Err(CoreError::probe(path, "file is missing or empty"));
        }

        let metadata = ffprobe(path).map_err(|err| {
            let message = describe_ffprobe_error(&err);
            log::debug!("ffprobe failed for {}: {message}", path.display());
            CoreError::probe(path, message)
        })?;

        media_info_from_probe(path, &metadata)
    }
}

fn describe_ffprobe_error(err: &FfProbeError) -> String {
    match err {
        FfProbeError::Io(e) => format!("failed to run ffprobe: {e}"),
        FfProbeError::Status(output) => format!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        FfProbeError::Deserialize(e) => format!("could not parse ffprobe output: {e}"),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// Reduces ffprobe's JSON model to a `MediaInfo`.
pub(crate) fn media_info_from_probe(path: &Path, metadata: &FfProbe) -> CoreResult<MediaInfo> {
    let video = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CoreError::probe(path, "no video stream found"))?;

    let dimension = |value: Option<i64>, name: &str| -> CoreResult<u32> {
        value
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| CoreError::probe(path, format!("video stream has no usable {name}")))
    };
    let width = dimension(video.width, "width")?;
    let height = dimension(video.height, "height")?;

    let frame_rate = parse_frame_rate(&video.avg_frame_rate)
        .or_else(|| parse_frame_rate(&video.r_frame_rate));

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    let has_audio = metadata
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        width,
        height,
        frame_rate,
        duration_secs,
        has_audio,
        format_name: metadata.format.format_name.clone(),
    })
}
