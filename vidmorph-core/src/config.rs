// ============================================================================
// vidmorph-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines the configuration structures and constants used
// throughout the vidmorph-core library: the re-encode templates shared by
// every destructive transform, the watchdog timeout for encoder processes,
// and the job orientation.
//
// USAGE:
// Instances of CoreConfig are created by consumers of the library (like
// vidmorph-cli) and handed to the pipeline and batch driver through
// `MediaTools`.

use crate::error::{CoreError, CoreResult};

use serde::{Deserialize, Serialize};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Video encoder used by every re-encoding transform.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// x264 preset for the regular transforms.
pub const DEFAULT_PRESET: &str = "veryfast";

/// x264 preset for the even-dimension repair stage.
pub const DEFAULT_REPAIR_PRESET: &str = "medium";

/// H.264 profile for all re-encodes.
pub const DEFAULT_PROFILE: &str = "high";

/// Constant rate factor for the regular transforms.
pub const DEFAULT_CRF: u8 = 26;

/// Constant rate factor for the repair stage, which is the last lossy pass.
pub const DEFAULT_REPAIR_CRF: u8 = 20;

/// Pixel format for all re-encodes.
pub const DEFAULT_PIX_FMT: &str = "yuv420p";

/// Audio encoder used by re-encoding transforms.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Audio bitrate for the regular transforms.
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Audio bitrate for the repair stage.
pub const DEFAULT_REPAIR_AUDIO_BITRATE: &str = "256k";

/// An encoder that reports no progress for this long is killed.
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Probability that the random-noise stage runs after the speed change.
pub const DEFAULT_NOISE_PROBABILITY: f64 = 0.5;

/// Bounds for the number of copies a single job may request.
pub const MIN_COPIES: u32 = 1;
pub const MAX_COPIES: u32 = 5;

// ============================================================================
// ORIENTATION
// ============================================================================

/// Target aspect class of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// 1920x1080
    #[default]
    Horizontal,
    /// 1080x1920
    Vertical,
}

impl Orientation {
    /// Target (width, height) used by resolution-change and padding.
    #[must_use]
    pub fn target_resolution(self) -> (u32, u32) {
        match self {
            Orientation::Horizontal => (1920, 1080),
            Orientation::Vertical => (1080, 1920),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            other => Err(CoreError::Config(format!(
                "Unknown orientation '{other}' (expected 'horizontal' or 'vertical')"
            ))),
        }
    }
}

// ============================================================================
// ENCODER SETTINGS
// ============================================================================

/// Argument template for a full H.264 + AAC re-encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub preset: String,
    pub profile: String,
    pub crf: u8,
    pub pix_fmt: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            crf: DEFAULT_CRF,
            pix_fmt: DEFAULT_PIX_FMT.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

impl EncoderSettings {
    /// Higher quality template used by the even-dimension repair stage.
    #[must_use]
    pub fn repair() -> Self {
        Self {
            preset: DEFAULT_REPAIR_PRESET.to_string(),
            crf: DEFAULT_REPAIR_CRF,
            audio_bitrate: DEFAULT_REPAIR_AUDIO_BITRATE.to_string(),
            ..Self::default()
        }
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for the vidmorph-core library.
///
/// # Examples
///
/// ```rust
/// use vidmorph_core::CoreConfig;
/// use std::path::PathBuf;
///
/// let mut config = CoreConfig::new();
/// config.temp_dir = Some(PathBuf::from("/var/tmp/vidmorph"));
/// config.seed = Some(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Path Configuration ----
    /// Base directory for scoped temporaries (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,

    // ---- Encoder Settings ----
    /// Template for every destructive transform
    pub encoder: EncoderSettings,

    /// Template for the even-dimension repair re-encode
    pub repair_encoder: EncoderSettings,

    /// Kill an encoder that reports no progress for this long
    pub stall_timeout: Duration,

    // ---- Pipeline Settings ----
    /// Probability of the random-noise stage
    pub noise_probability: f64,

    /// Seed for reproducible transform chains
    pub seed: Option<u64>,

    // ---- Notification Settings ----
    /// Optional ntfy topic URL for job notifications
    pub ntfy_topic: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: None,
            encoder: EncoderSettings::default(),
            repair_encoder: EncoderSettings::repair(),
            stall_timeout: DEFAULT_STALL_TIMEOUT,
            noise_probability: DEFAULT_NOISE_PROBABILITY,
            seed: None,
            ntfy_topic: None,
        }
    }

    /// Validates settings that would otherwise fail deep inside a pipeline run.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.noise_probability) {
            return Err(CoreError::Config(format!(
                "noise_probability must be within 0.0..=1.0, got {}",
                self.noise_probability
            )));
        }

        if self.stall_timeout.is_zero() {
            return Err(CoreError::Config("stall_timeout must be non-zero".to_string()));
        }

        for (label, settings) in [("encoder", &self.encoder), ("repair_encoder", &self.repair_encoder)] {
            if settings.crf > 51 {
                return Err(CoreError::Config(format!(
                    "{label}.crf must be within 0..=51 for {}, got {}",
                    settings.video_codec, settings.crf
                )));
            }
            if settings.video_codec.is_empty() || settings.audio_codec.is_empty() {
                return Err(CoreError::Config(format!("{label} codecs must not be empty")));
            }
        }

        if let Some(dir) = &self.temp_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "temp_dir '{}' exists and is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}
