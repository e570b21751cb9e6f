// ============================================================================
// vidmorph-core/src/transforms/mod.rs
// ============================================================================
//
// TRANSFORM CATALOG: Fixed Set of File-to-File Video Operations
//
// Every transform maps one input file to one output file through a single
// ffmpeg invocation. A transform is selected as a `TransformKind`, its random
// parameters are drawn once into an immutable `TransformStep`, and
// `apply_step` dispatches the step to its implementation.
//
// KEY COMPONENTS:
// - TransformKind: field-less identifier with names and the random pool
// - TransformStep: a kind plus its drawn parameters
// - apply_step: the single dispatcher used by the pipeline and the CLI
//
// CATEGORIES:
// - non_destructive: stream copy, container and metadata edits only
// - destructive: full H.264 + AAC re-encode through a filter
// - repair: the mandatory even-dimension final stage

pub mod destructive;
pub mod non_destructive;
pub mod repair;

use crate::config::Orientation;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, FfprobeExecutor, MediaInfo, MediaTools};

use rand::Rng;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// PARAMETER DOMAINS
// ============================================================================

pub const SPEED_RANGE: (f64, f64) = (0.95, 1.05);
pub const NOISE_RANGE: (f64, f64) = (0.05, 0.15);
pub const ROTATION_DEGREES: (f64, f64) = (-2.0, 2.0);
pub const BRIGHTNESS_RANGE: (f64, f64) = (-0.05, 0.05);
pub const CONTRAST_RANGE: (f64, f64) = (0.95, 1.05);
pub const SATURATION_RANGE: (f64, f64) = (0.95, 1.05);
pub const FRAME_RATES: [u32; 4] = [24, 25, 30, 60];
pub const SAMPLE_RATES: [u32; 2] = [44_100, 48_000];
pub const PIXELATE_FACTORS: [f64; 3] = [1.1, 1.2, 1.3];
pub const CHAPTER_MAX_START_SECS: u32 = 30;
pub const CHAPTER_LENGTH_SECS: u32 = 10;
pub const TEXT_POSITION_RANGE: (u32, u32) = (10, 100);
pub const OVERLAY_TEXT: &str = "Follow me and check my link in bio";
pub const FADE_IN_SECS: u32 = 2;

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ============================================================================
// PARAMETER ENUMS
// ============================================================================

/// Target container for the rewrap transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Mkv,
}

impl Container {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
        }
    }
}

/// Audio encoder chosen by the audio-codec transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Aac,
    Mp3,
}

impl AudioCodec {
    /// ffmpeg encoder name.
    #[must_use]
    pub fn encoder(self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Mp3 => "libmp3lame",
        }
    }
}

/// Axis of the flip transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl FlipDirection {
    /// ffmpeg filter name.
    #[must_use]
    pub fn filter(self) -> &'static str {
        match self {
            FlipDirection::Horizontal => "hflip",
            FlipDirection::Vertical => "vflip",
        }
    }
}

// ============================================================================
// TRANSFORM KIND
// ============================================================================

/// Identifier for every operation in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    SpeedChange,
    RandomNoise,
    ContainerRewrap,
    StripMetadata,
    SilentSubtitle,
    DummyChapter,
    RandomMetadata,
    ResolutionChange,
    FrameRateChange,
    AudioCodecChange,
    AudioSampleRateChange,
    SmallRotation,
    Flip,
    Mirror,
    Padding,
    TextOverlay,
    Pixelate,
    ColorFilter,
    FadeIn,
    EvenRepair,
}

impl TransformKind {
    /// Every catalog entry.
    pub const ALL: [TransformKind; 20] = [
        TransformKind::SpeedChange,
        TransformKind::RandomNoise,
        TransformKind::ContainerRewrap,
        TransformKind::StripMetadata,
        TransformKind::SilentSubtitle,
        TransformKind::DummyChapter,
        TransformKind::RandomMetadata,
        TransformKind::ResolutionChange,
        TransformKind::FrameRateChange,
        TransformKind::AudioCodecChange,
        TransformKind::AudioSampleRateChange,
        TransformKind::SmallRotation,
        TransformKind::Flip,
        TransformKind::Mirror,
        TransformKind::Padding,
        TransformKind::TextOverlay,
        TransformKind::Pixelate,
        TransformKind::ColorFilter,
        TransformKind::FadeIn,
        TransformKind::EvenRepair,
    ];

    /// Candidates for the random middle section of a pipeline run.
    pub const POOL: [TransformKind; 15] = [
        TransformKind::ContainerRewrap,
        TransformKind::SilentSubtitle,
        TransformKind::DummyChapter,
        TransformKind::RandomMetadata,
        TransformKind::ResolutionChange,
        TransformKind::FrameRateChange,
        TransformKind::AudioCodecChange,
        TransformKind::AudioSampleRateChange,
        TransformKind::SmallRotation,
        TransformKind::Mirror,
        TransformKind::Padding,
        TransformKind::TextOverlay,
        TransformKind::Pixelate,
        TransformKind::ColorFilter,
        TransformKind::FadeIn,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TransformKind::SpeedChange => "speed-change",
            TransformKind::RandomNoise => "random-noise",
            TransformKind::ContainerRewrap => "container-rewrap",
            TransformKind::StripMetadata => "strip-metadata",
            TransformKind::SilentSubtitle => "add-silent-subtitle",
            TransformKind::DummyChapter => "add-dummy-chapter",
            TransformKind::RandomMetadata => "apply-random-metadata",
            TransformKind::ResolutionChange => "resolution-change",
            TransformKind::FrameRateChange => "frame-rate-change",
            TransformKind::AudioCodecChange => "audio-codec-change",
            TransformKind::AudioSampleRateChange => "audio-sample-rate-change",
            TransformKind::SmallRotation => "small-rotation",
            TransformKind::Flip => "flip",
            TransformKind::Mirror => "mirror",
            TransformKind::Padding => "padding",
            TransformKind::TextOverlay => "text-overlay",
            TransformKind::Pixelate => "pixelate",
            TransformKind::ColorFilter => "small-color-filter",
            TransformKind::FadeIn => "fade-in",
            TransformKind::EvenRepair => "even-dimension-repair",
        }
    }

    /// True for transforms that only copy streams.
    #[must_use]
    pub fn is_non_destructive(self) -> bool {
        matches!(
            self,
            TransformKind::ContainerRewrap
                | TransformKind::StripMetadata
                | TransformKind::SilentSubtitle
                | TransformKind::DummyChapter
                | TransformKind::RandomMetadata
        )
    }

    /// Draws this transform's random parameters.
    pub fn draw<R: Rng + ?Sized>(self, rng: &mut R, orientation: Orientation) -> TransformStep {
        let (target_width, target_height) = orientation.target_resolution();
        match self {
            TransformKind::SpeedChange => TransformStep::SpeedChange {
                factor: round_to(rng.gen_range(SPEED_RANGE.0..=SPEED_RANGE.1), 3),
            },
            TransformKind::RandomNoise => TransformStep::RandomNoise {
                strength: round_to(rng.gen_range(NOISE_RANGE.0..=NOISE_RANGE.1), 2),
            },
            TransformKind::ContainerRewrap => TransformStep::ContainerRewrap {
                container: if rng.gen_bool(0.5) { Container::Mp4 } else { Container::Mkv },
            },
            TransformKind::StripMetadata => TransformStep::StripMetadata,
            TransformKind::SilentSubtitle => TransformStep::SilentSubtitle,
            TransformKind::DummyChapter => TransformStep::DummyChapter {
                start_secs: rng.gen_range(0..=CHAPTER_MAX_START_SECS),
                title_suffix: rng.gen_range(100..=999),
            },
            TransformKind::RandomMetadata => TransformStep::RandomMetadata {
                title: format!("UniqueID_{}", rng.gen_range(100_000..=999_999)),
                comment: format!("Comment_{}", rng.gen_range(1000..=9999)),
                artist: format!("Artist_{}", rng.gen_range(100..=999)),
            },
            TransformKind::ResolutionChange => TransformStep::ResolutionChange {
                width: target_width,
                height: target_height,
            },
            TransformKind::FrameRateChange => TransformStep::FrameRateChange {
                fps: FRAME_RATES[rng.gen_range(0..FRAME_RATES.len())],
            },
            TransformKind::AudioCodecChange => TransformStep::AudioCodecChange {
                codec: if rng.gen_bool(0.5) { AudioCodec::Aac } else { AudioCodec::Mp3 },
            },
            TransformKind::AudioSampleRateChange => TransformStep::AudioSampleRateChange {
                sample_rate: SAMPLE_RATES[rng.gen_range(0..SAMPLE_RATES.len())],
            },
            TransformKind::SmallRotation => TransformStep::SmallRotation {
                degrees: rng.gen_range(ROTATION_DEGREES.0..=ROTATION_DEGREES.1),
            },
            TransformKind::Flip => TransformStep::Flip {
                direction: if rng.gen_bool(0.5) {
                    FlipDirection::Horizontal
                } else {
                    FlipDirection::Vertical
                },
            },
            TransformKind::Mirror => TransformStep::Mirror,
            TransformKind::Padding => TransformStep::Padding {
                width: target_width,
                height: target_height,
            },
            TransformKind::TextOverlay => TransformStep::TextOverlay {
                x: rng.gen_range(TEXT_POSITION_RANGE.0..=TEXT_POSITION_RANGE.1),
                y: rng.gen_range(TEXT_POSITION_RANGE.0..=TEXT_POSITION_RANGE.1),
            },
            TransformKind::Pixelate => TransformStep::Pixelate {
                factor: PIXELATE_FACTORS[rng.gen_range(0..PIXELATE_FACTORS.len())],
            },
            TransformKind::ColorFilter => TransformStep::ColorFilter {
                brightness: round_to(rng.gen_range(BRIGHTNESS_RANGE.0..=BRIGHTNESS_RANGE.1), 3),
                contrast: round_to(rng.gen_range(CONTRAST_RANGE.0..=CONTRAST_RANGE.1), 3),
                saturation: round_to(rng.gen_range(SATURATION_RANGE.0..=SATURATION_RANGE.1), 3),
            },
            TransformKind::FadeIn => TransformStep::FadeIn,
            TransformKind::EvenRepair => TransformStep::EvenRepair,
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| CoreError::Config(format!("Unknown transform '{s}'")))
    }
}

// ============================================================================
// TRANSFORM STEP
// ============================================================================

/// One selected transform with its parameters fixed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformStep {
    SpeedChange { factor: f64 },
    RandomNoise { strength: f64 },
    ContainerRewrap { container: Container },
    StripMetadata,
    SilentSubtitle,
    DummyChapter { start_secs: u32, title_suffix: u32 },
    RandomMetadata { title: String, comment: String, artist: String },
    ResolutionChange { width: u32, height: u32 },
    FrameRateChange { fps: u32 },
    AudioCodecChange { codec: AudioCodec },
    AudioSampleRateChange { sample_rate: u32 },
    SmallRotation { degrees: f64 },
    Flip { direction: FlipDirection },
    Mirror,
    Padding { width: u32, height: u32 },
    TextOverlay { x: u32, y: u32 },
    Pixelate { factor: f64 },
    ColorFilter { brightness: f64, contrast: f64, saturation: f64 },
    FadeIn,
    EvenRepair,
}

impl TransformStep {
    #[must_use]
    pub fn kind(&self) -> TransformKind {
        match self {
            TransformStep::SpeedChange { .. } => TransformKind::SpeedChange,
            TransformStep::RandomNoise { .. } => TransformKind::RandomNoise,
            TransformStep::ContainerRewrap { .. } => TransformKind::ContainerRewrap,
            TransformStep::StripMetadata => TransformKind::StripMetadata,
            TransformStep::SilentSubtitle => TransformKind::SilentSubtitle,
            TransformStep::DummyChapter { .. } => TransformKind::DummyChapter,
            TransformStep::RandomMetadata { .. } => TransformKind::RandomMetadata,
            TransformStep::ResolutionChange { .. } => TransformKind::ResolutionChange,
            TransformStep::FrameRateChange { .. } => TransformKind::FrameRateChange,
            TransformStep::AudioCodecChange { .. } => TransformKind::AudioCodecChange,
            TransformStep::AudioSampleRateChange { .. } => TransformKind::AudioSampleRateChange,
            TransformStep::SmallRotation { .. } => TransformKind::SmallRotation,
            TransformStep::Flip { .. } => TransformKind::Flip,
            TransformStep::Mirror => TransformKind::Mirror,
            TransformStep::Padding { .. } => TransformKind::Padding,
            TransformStep::TextOverlay { .. } => TransformKind::TextOverlay,
            TransformStep::Pixelate { .. } => TransformKind::Pixelate,
            TransformStep::ColorFilter { .. } => TransformKind::ColorFilter,
            TransformStep::FadeIn => TransformKind::FadeIn,
            TransformStep::EvenRepair => TransformKind::EvenRepair,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

impl fmt::Display for TransformStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformStep::SpeedChange { factor } => write!(f, "speed-change x{factor}"),
            TransformStep::RandomNoise { strength } => write!(f, "random-noise alls={strength}"),
            TransformStep::ContainerRewrap { container } => {
                write!(f, "container-rewrap .{}", container.extension())
            }
            TransformStep::ResolutionChange { width, height } => {
                write!(f, "resolution-change {width}x{height}")
            }
            TransformStep::Padding { width, height } => write!(f, "padding {width}x{height}"),
            TransformStep::FrameRateChange { fps } => write!(f, "frame-rate-change {fps}fps"),
            TransformStep::AudioCodecChange { codec } => {
                write!(f, "audio-codec-change {}", codec.encoder())
            }
            TransformStep::AudioSampleRateChange { sample_rate } => {
                write!(f, "audio-sample-rate-change {sample_rate}Hz")
            }
            TransformStep::SmallRotation { degrees } => write!(f, "small-rotation {degrees:.3}deg"),
            TransformStep::Flip { direction } => write!(f, "flip {}", direction.filter()),
            TransformStep::Pixelate { factor } => write!(f, "pixelate /{factor}"),
            other => f.write_str(other.name()),
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Applies `step` to `input`, whose probe result is `info`, writing `output`.
///
/// Returns the path actually written: container rewrap replaces the
/// extension of `output` with the chosen container's.
///
/// # Errors
///
/// An encode error when ffmpeg fails or writes nothing. Subtitle and chapter
/// injection fall back to a stream copy before giving up.
pub fn apply_step<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    step: &TransformStep,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
) -> CoreResult<PathBuf> {
    log::debug!(
        "Applying {step}: {} -> {}",
        input.display(),
        output.display()
    );

    match step {
        TransformStep::ContainerRewrap { container } => {
            return non_destructive::container_rewrap(tools, input, output, *container);
        }
        TransformStep::StripMetadata => non_destructive::strip_metadata(tools, input, output)?,
        TransformStep::SilentSubtitle => non_destructive::add_silent_subtitle(tools, input, output)?,
        TransformStep::DummyChapter {
            start_secs,
            title_suffix,
        } => non_destructive::add_dummy_chapter(tools, input, output, *start_secs, *title_suffix)?,
        TransformStep::RandomMetadata {
            title,
            comment,
            artist,
        } => non_destructive::apply_random_metadata(tools, input, output, title, comment, artist)?,
        TransformStep::SpeedChange { factor } => {
            destructive::speed_change(tools, input, info, output, *factor)?;
        }
        TransformStep::RandomNoise { strength } => {
            destructive::random_noise(tools, input, info, output, *strength)?;
        }
        TransformStep::ResolutionChange { width, height } => {
            destructive::resolution_change(tools, input, info, output, *width, *height)?;
        }
        TransformStep::FrameRateChange { fps } => {
            destructive::frame_rate_change(tools, input, info, output, *fps)?;
        }
        TransformStep::AudioCodecChange { codec } => {
            destructive::audio_codec_change(tools, input, info, output, *codec)?;
        }
        TransformStep::AudioSampleRateChange { sample_rate } => {
            destructive::audio_sample_rate_change(tools, input, info, output, *sample_rate)?;
        }
        TransformStep::SmallRotation { degrees } => {
            destructive::small_rotation(tools, input, info, output, *degrees)?;
        }
        TransformStep::Flip { direction } => {
            destructive::flip(tools, input, info, output, *direction)?;
        }
        TransformStep::Mirror => destructive::flip(tools, input, info, output, FlipDirection::Horizontal)?,
        TransformStep::Padding { width, height } => {
            destructive::padding(tools, input, info, output, *width, *height)?;
        }
        TransformStep::TextOverlay { x, y } => destructive::text_overlay(tools, input, info, output, *x, *y)?,
        TransformStep::Pixelate { factor } => destructive::pixelate(tools, input, info, output, *factor)?,
        TransformStep::ColorFilter {
            brightness,
            contrast,
            saturation,
        } => destructive::color_filter(tools, input, info, output, *brightness, *contrast, *saturation)?,
        TransformStep::FadeIn => destructive::fade_in(tools, input, info, output)?,
        TransformStep::EvenRepair => repair::ensure_even_dimensions(tools, input, info, output)?,
    }

    Ok(output.to_path_buf())
}
