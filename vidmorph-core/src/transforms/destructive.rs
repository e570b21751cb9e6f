//! Re-encoding transforms.
//!
//! Each function builds one ffmpeg invocation around a video filter (or an
//! audio option set) and re-encodes with the configured H.264 + AAC
//! template. Random parameters arrive already drawn.

use crate::error::CoreResult;
use crate::external::ffmpeg::command_for_input;
use crate::external::ffmpeg_builder::{
    VideoFilterChain, add_audio_encode_args, add_full_encode_args, add_video_encode_args,
};
use crate::external::{FfmpegSpawner, FfprobeExecutor, MediaInfo, MediaTools, run_ffmpeg};
use crate::transforms::{AudioCodec, FADE_IN_SECS, FlipDirection, OVERLAY_TEXT};

use std::path::Path;

/// Re-encodes `input` through the single video filter `filter`.
fn encode_with_filter<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    label: &str,
    filter: &str,
) -> CoreResult<()> {
    let mut cmd = command_for_input(input);
    cmd.args(["-vf", filter]);
    add_full_encode_args(&mut cmd, &tools.config.encoder);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, label, info.duration_secs)
}

/// Builds the speed filter graph; the audio branch only exists when there is audio.
#[must_use]
pub fn speed_filter_graph(factor: f64, has_audio: bool) -> String {
    if has_audio {
        format!("[0:v]setpts=PTS/{factor}[v];[0:a]atempo={factor}[a]")
    } else {
        format!("[0:v]setpts=PTS/{factor}[v]")
    }
}

/// Changes playback speed; video and audio share `factor` to keep lip-sync.
pub fn speed_change<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    factor: f64,
) -> CoreResult<()> {
    log::info!("Speed change => {factor}");
    if !info.has_audio {
        log::debug!("No audio stream in {}, speeding up video only", input.display());
    }

    let mut cmd = command_for_input(input);
    cmd.args(["-filter_complex", &speed_filter_graph(factor, info.has_audio)]);
    cmd.args(["-map", "[v]"]);
    if info.has_audio {
        cmd.args(["-map", "[a]"]);
    }
    add_full_encode_args(&mut cmd, &tools.config.encoder);
    cmd.output(output.to_string_lossy().as_ref());

    let expected = info.duration_secs.map(|d| d / factor);
    run_ffmpeg(tools.spawner, cmd, output, "speed-change", expected)
}

pub fn random_noise<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    strength: f64,
) -> CoreResult<()> {
    log::info!("Random noise => alls={strength}");
    let mut cmd = command_for_input(input);
    cmd.args(["-filter:v", &format!("noise=alls={strength}:allf=t+u")]);
    add_full_encode_args(&mut cmd, &tools.config.encoder);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "random-noise", info.duration_secs)
}

pub fn resolution_change<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    width: u32,
    height: u32,
) -> CoreResult<()> {
    encode_with_filter(
        tools,
        input,
        info,
        output,
        "resolution-change",
        &format!("scale={width}:{height}"),
    )
}

pub fn frame_rate_change<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    fps: u32,
) -> CoreResult<()> {
    let mut cmd = command_for_input(input);
    cmd.args(["-r", &fps.to_string()]);
    add_full_encode_args(&mut cmd, &tools.config.encoder);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "frame-rate-change", info.duration_secs)
}

/// Re-encodes audio as stereo 44.1kHz AAC or MP3.
pub fn audio_codec_change<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    codec: AudioCodec,
) -> CoreResult<()> {
    let mut cmd = command_for_input(input);
    add_video_encode_args(&mut cmd, &tools.config.encoder);
    cmd.args(["-c:a", codec.encoder()]);
    cmd.args(["-b:a", tools.config.encoder.audio_bitrate.as_str()]);
    cmd.args(["-ac", "2", "-ar", "44100"]);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "audio-codec-change", info.duration_secs)
}

pub fn audio_sample_rate_change<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    sample_rate: u32,
) -> CoreResult<()> {
    let mut cmd = command_for_input(input);
    add_video_encode_args(&mut cmd, &tools.config.encoder);
    add_audio_encode_args(&mut cmd, &tools.config.encoder);
    cmd.args(["-ar", &sample_rate.to_string(), "-ac", "2"]);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "audio-sample-rate-change", info.duration_secs)
}

/// Rotates by `degrees`; the encoder filter takes radians.
pub fn small_rotation<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    degrees: f64,
) -> CoreResult<()> {
    let radians = degrees.to_radians();
    encode_with_filter(
        tools,
        input,
        info,
        output,
        "small-rotation",
        &format!("rotate={radians}:fillcolor=black"),
    )
}

pub fn flip<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    direction: FlipDirection,
) -> CoreResult<()> {
    encode_with_filter(tools, input, info, output, direction.filter(), direction.filter())
}

/// Letterboxes to `width`x`height` only when the source is smaller in both
/// dimensions; otherwise stream-copies.
pub fn padding<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    width: u32,
    height: u32,
) -> CoreResult<()> {
    if info.width >= width || info.height >= height {
        log::debug!(
            "Source {}x{} is not smaller than {width}x{height}, copying without padding",
            info.width,
            info.height
        );
        let mut cmd = command_for_input(input);
        cmd.args(["-c:v", "copy", "-c:a", "copy"]);
        cmd.output(output.to_string_lossy().as_ref());
        return run_ffmpeg(tools.spawner, cmd, output, "padding (copy)", None);
    }

    encode_with_filter(
        tools,
        input,
        info,
        output,
        "padding",
        &format!("pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"),
    )
}

pub fn text_overlay<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    x: u32,
    y: u32,
) -> CoreResult<()> {
    let filter = format!(
        "drawtext=text='{OVERLAY_TEXT}':x={x}:y={y}:fontcolor=white:fontsize=20:shadowcolor=black:shadowx=2:shadowy=2"
    );
    encode_with_filter(tools, input, info, output, "text-overlay", &filter)
}

/// Builds the down/up scaling pair that produces the mosaic effect.
#[must_use]
pub fn pixelate_filter(factor: f64) -> String {
    VideoFilterChain::new()
        .add_filter(format!("scale=iw/{factor}:ih/{factor}:flags=lanczos"))
        .add_filter(format!("scale=iw*{factor}:ih*{factor}:flags=neighbor"))
        .build()
        .unwrap_or_default()
}

pub fn pixelate<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    factor: f64,
) -> CoreResult<()> {
    encode_with_filter(tools, input, info, output, "pixelate", &pixelate_filter(factor))
}

pub fn color_filter<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
    brightness: f64,
    contrast: f64,
    saturation: f64,
) -> CoreResult<()> {
    encode_with_filter(
        tools,
        input,
        info,
        output,
        "small-color-filter",
        &format!("eq=brightness={brightness}:contrast={contrast}:saturation={saturation}"),
    )
}

pub fn fade_in<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
) -> CoreResult<()> {
    encode_with_filter(
        tools,
        input,
        info,
        output,
        "fade-in",
        &format!("fade=t=in:st=0:d={FADE_IN_SECS}"),
    )
}
