//! Stream-copy transforms.
//!
//! None of these touch encoded pixels or samples. Subtitle and chapter
//! injection depend on muxer support for the extra track or metadata input,
//! so a failed attempt falls back to a plain stream copy instead of failing
//! the stage.

use crate::error::CoreResult;
use crate::external::ffmpeg::command_for_input;
use crate::external::{FfmpegSpawner, FfprobeExecutor, MediaTools, run_ffmpeg, stream_copy};
use crate::temp_files;
use crate::transforms::{CHAPTER_LENGTH_SECS, Container};

use std::io::Write;
use std::path::{Path, PathBuf};

/// Blank one-second cue used by the silent subtitle track.
pub const SILENT_SRT: &str = "1\n00:00:00,000 --> 00:00:01,000\n\n";

fn scratch_dir<S: FfmpegSpawner, P: FfprobeExecutor>(tools: MediaTools<'_, S, P>) -> PathBuf {
    tools
        .config
        .temp_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir)
}

/// Re-muxes into `container`, returning `output` with that container's extension.
pub fn container_rewrap<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    output: &Path,
    container: Container,
) -> CoreResult<PathBuf> {
    let target = output.with_extension(container.extension());
    let mut cmd = command_for_input(input);
    cmd.args(["-c:v", "copy", "-c:a", "copy"]);
    cmd.output(target.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, &target, "container-rewrap", None)?;
    Ok(target)
}

/// Drops all container and stream metadata.
pub fn strip_metadata<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    output: &Path,
) -> CoreResult<()> {
    let mut cmd = command_for_input(input);
    cmd.args(["-map_metadata", "-1", "-c", "copy"]);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "strip-metadata", None)
}

pub fn add_silent_subtitle<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    output: &Path,
) -> CoreResult<()> {
    let attempt = || -> CoreResult<()> {
        let mut srt = temp_files::create_temp_file(&scratch_dir(tools), "silent", "srt")?;
        srt.write_all(SILENT_SRT.as_bytes())?;
        srt.flush()?;

        let mut cmd = command_for_input(input);
        cmd.input(srt.path().to_string_lossy().as_ref());
        cmd.args(["-c:v", "copy", "-c:a", "copy", "-c:s", "mov_text"]);
        cmd.args(["-map", "0", "-map", "1", "-f", "mp4"]);
        cmd.output(output.to_string_lossy().as_ref());
        run_ffmpeg(tools.spawner, cmd, output, "add-silent-subtitle", None)
    };

    attempt().or_else(|e| {
        log::warn!("Subtitle injection failed, copying without subtitle: {e}");
        stream_copy(tools.spawner, input, output, "add-silent-subtitle (fallback)")
    })
}

/// Renders the FFMETADATA1 document describing one chapter.
#[must_use]
pub fn chapter_metadata(start_secs: u32, title_suffix: u32) -> String {
    format!(
        ";FFMETADATA1\n[CHAPTER]\nTIMEBASE=1/1\nSTART={start_secs}\nEND={}\ntitle=RandomChapter{title_suffix}\n",
        start_secs + CHAPTER_LENGTH_SECS
    )
}

pub fn add_dummy_chapter<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    output: &Path,
    start_secs: u32,
    title_suffix: u32,
) -> CoreResult<()> {
    let attempt = || -> CoreResult<()> {
        let mut meta = temp_files::create_temp_file(&scratch_dir(tools), "chapter", "txt")?;
        meta.write_all(chapter_metadata(start_secs, title_suffix).as_bytes())?;
        meta.flush()?;

        let mut cmd = command_for_input(input);
        cmd.args(["-f", "ffmetadata"]);
        cmd.input(meta.path().to_string_lossy().as_ref());
        cmd.args(["-map", "0", "-map_metadata", "1", "-map_chapters", "1"]);
        cmd.args(["-c", "copy", "-f", "mp4"]);
        cmd.output(output.to_string_lossy().as_ref());
        run_ffmpeg(tools.spawner, cmd, output, "add-dummy-chapter", None)
    };

    attempt().or_else(|e| {
        log::warn!("Chapter injection failed, copying without chapter: {e}");
        stream_copy(tools.spawner, input, output, "add-dummy-chapter (fallback)")
    })
}

pub fn apply_random_metadata<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    output: &Path,
    title: &str,
    comment: &str,
    artist: &str,
) -> CoreResult<()> {
    let mut cmd = command_for_input(input);
    cmd.args(["-c:v", "copy", "-c:a", "copy"]);
    cmd.args(["-metadata", &format!("title={title}")]);
    cmd.args(["-metadata", &format!("comment={comment}")]);
    cmd.args(["-metadata", &format!("artist={artist}")]);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "apply-random-metadata", None)
}
