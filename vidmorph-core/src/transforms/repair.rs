//! Even-dimension repair, the mandatory final pipeline stage.
//!
//! 4:2:0 chroma subsampling needs even width and height. Already-even inputs
//! are stream-copied, so applying the repair twice never changes dimensions.

use crate::error::CoreResult;
use crate::external::ffmpeg::command_for_input;
use crate::external::ffmpeg_builder::add_full_encode_args;
use crate::external::{FfmpegSpawner, FfprobeExecutor, MediaInfo, MediaTools, run_ffmpeg, stream_copy};

use std::path::Path;

/// Rounds each dimension up to the next even integer.
pub const EVEN_SCALE_FILTER: &str = "scale='2*ceil(iw/2)':'2*ceil(ih/2)'";

/// Dimensions the repair stage produces for `width`x`height`.
#[must_use]
pub fn repaired_dimensions(width: u32, height: u32) -> (u32, u32) {
    (width + width % 2, height + height % 2)
}

pub fn ensure_even_dimensions<S: FfmpegSpawner, P: FfprobeExecutor>(
    tools: MediaTools<'_, S, P>,
    input: &Path,
    info: &MediaInfo,
    output: &Path,
) -> CoreResult<()> {
    if info.has_even_dimensions() {
        log::debug!(
            "{}x{} is already even, copying {}",
            info.width,
            info.height,
            input.display()
        );
        return stream_copy(tools.spawner, input, output, "even-dimension-repair (copy)");
    }

    let (width, height) = repaired_dimensions(info.width, info.height);
    log::info!(
        "Repairing odd dimensions {}x{} => {width}x{height}",
        info.width,
        info.height
    );

    let mut cmd = command_for_input(input);
    cmd.args(["-vf", EVEN_SCALE_FILTER]);
    add_full_encode_args(&mut cmd, &tools.config.repair_encoder);
    cmd.output(output.to_string_lossy().as_ref());
    run_ffmpeg(tools.spawner, cmd, output, "even-dimension-repair", info.duration_secs)
}
