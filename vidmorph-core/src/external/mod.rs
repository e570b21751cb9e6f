// ============================================================================
// vidmorph-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with External CLI Tools
//
// This module encapsulates interactions with ffmpeg and ffprobe. It provides
// abstractions through traits and concrete implementations so that the
// transform catalog, pipeline and batch driver can run against either the
// real tools or the mocks.
//
// KEY COMPONENTS:
// - Traits for external tool interactions (FfmpegSpawner, FfprobeExecutor)
// - Concrete implementations using ffmpeg-sidecar and ffprobe crates
// - MediaTools: the bundle of spawner, prober and config passed to every stage
// - Dependency checking

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains ffmpeg execution helpers shared by every transform
pub mod ffmpeg;

/// Contains the command builder and encoder argument templates
pub mod ffmpeg_builder;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

/// Mock executors for tests
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

// ----- FFmpeg Execution -----
pub use ffmpeg::{run_ffmpeg, stream_copy};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};

// ----- FFprobe Execution -----
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor, MediaInfo};

// ============================================================================
// TOOL BUNDLE
// ============================================================================

/// Everything a stage needs to talk to the outside world.
pub struct MediaTools<'a, S: FfmpegSpawner, P: FfprobeExecutor> {
    pub spawner: &'a S,
    pub prober: &'a P,
    pub config: &'a CoreConfig,
}

impl<'a, S: FfmpegSpawner, P: FfprobeExecutor> MediaTools<'a, S, P> {
    pub fn new(spawner: &'a S, prober: &'a P, config: &'a CoreConfig) -> Self {
        Self {
            spawner,
            prober,
            config,
        }
    }
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> Clone for MediaTools<'_, S, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> Copy for MediaTools<'_, S, P> {}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name -version` with output discarded.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - the command is not on `PATH`
/// * `CoreError::CommandStart` - the command exists but failed to start
///
/// # Examples
///
/// ```rust,no_run
/// use vidmorph_core::check_dependency;
///
/// match check_dependency("ffmpeg") {
///     Ok(()) => println!("ffmpeg is available"),
///     Err(e) => eprintln!("ffmpeg check failed: {}", e),
/// }
/// ```
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
