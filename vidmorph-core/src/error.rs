// ============================================================================
// vidmorph-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// This module defines the error taxonomy for the vidmorph-core library.
//
// KEY COMPONENTS:
// - CoreError: every failure the library can produce
// - CoreResult: crate-wide result alias
// - Helper constructors for external command failures
//
// TAXONOMY:
// - Probe: input unreadable or not a valid video (skip the file, never retry)
// - Encode / Command* / Stalled: the encoder failed or produced nothing
//   (handled by the pipeline and batch fallbacks)
// - NoInputFiles: the job has nothing to do
// - Verification: a reported output vanished or is empty

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Custom error type for vidmorph-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Probe failed for {}: {message}", .path.display())]
    Probe { path: PathBuf, message: String },

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{0} exited with {1}: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("{0} made no progress for {1:?} and was killed")]
    Stalled(String, Duration),

    #[error("No valid input files found")]
    NoInputFiles,

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("JSON error: {0}")]
    JsonParseError(String),
}

impl CoreError {
    /// Builds a probe error for `path`.
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CoreError::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for every failure raised by the encoder side of the pipeline.
    #[must_use]
    pub fn is_encode_error(&self) -> bool {
        matches!(
            self,
            CoreError::Encode(_)
                | CoreError::CommandStart(..)
                | CoreError::CommandWait(..)
                | CoreError::CommandFailed(..)
                | CoreError::Stalled(..)
        )
    }

    /// True when the input file could not be probed.
    #[must_use]
    pub fn is_probe_error(&self) -> bool {
        matches!(self, CoreError::Probe { .. })
    }
}

/// Result type for vidmorph-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Error for a command that could not be spawned.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Error for a command whose exit status could not be collected.
pub fn command_wait_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), err)
}

/// Error for a command that exited unsuccessfully.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(tool.into(), status, stderr.into())
}
