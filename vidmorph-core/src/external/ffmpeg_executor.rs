// ============================================================================
// vidmorph-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. It defines traits and implementations for executing FFmpeg commands
// and handling their events and lifecycle.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
//
// STALL WATCHDOG:
// The sidecar event iterator blocks until ffmpeg writes something. A pump
// thread drains it into a channel so the caller can wait with a deadline;
// the deadline moves forward on every progress event. When it passes, the
// child is killed and `CoreError::Stalled` is returned.

use crate::config::DEFAULT_STALL_TIMEOUT;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess {
    child: SidecarChild,
    stall_timeout: Duration,
}

impl SidecarProcess {
    fn kill_stalled(&mut self) -> CoreError {
        log::error!(
            "ffmpeg reported no progress for {:?}, killing process",
            self.stall_timeout
        );
        if let Err(e) = self.child.kill() {
            log::warn!("Failed to kill stalled ffmpeg process: {e}");
        }
        CoreError::Stalled("ffmpeg".to_string(), self.stall_timeout)
    }
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.child.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            CoreError::Encode(format!("Failed to read ffmpeg events: {e}"))
        })?;

        let (tx, rx) = mpsc::channel();
        let pump = thread::Builder::new()
            .name("ffmpeg-events".to_string())
            .spawn(move || {
                for event in iterator {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| command_start_error("ffmpeg event pump", e))?;

        let mut deadline = Instant::now() + self.stall_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(event) => {
                    if matches!(event, FfmpegEvent::Progress(_)) {
                        deadline = Instant::now() + self.stall_timeout;
                    }
                    if let Err(e) = handler(event) {
                        let _ = self.child.kill();
                        return Err(e);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(self.kill_stalled()),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if pump.join().is_err() {
            log::warn!("ffmpeg event pump thread panicked");
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone)]
pub struct SidecarSpawner {
    stall_timeout: Duration,
}

impl Default for SidecarSpawner {
    fn default() -> Self {
        Self::new(DEFAULT_STALL_TIMEOUT)
    }
}

impl SidecarSpawner {
    #[must_use]
    pub fn new(stall_timeout: Duration) -> Self {
        Self { stall_timeout }
    }

    #[must_use]
    pub fn stall_timeout(&self) -> Duration {
        self.stall_timeout
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(|child| SidecarProcess {
                child,
                stall_timeout: self.stall_timeout,
            })
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

/// Converts a failed exit status plus captured stderr into a `CoreError`.
pub(crate) fn exit_status_error(label: &str, status: ExitStatus, stderr: &str) -> CoreError {
    let stderr = stderr.trim();
    let detail = if stderr.is_empty() {
        "no error output captured".to_string()
    } else {
        stderr.to_string()
    };
    command_failed_error(label, status, detail)
}
