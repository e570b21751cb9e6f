// vidmorph-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for this crate's unit tests and for dependants enabling "test-mocks".

use super::*;
use crate::error::{CoreError, CoreResult, command_start_error};
use crate::utils::is_nonempty_file;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;
use std::time::Duration;

/// Bytes written to a mocked output file.
pub const MOCK_OUTPUT_BYTES: &[u8] = b"mock ffmpeg output";

/// What a mocked ffmpeg invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    /// Exit 0 and write a non-empty output file.
    Success,
    /// Exit 0 but leave an empty output file behind.
    EmptyOutput,
    /// Exit with the given code and write nothing.
    ExitFailure(i32),
    /// Fail before the process starts.
    SpawnFailure,
    /// Trip the progress watchdog.
    Stall,
}

/// Mock implementation of FfmpegProcess.
pub struct MockFfmpegProcess {
    events_to_emit: Vec<FfmpegEvent>,
    exit_status: ExitStatus,
    stall: bool,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.drain(..) {
            handler(event)?;
        }
        if self.stall {
            return Err(CoreError::Stalled("ffmpeg".to_string(), Duration::from_secs(300)));
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// A rule that applies `outcome` when every pattern occurs in some argument.
struct MockRule {
    patterns: Vec<String>,
    outcome: MockOutcome,
}

impl MockRule {
    fn matches(&self, args: &[String]) -> bool {
        self.patterns
            .iter()
            .all(|pattern| args.iter().any(|arg| arg.contains(pattern.as_str())))
    }
}

/// Mock implementation of FfmpegSpawner.
///
/// Rules are checked in insertion order and stay active for every call;
/// calls matching no rule use the default outcome (initially `Success`).
#[derive(Clone)]
pub struct MockFfmpegSpawner {
    rules: Rc<RefCell<Vec<MockRule>>>,
    default_outcome: Rc<Cell<MockOutcome>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl Default for MockFfmpegSpawner {
    fn default() -> Self {
        Self {
            rules: Rc::default(),
            default_outcome: Rc::new(Cell::new(MockOutcome::Success)),
            received_calls: Rc::default(),
        }
    }
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome for calls that match no rule.
    pub fn set_default(&self, outcome: MockOutcome) {
        self.default_outcome.set(outcome);
    }

    /// Applies `outcome` to every call whose arguments contain all `patterns`.
    pub fn on(&self, patterns: &[&str], outcome: MockOutcome) {
        self.rules.borrow_mut().push(MockRule {
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
            outcome,
        });
    }

    pub fn received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Number of recorded calls whose arguments contain `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.received_calls
            .borrow()
            .iter()
            .filter(|args| args.iter().any(|arg| arg.contains(pattern)))
            .count()
    }

    fn outcome_for(&self, args: &[String]) -> MockOutcome {
        self.rules
            .borrow()
            .iter()
            .find(|rule| rule.matches(args))
            .map_or_else(|| self.default_outcome.get(), |rule| rule.outcome)
    }
}

fn write_mock_output(args: &[String], contents: &[u8]) {
    let Some(output_path) = args.last().map(PathBuf::from) else {
        log::warn!("MockFfmpegSpawner couldn't find output path in args.");
        return;
    };
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {parent:?}: {e}");
        }
    }
    if let Err(e) = std::fs::write(&output_path, contents) {
        log::error!("MockFfmpegSpawner failed to write {output_path:?}: {e}");
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let outcome = self.outcome_for(&args);
        log::debug!("MockFfmpegSpawner: {outcome:?} for {args:?}");

        let started = vec![FfmpegEvent::Log(LogLevel::Info, "mock ffmpeg started".to_string())];
        match outcome {
            MockOutcome::Success => {
                write_mock_output(&args, MOCK_OUTPUT_BYTES);
                Ok(MockFfmpegProcess {
                    events_to_emit: started,
                    exit_status: ExitStatus::from_raw(0),
                    stall: false,
                })
            }
            MockOutcome::EmptyOutput => {
                write_mock_output(&args, b"");
                Ok(MockFfmpegProcess {
                    events_to_emit: started,
                    exit_status: ExitStatus::from_raw(0),
                    stall: false,
                })
            }
            MockOutcome::ExitFailure(code) => Ok(MockFfmpegProcess {
                events_to_emit: vec![FfmpegEvent::Error("mock ffmpeg failure".to_string())],
                exit_status: ExitStatus::from_raw(code << 8),
                stall: false,
            }),
            MockOutcome::SpawnFailure => Err(command_start_error(
                "ffmpeg (mock)",
                std::io::Error::new(std::io::ErrorKind::NotFound, "mock spawn failure"),
            )),
            MockOutcome::Stall => Ok(MockFfmpegProcess {
                events_to_emit: started,
                exit_status: ExitStatus::from_raw(9),
                stall: true,
            }),
        }
    }
}

/// Mock implementation of FfprobeExecutor.
///
/// Lookup order: exact-path override, substring failure pattern, then the
/// default info for any existing non-empty file. Missing or empty files fail
/// like the real inspector does.
#[derive(Clone)]
pub struct MockFfprobeExecutor {
    default_info: Rc<RefCell<MediaInfo>>,
    overrides: Rc<RefCell<HashMap<PathBuf, Result<MediaInfo, String>>>>,
    failure_patterns: Rc<RefCell<Vec<String>>>,
    received_calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl Default for MockFfprobeExecutor {
    fn default() -> Self {
        Self::with_default(Self::info(1280, 720))
    }
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(info: MediaInfo) -> Self {
        Self {
            default_info: Rc::new(RefCell::new(info)),
            overrides: Rc::default(),
            failure_patterns: Rc::default(),
            received_calls: Rc::default(),
        }
    }

    /// Convenience `MediaInfo` for a 30 fps, 10 second clip with audio.
    pub fn info(width: u32, height: u32) -> MediaInfo {
        MediaInfo {
            width,
            height,
            frame_rate: Some(30.0),
            duration_secs: Some(10.0),
            has_audio: true,
            format_name: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        }
    }

    pub fn set_default(&self, info: MediaInfo) {
        *self.default_info.borrow_mut() = info;
    }

    pub fn set_info(&self, path: &Path, info: MediaInfo) {
        self.overrides.borrow_mut().insert(path.to_path_buf(), Ok(info));
    }

    pub fn set_failure(&self, path: &Path, message: &str) {
        self.overrides
            .borrow_mut()
            .insert(path.to_path_buf(), Err(message.to_string()));
    }

    /// Fails every probe whose path contains `pattern`.
    pub fn fail_matching(&self, pattern: &str) {
        self.failure_patterns.borrow_mut().push(pattern.to_string());
    }

    pub fn received_calls(&self) -> Vec<PathBuf> {
        self.received_calls.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, path: &Path) -> CoreResult<MediaInfo> {
        self.received_calls.borrow_mut().push(path.to_path_buf());

        if let Some(result) = self.overrides.borrow().get(path) {
            return result.clone().map_err(|message| CoreError::probe(path, message));
        }

        let text = path.to_string_lossy();
        if let Some(pattern) = self
            .failure_patterns
            .borrow()
            .iter()
            .find(|pattern| text.contains(pattern.as_str()))
        {
            return Err(CoreError::probe(path, format!("mock failure ({pattern})")));
        }

        if !is_nonempty_file(path) {
            return Err(CoreError::probe(path, "file is missing or empty"));
        }

        Ok(self.default_info.borrow().clone())
    }
}
