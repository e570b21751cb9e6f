//! Job status and the terminal result contract.
//!
//! A batch moves Pending -> Processing -> {Success, Failure} exactly once.
//! `JobTracker` enforces that shape: it forwards Processing messages to the
//! caller's sink and is consumed when the terminal status is recorded.
//! `JobResult` is the wire form handed to whatever wraps the core:
//!
//! ```json
//! {"status": "success", "files": ["12.mp4", "13.mp4"]}
//! {"status": "error", "error": "No valid input files found"}
//! ```

use crate::progress_reporting::ProgressSink;

use serde::{Deserialize, Serialize};

use std::cell::RefCell;

/// Terminal result of a batch job, serialised as the status contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobResult {
    /// At least one variant was produced and every output re-verified.
    Success { files: Vec<String> },
    /// Nothing usable was produced, or verification failed.
    Error { error: String },
}

impl JobResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }

    /// Serialises to the JSON contract.
    pub fn to_json(&self) -> crate::CoreResult<String> {
        serde_json::to_string(self).map_err(|e| crate::CoreError::JsonParseError(e.to_string()))
    }
}

/// Observable state of one batch job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing(String),
    Success(Vec<String>),
    Failure(String),
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success(_) | JobStatus::Failure(_))
    }
}

impl From<&JobResult> for JobStatus {
    fn from(result: &JobResult) -> Self {
        match result {
            JobResult::Success { files } => JobStatus::Success(files.clone()),
            JobResult::Error { error } => JobStatus::Failure(error.clone()),
        }
    }
}

/// Tracks a job from Pending to its single terminal status.
pub struct JobTracker<'a> {
    sink: &'a dyn ProgressSink,
    state: RefCell<JobStatus>,
}

impl<'a> JobTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            state: RefCell::new(JobStatus::Pending),
        }
    }

    /// Records and forwards an in-progress message.
    pub fn processing(&self, message: &str) {
        *self.state.borrow_mut() = JobStatus::Processing(message.to_string());
        self.sink.report(message);
    }

    #[must_use]
    pub fn state(&self) -> JobStatus {
        self.state.borrow().clone()
    }

    pub fn succeed(self, files: Vec<String>) -> JobResult {
        log::info!("Job succeeded with {} file(s)", files.len());
        JobResult::Success { files }
    }

    pub fn fail(self, error: impl Into<String>) -> JobResult {
        let error = error.into();
        log::error!("Job failed: {error}");
        JobResult::Error { error }
    }
}

impl ProgressSink for JobTracker<'_> {
    fn report(&self, message: &str) {
        self.processing(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress_reporting::NullSink;

    #[test]
    fn success_wire_shape() {
        let result = JobResult::Success {
            files: vec!["4.mp4".to_string(), "5.mp4".to_string()],
        };
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "files": ["4.mp4", "5.mp4"]}));
    }

    #[test]
    fn error_wire_shape() {
        let result = JobResult::Error {
            error: "No valid input files found".to_string(),
        };
        assert_eq!(
            result.to_json().unwrap(),
            r#"{"status":"error","error":"No valid input files found"}"#
        );
        let back: JobResult = serde_json::from_str(r#"{"status":"error","error":"x"}"#).unwrap();
        assert!(!back.is_success());
    }

    #[test]
    fn tracker_moves_from_pending_to_processing() {
        let seen = RefCell::new(Vec::new());
        let sink = |m: &str| seen.borrow_mut().push(m.to_string());
        let tracker = JobTracker::new(&sink);
        assert_eq!(tracker.state(), JobStatus::Pending);

        tracker.processing("Applying random noise...");
        assert_eq!(tracker.state(), JobStatus::Processing("Applying random noise...".to_string()));
        assert!(!tracker.state().is_terminal());

        let result = tracker.fail("boom");
        assert!(JobStatus::from(&result).is_terminal());
        assert_eq!(seen.borrow().as_slice(), ["Applying random noise..."]);
    }

    #[test]
    fn tracker_is_a_sink() {
        let tracker = JobTracker::new(&NullSink);
        let sink: &dyn ProgressSink = &tracker;
        sink.report("Finalizing video...");
        assert_eq!(tracker.state(), JobStatus::Processing("Finalizing video...".to_string()));
        assert_eq!(
            tracker.succeed(vec!["1.mp4".into()]),
            JobResult::Success { files: vec!["1.mp4".into()] }
        );
    }
}
