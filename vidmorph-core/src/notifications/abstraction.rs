// ============================================================================
// vidmorph-core/src/notifications/abstraction.rs
// ============================================================================
//
// NOTIFICATION ABSTRACTION: Batch Lifecycle Notifications
//
// Defines what a batch can announce and the trait a backend implements to
// deliver it. Delivery failures are reported to the caller, who logs them;
// they never alter a job's result.
//
// KEY COMPONENTS:
// - NotificationType: batch start, completion and error notices
// - NotificationSender: trait for delivering notifications
// - NullNotificationSender: no-op backend

use crate::error::CoreResult;
use crate::utils::format_duration;

use std::path::PathBuf;
use std::time::Duration;

/// Notices sent around one batch job.
#[derive(Debug, Clone)]
pub enum NotificationType {
    BatchStart {
        input_dir: PathBuf,
        copies: u32,
        hostname: String,
    },

    BatchComplete {
        input_dir: PathBuf,
        /// Output file names, as in the job result
        files: Vec<String>,
        duration: Duration,
        hostname: String,
    },

    BatchError {
        input_dir: PathBuf,
        message: String,
        hostname: String,
    },
}

fn dir_label(dir: &std::path::Path) -> String {
    dir.file_name()
        .map_or_else(|| dir.display().to_string(), |n| n.to_string_lossy().into_owned())
}

impl NotificationType {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationType::BatchStart { .. } => "Batch Started",
            NotificationType::BatchComplete { .. } => "Batch Complete",
            NotificationType::BatchError { .. } => "Batch Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            NotificationType::BatchStart { input_dir, copies, hostname } => format!(
                "Generating {copies} variant(s) per file from {} on {hostname}",
                dir_label(input_dir)
            ),
            NotificationType::BatchComplete { input_dir, files, duration, hostname } => format!(
                "Finished {} on {hostname} in {}: {}",
                dir_label(input_dir),
                format_duration(duration.as_secs_f64()),
                files.join(", ")
            ),
            NotificationType::BatchError { input_dir, message, hostname } => {
                format!("Batch {} failed on {hostname}: {message}", dir_label(input_dir))
            }
        }
    }

    /// Priority level 1-5, 5 being highest.
    pub fn priority(&self) -> u8 {
        match self {
            NotificationType::BatchStart { .. } => 3,
            NotificationType::BatchComplete { .. } => 4,
            NotificationType::BatchError { .. } => 5,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NotificationType::BatchStart { .. } => "start",
            NotificationType::BatchComplete { .. } => "complete",
            NotificationType::BatchError { .. } => "error",
        }
    }
}

/// Delivers notifications to some backend.
pub trait NotificationSender: Send + Sync {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct NullNotificationSender;

impl NotificationSender for NullNotificationSender {
    fn send_notification(&self, _notification: &NotificationType) -> CoreResult<()> {
        Ok(())
    }
}
