// ============================================================================
// vidmorph-core/src/notifications/ntfy.rs
// ============================================================================
//
// NTFY IMPLEMENTATION: Push Notifications via ntfy
//
// Sends batch notifications to an ntfy topic with the blocking dispatcher.
//
// KEY COMPONENTS:
// - NtfyNotificationSender: validated topic URL plus delivery

use crate::error::{CoreError, CoreResult};
use crate::notifications::{NotificationSender, NotificationType};

use ntfy::DispatcherBuilder;
use ntfy::payload::{Payload, Priority as NtfyPriority};

/// Sends notifications to an ntfy server.
///
/// # Examples
///
/// ```rust,no_run
/// use vidmorph_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
/// use std::path::PathBuf;
///
/// let sender = NtfyNotificationSender::new("https://ntfy.sh/your_topic").unwrap();
/// let notification = NotificationType::BatchStart {
///     input_dir: PathBuf::from("/uploads/job42"),
///     copies: 3,
///     hostname: "worker1".to_string(),
/// };
/// sender.send_notification(&notification).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NtfyNotificationSender {
    base_url: String,
    topic: String,
}

impl NtfyNotificationSender {
    /// Validates `topic_url` (`https://host/topic`).
    pub fn new(topic_url: &str) -> CoreResult<Self> {
        let Some(after_scheme) = topic_url.strip_prefix("https://") else {
            return Err(CoreError::NotificationError(format!(
                "Invalid ntfy topic URL '{topic_url}': must start with https://"
            )));
        };

        let (host, topic) = after_scheme.split_once('/').unwrap_or((after_scheme, ""));
        if host.is_empty() {
            return Err(CoreError::NotificationError(format!(
                "Invalid ntfy topic URL '{topic_url}': missing host"
            )));
        }
        let topic = topic.trim_end_matches('/');
        if topic.is_empty() {
            return Err(CoreError::NotificationError(format!(
                "URL '{topic_url}' is missing topic path"
            )));
        }

        Ok(Self {
            base_url: format!("https://{host}"),
            topic: topic.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl NotificationSender for NtfyNotificationSender {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        let dispatcher = DispatcherBuilder::new(&self.base_url)
            .build_blocking()
            .map_err(|e| {
                CoreError::NotificationError(format!(
                    "Failed to build ntfy dispatcher for {}: {e}",
                    self.base_url
                ))
            })?;

        let priority = map_priority(notification.priority()).unwrap_or_else(|| {
            log::warn!("Invalid ntfy priority value: {}", notification.priority());
            NtfyPriority::Default
        });

        let payload = Payload::new(&self.topic)
            .message(notification.message())
            .title(notification.title())
            .priority(priority)
            .tags(vec!["vidmorph".to_string(), notification.tag().to_string()]);

        dispatcher.send(&payload).map_err(|e| {
            CoreError::NotificationError(format!(
                "Failed to send ntfy notification to {}/{}: {e}",
                self.base_url, self.topic
            ))
        })?;
        log::debug!("Sent '{}' notification to {}", notification.title(), self.topic);
        Ok(())
    }
}

/// Maps 1-5 onto ntfy priorities.
fn map_priority(p: u8) -> Option<NtfyPriority> {
    match p {
        1 => Some(NtfyPriority::Min),
        2 => Some(NtfyPriority::Low),
        3 => Some(NtfyPriority::Default),
        4 => Some(NtfyPriority::High),
        5 => Some(NtfyPriority::Max),
        _ => None,
    }
}
