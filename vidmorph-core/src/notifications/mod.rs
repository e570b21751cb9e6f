//! Push notifications about batch start, completion and failure.
//!
//! Delivery uses the ntfy service. Callers log delivery failures and carry on.
mod abstraction;
mod ntfy;

pub use abstraction::{NotificationSender, NotificationType, NullNotificationSender};
pub use ntfy::NtfyNotificationSender;
