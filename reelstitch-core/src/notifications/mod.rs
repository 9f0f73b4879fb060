//! Notifications about finished or failed runs.
//!
//! Delivered through ntfy.sh when a topic is configured.
mod abstraction;
mod ntfy;

pub use abstraction::{NotificationSender, NotificationType, hostname};
pub use ntfy::NtfyNotificationSender;
