//! Command implementations for the CLI.
//!
//! Each command checks every precondition (inputs, tools, credentials)
//! before it attaches a run log file or touches any output.

use log::warn;
use reelstitch_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
use reelstitch_core::CoreResult;

/// The `compile` command: groups clips and writes numbered compilations.
pub mod compile;
/// The `run` command: compile, then schedule.
pub mod run;
/// The `schedule` command: uploads pending compilations into future slots.
pub mod schedule;

/// Builds a sender for the optional ntfy topic URL.
pub(crate) fn notification_sender(topic: Option<&str>) -> CoreResult<Option<NtfyNotificationSender>> {
    topic.map(NtfyNotificationSender::new).transpose()
}

/// Sends `notification` if a sender is configured. Delivery problems are
/// logged and never change the run's outcome.
pub(crate) fn notify(sender: Option<&dyn NotificationSender>, notification: &NotificationType) {
    let Some(sender) = sender else {
        return;
    };
    if let Err(e) = sender.send_notification(notification) {
        warn!("Failed to send notification: {e}");
    }
}
