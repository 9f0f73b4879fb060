// ============================================================================
// reelstitch-core/src/notifications/ntfy.rs
// ============================================================================
//
// NTFY IMPLEMENTATION: Push Notifications Through ntfy.sh
//
// Sends run notifications to an ntfy topic given as a full URL such as
// `https://ntfy.sh/my-topic`, using the blocking dispatcher of the ntfy
// crate.

use crate::error::{CoreError, CoreResult};
use crate::notifications::{NotificationSender, NotificationType};

use ntfy::DispatcherBuilder;
use ntfy::payload::{Payload, Priority as NtfyPriority};

const APP_TAG: &str = "reelstitch";

/// Sends notifications to an ntfy topic.
///
/// # Examples
///
/// ```rust,no_run
/// use reelstitch_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
///
/// let sender = NtfyNotificationSender::new("https://ntfy.sh/your_topic").unwrap();
/// let notification = NotificationType::CompileError {
///     message: "ffmpeg exited with status 1".to_string(),
///     hostname: "render-box".to_string(),
/// };
/// sender.send_notification(&notification).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NtfyNotificationSender {
    topic_url: String,
    base_url: String,
    topic: String,
}

impl NtfyNotificationSender {
    /// Validates `topic_url` (`https://<host>/<topic>`) and builds a sender.
    pub fn new(topic_url: &str) -> CoreResult<Self> {
        let (base_url, topic) = split_topic_url(topic_url)?;
        Ok(Self {
            topic_url: topic_url.to_string(),
            base_url,
            topic,
        })
    }

    pub fn topic_url(&self) -> &str {
        &self.topic_url
    }
}

impl NotificationSender for NtfyNotificationSender {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        let dispatcher = DispatcherBuilder::new(&self.base_url)
            .build_blocking()
            .map_err(|e| {
                CoreError::NotificationError(format!(
                    "Failed to build ntfy dispatcher for {}: {}",
                    self.base_url, e
                ))
            })?;

        let priority = map_priority(notification.get_priority()).unwrap_or_else(|| {
            log::warn!(
                "Invalid ntfy priority value provided: {}",
                notification.get_priority()
            );
            NtfyPriority::Default
        });

        let tags = vec![APP_TAG.to_string(), notification.outcome_tag().to_string()];

        let payload = Payload::new(&self.topic)
            .message(notification.get_message())
            .title(notification.get_title())
            .priority(priority)
            .tags(tags);

        dispatcher.send(&payload).map_err(|e| {
            CoreError::NotificationError(format!(
                "Failed to send ntfy notification to {}: {}",
                self.topic_url, e
            ))
        })
    }
}

/// Splits `https://host/topic` into `("https://host", "topic")`.
fn split_topic_url(topic_url: &str) -> CoreResult<(String, String)> {
    let after_scheme = topic_url.strip_prefix("https://").ok_or_else(|| {
        CoreError::NotificationError(format!(
            "Invalid ntfy topic URL '{topic_url}': must start with https://"
        ))
    })?;

    let (host, topic) = after_scheme.split_once('/').unwrap_or((after_scheme, ""));
    if host.is_empty() {
        return Err(CoreError::NotificationError(format!(
            "URL '{topic_url}' must have a non-empty host"
        )));
    }
    let topic = topic.trim_end_matches('/');
    if topic.is_empty() {
        return Err(CoreError::NotificationError(format!(
            "URL '{topic_url}' is missing topic path"
        )));
    }
    Ok((format!("https://{host}"), topic.to_string()))
}

/// Maps 1-5 onto ntfy's Min..Max.
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
