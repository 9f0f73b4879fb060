// ============================================================================
// reelstitch-core/src/notifications/abstraction.rs
// ============================================================================
//
// NOTIFICATION ABSTRACTION: Run Outcome Notifications
//
// Notifications describe how a compile or schedule run ended. The sender
// trait is the seam between run outcomes and the ntfy.sh backend.
//
// KEY COMPONENTS:
// - NotificationType: The notifications a run can emit
// - NotificationSender: Trait for delivering them

use crate::error::CoreResult;

use std::process::Command;
use std::time::Duration;

/// Notifications emitted at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationType {
    /// Every group was compiled.
    CompileComplete {
        artifacts: usize,
        skipped: usize,
        elapsed: Duration,
        hostname: String,
    },

    /// Compilation stopped on an error.
    CompileError { message: String, hostname: String },

    /// The scheduler processed every pending artifact.
    ScheduleComplete {
        uploaded: usize,
        last_slot: Option<String>,
        hostname: String,
    },

    /// An upload failed; the run stopped after recording progress.
    UploadError {
        artifact: String,
        message: String,
        uploaded: usize,
        hostname: String,
    },
}

impl NotificationType {
    pub fn get_title(&self) -> String {
        match self {
            NotificationType::CompileComplete { .. } => "Compilation Complete".to_string(),
            NotificationType::CompileError { .. } => "Compilation Failed".to_string(),
            NotificationType::ScheduleComplete { .. } => "Uploads Scheduled".to_string(),
            NotificationType::UploadError { .. } => "Upload Failed".to_string(),
        }
    }

    pub fn get_message(&self) -> String {
        match self {
            NotificationType::CompileComplete {
                artifacts,
                skipped,
                elapsed,
                hostname,
            } => {
                let mut message = format!(
                    "Compiled {} on {} in {}",
                    plural(*artifacts, "compilation"),
                    hostname,
                    format_elapsed(*elapsed)
                );
                if *skipped > 0 {
                    message.push_str(&format!(" ({skipped} already existed)"));
                }
                message
            }
            NotificationType::CompileError { message, hostname } => {
                format!("Compilation on {hostname} stopped: {message}")
            }
            NotificationType::ScheduleComplete {
                uploaded,
                last_slot,
                hostname,
            } => match last_slot {
                Some(slot) => format!(
                    "Scheduled {} from {}; last publishes at {}",
                    plural(*uploaded, "upload"),
                    hostname,
                    slot
                ),
                None => format!("Nothing new to schedule on {hostname}"),
            },
            NotificationType::UploadError {
                artifact,
                message,
                uploaded,
                hostname,
            } => format!(
                "Upload of {} from {} failed after {}: {}. Re-run to resume",
                artifact,
                hostname,
                plural(*uploaded, "successful upload"),
                message
            ),
        }
    }

    /// Priority level (1-5, with 5 being highest).
    pub fn get_priority(&self) -> u8 {
        match self {
            NotificationType::CompileComplete { .. } | NotificationType::ScheduleComplete { .. } => 3,
            NotificationType::CompileError { .. } | NotificationType::UploadError { .. } => 5,
        }
    }

    /// Tag describing the outcome, attached next to the application tag.
    pub fn outcome_tag(&self) -> &'static str {
        match self {
            NotificationType::CompileComplete { .. } | NotificationType::ScheduleComplete { .. } => "complete",
            NotificationType::CompileError { .. } | NotificationType::UploadError { .. } => "error",
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

/// Name of this machine, for notification messages.
pub fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.is_empty())
        .or_else(|| {
            Command::new("hostname")
                .output()
                .ok()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "unknown host".to_string())
}

/// Delivers notifications to some backend.
pub trait NotificationSender: Send + Sync {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_complete_message() {
        let notification = NotificationType::CompileComplete {
            artifacts: 3,
            skipped: 1,
            elapsed: Duration::from_secs(125),
            hostname: "box".to_string(),
        };
        assert_eq!(
            notification.get_message(),
            "Compiled 3 compilations on box in 2m 5s (1 already existed)"
        );
        assert_eq!(notification.get_priority(), 3);
        assert_eq!(notification.outcome_tag(), "complete");
    }

    #[test]
    fn test_upload_error_message() {
        let notification = NotificationType::UploadError {
            artifact: "compilation-4.mp4".to_string(),
            message: "quota exceeded".to_string(),
            uploaded: 1,
            hostname: "box".to_string(),
        };
        assert_eq!(
            notification.get_message(),
            "Upload of compilation-4.mp4 from box failed after 1 successful upload: quota exceeded. Re-run to resume"
        );
        assert_eq!(notification.get_priority(), 5);
        assert_eq!(notification.outcome_tag(), "error");
    }

    #[test]
    fn test_schedule_complete_without_uploads() {
        let notification = NotificationType::ScheduleComplete {
            uploaded: 0,
            last_slot: None,
            hostname: "box".to_string(),
        };
        assert_eq!(notification.get_message(), "Nothing new to schedule on box");
    }
}
