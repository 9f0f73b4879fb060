//! Implementation of the 'schedule' subcommand.
//!
//! Loads the OAuth credentials first, so a missing or broken credentials
//! file aborts the run before the ledger is read or written. An upload
//! failure is not a command failure: progress is already recorded and the
//! next run resumes at the failed artifact.

use crate::cli::{ScheduleArgs, UploadArgs};
use crate::commands::{compile::default_log_dir, notification_sender, notify};
use crate::error::{CliErrorContext, CliResult};
use crate::logging;
use crate::terminal;

use reelstitch_core::config::ScheduleConfig;
use reelstitch_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender, hostname};
use reelstitch_core::upload::YouTubeUploader;
use reelstitch_core::ScheduleReport;

use chrono::Local;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Everything a schedule run needs once its preconditions have passed.
pub struct PreparedSchedule {
    pub config: ScheduleConfig,
    pub uploader: YouTubeUploader,
    pub sender: Option<NtfyNotificationSender>,
}

/// Creates and configures ScheduleConfig from CLI arguments.
pub fn create_schedule_config(
    artifacts_dir: &Path,
    prefix: &str,
    upload: &UploadArgs,
    ntfy: Option<&str>,
) -> CliResult<ScheduleConfig> {
    let mut config = ScheduleConfig::new(artifacts_dir.to_path_buf(), upload.ledger.clone());
    config.artifact_prefix = prefix.to_string();
    config.hours = upload.hours.clone();
    if let Some(offset) = upload.utc_offset {
        config.utc_offset = offset;
    }
    config.title = upload.title.clone();
    config.description = upload.description.clone();
    config.tags = upload
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    config.category_id = upload.category.clone();
    config.ntfy_topic = ntfy.map(str::to_string);

    config.validate()?;
    Ok(config)
}

/// Checks the configuration, the notification topic and the credentials.
/// Nothing is written to disk by this step.
pub fn prepare(
    artifacts_dir: &Path,
    prefix: &str,
    upload: &UploadArgs,
    ntfy: Option<&str>,
) -> CliResult<PreparedSchedule> {
    let config = create_schedule_config(artifacts_dir, prefix, upload, ntfy)?;
    let sender = notification_sender(config.ntfy_topic.as_deref())?;
    let uploader = YouTubeUploader::from_files(&upload.credentials, &upload.token)?;
    Ok(PreparedSchedule { config, uploader, sender })
}

/// Schedules every pending artifact and reports the outcome.
pub fn execute(prepared: &PreparedSchedule) -> CliResult<ScheduleReport> {
    let PreparedSchedule { config, uploader, sender } = prepared;
    let sender = sender.as_ref().map(|s| s as &dyn NotificationSender);

    terminal::print_section("Schedule");
    terminal::print_status("Artifacts", &config.artifacts_dir.display().to_string(), false);
    terminal::print_status("Ledger", &config.ledger_path.display().to_string(), false);
    terminal::print_status("Hours", &format_hours(&config.hours, &config.utc_offset.to_string()), false);

    let report = reelstitch_core::run_schedule(uploader, config, Local::now().fixed_offset())
        .cli_with_context(|| "Scheduling failed")?;

    display_report(&report);
    let host = hostname();
    let notification = match &report.failure {
        Some(failure) => NotificationType::UploadError {
            artifact: failure.artifact.clone(),
            message: failure.error.to_string(),
            uploaded: report.uploaded.len(),
            hostname: host,
        },
        None => NotificationType::ScheduleComplete {
            uploaded: report.uploaded.len(),
            last_slot: report.uploaded.last().map(|u| u.publish_at.to_rfc3339()),
            hostname: host,
        },
    };
    notify(sender, &notification);
    Ok(report)
}

fn format_hours(hours: &[u32], offset: &str) -> String {
    let list: Vec<String> = hours.iter().map(|h| format!("{h:02}:00")).collect();
    format!("{} ({})", list.join(", "), offset)
}

fn display_report(report: &ScheduleReport) {
    if report.resumed_from > 0 {
        info!("Resuming after {} already scheduled artifact(s)", report.resumed_from);
    }
    for upload in &report.uploaded {
        terminal::print_status(
            &upload.artifact,
            &format!("{} (video {})", upload.publish_at.to_rfc3339(), upload.video_id),
            false,
        );
    }

    match &report.failure {
        Some(failure) => {
            warn!(
                "Upload of {} for {} failed: {}",
                failure.artifact,
                failure.publish_at.to_rfc3339(),
                failure.error
            );
            terminal::print_notice(&format!(
                "Scheduled {} upload(s); {} remain. Progress is saved, re-run to resume",
                report.uploaded.len(),
                report.remaining()
            ));
        }
        None if report.uploaded.is_empty() => {
            terminal::print_success("Nothing new to schedule");
        }
        None => {
            terminal::print_success(&format!("Scheduled {} upload(s)", report.uploaded.len()));
        }
    }
}

/// The `schedule` command.
pub fn run_schedule(args: ScheduleArgs, log_dir: Option<PathBuf>) -> CliResult<ScheduleReport> {
    let prepared = prepare(&args.output_dir, &args.prefix, &args.upload, args.ntfy.as_deref())?;

    let log_dir = log_dir.unwrap_or_else(|| default_log_dir(&args.output_dir));
    let log_path = logging::attach_log_file(&log_dir, "schedule")?;
    info!("Log file: {}", log_path.display());

    execute(&prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use chrono::FixedOffset;
    use clap::Parser;

    fn schedule_args(extra: &[&str]) -> ScheduleArgs {
        let mut argv = vec!["reelstitch", "schedule"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Schedule(args) => args,
            other => panic!("expected schedule, got {other:?}"),
        }
    }

    #[test]
    fn test_schedule_config_from_args() {
        let args = schedule_args(&[
            "--hours", "8,20", "--utc-offset", "+02:00", "--tags", "a, ,b", "--title", "Weekly", "--prefix", "weekly",
        ]);
        let config = create_schedule_config(&args.output_dir, &args.prefix, &args.upload, Some("https://ntfy.sh/t")).unwrap();
        assert_eq!(config.hours, vec![8, 20]);
        assert_eq!(config.utc_offset, FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(config.tags, vec!["a", "b"]);
        assert_eq!(config.title, "Weekly");
        assert_eq!(config.artifact_prefix, "weekly");
        assert_eq!(config.ntfy_topic.as_deref(), Some("https://ntfy.sh/t"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let args = schedule_args(&["--title", " "]);
        assert!(create_schedule_config(&args.output_dir, &args.prefix, &args.upload, None).is_err());
    }

    #[test]
    fn test_missing_credentials_fail_preparation() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.json");
        let credentials = dir.path().join("credentials.json");
        let args = schedule_args(&[
            "--ledger",
            ledger.to_str().unwrap(),
            "--credentials",
            credentials.to_str().unwrap(),
        ]);
        let result = prepare(&args.output_dir, &args.prefix, &args.upload, None);
        assert!(matches!(result, Err(reelstitch_core::CoreError::Credentials(_))));
        assert!(!ledger.exists());
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(&[9, 18], "-03:00"), "09:00, 18:00 (-03:00)");
    }
}
