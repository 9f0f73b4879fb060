// ============================================================================
// reelstitch-core/src/scheduler.rs
// ============================================================================
//
// UPLOAD SCHEDULER: Resumable Sequential Publishing
//
// Walks the compiled artifacts in numeric order, starting right after the
// one the ledger names, and schedules each for publication at the next slot.
// The ledger is rewritten after every attempt:
//
// - success: {this artifact, this slot}
// - failure: {the artifact before it (or null), this slot}, then stop
//
// The slot is kept on failure so a retry never reuses it. Uploads are
// strictly sequential; each slot depends on the previous one.

use crate::config::ScheduleConfig;
use crate::discovery::{ArtifactFile, find_artifacts};
use crate::error::{CoreError, CoreResult};
use crate::ledger::{Ledger, LedgerStore};
use crate::schedule::ScheduleCursor;
use crate::upload::{UploadRequest, Uploader};

use chrono::{DateTime, FixedOffset};

/// An artifact accepted by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledUpload {
    pub artifact: String,
    pub publish_at: DateTime<FixedOffset>,
    pub video_id: String,
}

/// The attempt that stopped the run.
#[derive(Debug)]
pub struct UploadFailure {
    pub artifact: String,
    pub publish_at: DateTime<FixedOffset>,
    pub error: CoreError,
}

/// Outcome of one scheduling run.
#[derive(Debug, Default)]
pub struct ScheduleReport {
    /// Position in the artifact list the run started at.
    pub resumed_from: usize,
    pub total: usize,
    pub uploaded: Vec<ScheduledUpload>,
    pub failure: Option<UploadFailure>,
}

impl ScheduleReport {
    /// Artifacts still waiting for a slot after this run.
    pub fn remaining(&self) -> usize {
        self.total
            .saturating_sub(self.resumed_from)
            .saturating_sub(self.uploaded.len())
    }
}

/// Position of the first artifact still to schedule.
///
/// A ledger naming an artifact that is no longer in the list restarts from
/// the first artifact.
pub fn resume_index(artifacts: &[ArtifactFile], ledger: &Ledger) -> usize {
    let Some(last) = ledger.last_uploaded.as_deref() else {
        return 0;
    };
    match artifacts.iter().position(|a| a.name() == last) {
        Some(i) => i + 1,
        None => {
            log::warn!("Ledger names {last}, which is not among the current artifacts; starting from the first");
            0
        }
    }
}

/// Schedules every artifact in `config.artifacts_dir` not yet recorded in
/// the ledger at `config.ledger_path`.
pub fn run_schedule<U: Uploader>(
    uploader: &U,
    config: &ScheduleConfig,
    now: DateTime<FixedOffset>,
) -> CoreResult<ScheduleReport> {
    config.validate()?;
    let artifacts = find_artifacts(&config.artifacts_dir, &config.artifact_prefix)?;
    let store = LedgerStore::new(&config.ledger_path);
    schedule_artifacts(uploader, &store, &artifacts, config, now)
}

/// Schedules `artifacts` from the ledger's resume point onward.
///
/// An upload failure is not an error of this function: it is recorded in
/// the ledger and returned in [`ScheduleReport::failure`]. Errors are
/// returned for invalid configuration and ledger write failures.
pub fn schedule_artifacts<U: Uploader>(
    uploader: &U,
    store: &LedgerStore,
    artifacts: &[ArtifactFile],
    config: &ScheduleConfig,
    now: DateTime<FixedOffset>,
) -> CoreResult<ScheduleReport> {
    config.validate()?;
    let ledger = store.load();
    let start = resume_index(artifacts, &ledger);
    let mut cursor = ScheduleCursor::resume(ledger.last_date, start, now, config.utc_offset);
    let mut report = ScheduleReport {
        resumed_from: start,
        total: artifacts.len(),
        ..Default::default()
    };

    if start >= artifacts.len() {
        log::info!("Nothing to schedule: all {} artifacts are already scheduled", artifacts.len());
        return Ok(report);
    }
    log::info!(
        "Scheduling {} of {} artifacts, starting at {}",
        artifacts.len() - start,
        artifacts.len(),
        artifacts[start].name()
    );

    for (i, artifact) in artifacts.iter().enumerate().skip(start) {
        let name = artifact.name();
        let slot = cursor
            .advance(&config.hours, config.utc_offset)
            .ok_or_else(|| CoreError::Config("no publish slot could be computed".to_string()))?;
        let request = UploadRequest::from_config(config, slot);

        log::info!("Uploading {} for {}", name, slot.to_rfc3339());
        match uploader.schedule_upload(&artifact.path, &request) {
            Ok(video_id) => {
                store.save(&Ledger {
                    last_uploaded: Some(name.clone()),
                    last_date: Some(slot),
                })?;
                log::info!("{} scheduled for {} (video {})", name, slot.to_rfc3339(), video_id);
                report.uploaded.push(ScheduledUpload {
                    artifact: name,
                    publish_at: slot,
                    video_id,
                });
            }
            Err(error) => {
                let previous = i.checked_sub(1).map(|p| artifacts[p].name());
                store.save(&Ledger {
                    last_uploaded: previous,
                    last_date: Some(slot),
                })?;
                log::error!("Upload of {} failed: {}. Stopping; re-run to resume", name, error);
                report.failure = Some(UploadFailure {
                    artifact: name,
                    publish_at: slot,
                    error,
                });
                break;
            }
        }
    }

    Ok(report)
}
