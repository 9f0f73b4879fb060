//! FFprobe integration for clip duration probing.
//!
//! The grouper only needs one fact per clip, its container duration, so the
//! probing seam is a single-method trait that tests can fake.
use crate::error::{CoreError, CoreResult};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Trait for probing media durations.
pub trait FfprobeExecutor: Send + Sync {
    /// Returns the duration of `input_path` in seconds.
    fn probe_duration(&self, input_path: &Path) -> CoreResult<f64>;
}

/// `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe_duration(&self, input_path: &Path) -> CoreResult<f64> {
        log::debug!(
            "Running ffprobe (via crate) for duration on: {}",
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| {
            log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
            map_ffprobe_error(input_path, err)
        })?;

        let raw = metadata.format.duration.as_deref().ok_or_else(|| CoreError::Probe {
            path: input_path.to_path_buf(),
            reason: "container reports no duration".to_string(),
        })?;
        parse_duration(input_path, raw)
    }
}

/// Parses ffprobe's textual duration, rejecting values the grouper cannot use.
pub(crate) fn parse_duration(input_path: &Path, raw: &str) -> CoreResult<f64> {
    let secs = raw.trim().parse::<f64>().map_err(|e| CoreError::Probe {
        path: input_path.to_path_buf(),
        reason: format!("unparseable duration '{raw}': {e}"),
    })?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(CoreError::Probe {
            path: input_path.to_path_buf(),
            reason: format!("invalid duration {secs}"),
        });
    }
    Ok(secs)
}

fn map_ffprobe_error(input_path: &Path, err: FfProbeError) -> CoreError {
    let reason = match err {
        FfProbeError::Io(io_err) => format!("could not run ffprobe: {io_err}"),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("ffprobe exited with {}: {}", output.status, stderr.trim())
        }
        FfProbeError::Deserialize(err) => format!("ffprobe output deserialization: {err}"),
        other => format!("unknown ffprobe error: {other:?}"),
    };
    CoreError::Probe {
        path: input_path.to_path_buf(),
        reason,
    }
}
