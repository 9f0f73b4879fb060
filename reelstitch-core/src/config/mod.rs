//! Configuration structures and constants for the reelstitch-core library.
//!
//! `CoreConfig` drives the compilation side (grouping, normalization,
//! muxing, artifact naming); `ScheduleConfig` drives the upload side
//! (slot hours, metadata, ledger location).

mod builder;

use crate::error::{CoreError, CoreResult};
use chrono::{FixedOffset, Local, Offset};
use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Default constants

/// Target summed clip duration per compilation, in seconds.
pub const DEFAULT_TARGET_DURATION_SECS: f64 = 65.0;

/// Output frame width after scale-and-crop (vertical short format).
pub const DEFAULT_FRAME_WIDTH: u32 = 1080;

/// Output frame height after scale-and-crop.
pub const DEFAULT_FRAME_HEIGHT: u32 = 1920;

/// Video codec used when normalizing clips.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// x264 preset used when normalizing clips.
pub const DEFAULT_ENCODER_PRESET: &str = "fast";

/// CRF used when normalizing clips. Range 0-51 for libx264.
pub const DEFAULT_CRF: u8 = 23;

/// Audio codec used when muxing the background track.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// File name prefix of compiled artifacts (`<prefix>-<n>.mp4`).
pub const DEFAULT_ARTIFACT_PREFIX: &str = "compilation";

/// Hours of the day cycled through when assigning publish slots.
pub const DEFAULT_SCHEDULE_HOURS: [u32; 3] = [11, 18, 21];

/// Fixed upload title.
pub const DEFAULT_TITLE: &str = "Satisfying Shorts Compilation";

/// Fixed upload description.
pub const DEFAULT_DESCRIPTION: &str =
    "A compilation of short, satisfying clips. Subscribe for more! #shorts #satisfying #compilation";

/// Tags attached to every upload.
pub const DEFAULT_TAGS: [&str; 2] = ["shorts", "automator"];

/// YouTube category "People & Blogs".
pub const DEFAULT_CATEGORY_ID: &str = "22";

/// Ledger file name used when none is configured.
pub const DEFAULT_LEDGER_FILENAME: &str = "upload_progress.json";

/// Fixed parameters for turning a clip into a uniform, silent video stream
/// and for muxing audio onto the joined result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSpec {
    pub width: u32,
    pub height: u32,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
}

impl RenderSpec {
    /// Scale to cover the target frame, then center-crop to exact size.
    pub fn video_filter(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
            w = self.width,
            h = self.height
        )
    }
}

impl Default for RenderSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_ENCODER_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
        }
    }
}

/// Main configuration structure for the compilation side of the library.
///
/// Created by the consumer (e.g. reelstitch-cli), usually through
/// [`CoreConfigBuilder`], and passed to the compilation entry points.
///
/// # Examples
///
/// ```rust,no_run
/// use reelstitch_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/clips"))
///     .tracks_dir(PathBuf::from("/path/to/tracks"))
///     .output_dir(PathBuf::from("/path/to/output"))
///     .target_duration_secs(65.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory containing the source clips
    pub input_dir: PathBuf,

    /// Directory containing candidate background tracks
    pub tracks_dir: PathBuf,

    /// Directory where numbered compilations are written
    pub output_dir: PathBuf,

    /// Optional base directory for per-group workspaces (defaults to `output_dir`)
    pub temp_dir: Option<PathBuf>,

    /// Target summed duration of a group, in seconds
    pub target_duration_secs: f64,

    /// Normalization and muxing parameters
    pub render: RenderSpec,

    /// File name prefix of compiled artifacts
    pub artifact_prefix: String,

    /// Leave artifacts that already exist untouched instead of rebuilding them
    pub skip_existing: bool,

    /// Optional ntfy.sh topic URL for sending notifications
    pub ntfy_topic: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            tracks_dir: PathBuf::from("tracks"),
            output_dir: PathBuf::from("output"),
            temp_dir: None,
            target_duration_secs: DEFAULT_TARGET_DURATION_SECS,
            render: RenderSpec::default(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            skip_existing: false,
            ntfy_topic: None,
        }
    }
}

impl CoreConfig {
    /// Base directory under which group workspaces are created.
    pub fn workspace_base(&self) -> &PathBuf {
        self.temp_dir.as_ref().unwrap_or(&self.output_dir)
    }

    /// Final path of the artifact for the 1-based group `index`.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(artifact_file_name(&self.artifact_prefix, index))
    }

    /// Rejects values that would make ffmpeg or the grouper misbehave.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.target_duration_secs.is_finite() || self.target_duration_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "target duration must be a positive number of seconds, got {}",
                self.target_duration_secs
            )));
        }
        let render = &self.render;
        if render.width == 0 || render.height == 0 || render.width % 2 != 0 || render.height % 2 != 0 {
            return Err(CoreError::Config(format!(
                "frame size must be even and non-zero, got {}x{}",
                render.width, render.height
            )));
        }
        if render.crf > 51 {
            return Err(CoreError::Config(format!(
                "CRF must be within 0-51, got {}",
                render.crf
            )));
        }
        validate_prefix(&self.artifact_prefix)
    }
}

/// Configuration for the upload side: where artifacts live, how slots are
/// assigned, what metadata is attached and where progress is recorded.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Directory holding the compiled artifacts
    pub artifacts_dir: PathBuf,

    /// File name prefix of compiled artifacts
    pub artifact_prefix: String,

    /// Location of the progress ledger
    pub ledger_path: PathBuf,

    /// Hours of the day cycled through by artifact position
    pub hours: Vec<u32>,

    /// Offset in which slot hours and "midnight" are interpreted
    pub utc_offset: FixedOffset,

    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,

    /// Optional ntfy.sh topic URL for sending notifications
    pub ntfy_topic: Option<String>,
}

impl ScheduleConfig {
    /// Creates a schedule configuration with the default hours, metadata
    /// and the machine's current local offset.
    pub fn new(artifacts_dir: PathBuf, ledger_path: PathBuf) -> Self {
        Self {
            artifacts_dir,
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            ledger_path,
            hours: DEFAULT_SCHEDULE_HOURS.to_vec(),
            utc_offset: Local::now().offset().fix(),
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            ntfy_topic: None,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.hours.is_empty() {
            return Err(CoreError::Config(
                "at least one schedule hour is required".to_string(),
            ));
        }
        if let Some(bad) = self.hours.iter().find(|h| **h > 23) {
            return Err(CoreError::Config(format!(
                "schedule hours must be within 0-23, got {bad}"
            )));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::Config("upload title must not be empty".to_string()));
        }
        validate_prefix(&self.artifact_prefix)
    }
}

/// `<prefix>-<index>.mp4`
pub fn artifact_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index}.mp4")
}

fn validate_prefix(prefix: &str) -> CoreResult<()> {
    if prefix.is_empty() || prefix.contains(['/', '\\']) {
        return Err(CoreError::Config(format!(
            "artifact prefix must be a non-empty file name fragment, got '{prefix}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_filter_covers_then_crops() {
        let spec = RenderSpec::default();
        assert_eq!(
            spec.video_filter(),
            "scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920"
        );
    }

    #[test]
    fn test_artifact_path_is_one_based_and_prefixed() {
        let config = CoreConfig {
            output_dir: PathBuf::from("/out"),
            ..Default::default()
        };
        assert_eq!(config.artifact_path(1), PathBuf::from("/out/compilation-1.mp4"));
        assert_eq!(config.workspace_base(), &PathBuf::from("/out"));
    }

    #[test]
    fn test_core_validate_rejects_bad_values() {
        let mut config = CoreConfig::default();
        assert!(config.validate().is_ok());

        config.target_duration_secs = 0.0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.target_duration_secs = 65.0;
        config.render.width = 1081;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.render.width = 1080;
        config.render.crf = 60;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.render.crf = 23;
        config.artifact_prefix = "a/b".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_schedule_validate_hours() {
        let mut config = ScheduleConfig::new(PathBuf::from("out"), PathBuf::from("ledger.json"));
        assert!(config.validate().is_ok());

        config.hours = vec![];
        assert!(config.validate().is_err());

        config.hours = vec![9, 24];
        assert!(config.validate().is_err());
    }
}
