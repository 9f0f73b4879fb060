// ============================================================================
// reelstitch-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// This module implements the builder pattern for the CoreConfig structure,
// providing a fluent API for creating and configuring CoreConfig instances.
// Required directories are checked and the result validated in `build`.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{CoreConfig, RenderSpec};
use crate::error::{CoreError, CoreResult};

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use reelstitch_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .input_dir(PathBuf::from("/path/to/clips"))
///     .tracks_dir(PathBuf::from("/path/to/tracks"))
///     .output_dir(PathBuf::from("/path/to/output"))
///     .target_duration_secs(60.0)
///     .crf(20)
///     .artifact_prefix("weekly")
///     .build()
///     .unwrap();
/// assert_eq!(config.render.crf, 20);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfigBuilder {
    // Required fields
    input_dir: Option<PathBuf>,
    tracks_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,

    // Optional directory fields
    temp_dir: Option<PathBuf>,

    // Optional fields with defaults
    target_duration_secs: f64,
    render: RenderSpec,
    artifact_prefix: String,
    skip_existing: bool,
    ntfy_topic: Option<String>,
}

impl Default for CoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self {
            input_dir: None,
            tracks_dir: None,
            output_dir: None,
            temp_dir: None,
            target_duration_secs: super::DEFAULT_TARGET_DURATION_SECS,
            render: RenderSpec::default(),
            artifact_prefix: super::DEFAULT_ARTIFACT_PREFIX.to_string(),
            skip_existing: false,
            ntfy_topic: None,
        }
    }

    /// Sets the directory containing the source clips.
    pub fn input_dir(mut self, input_dir: PathBuf) -> Self {
        self.input_dir = Some(input_dir);
        self
    }

    /// Sets the directory containing the candidate background tracks.
    pub fn tracks_dir(mut self, tracks_dir: PathBuf) -> Self {
        self.tracks_dir = Some(tracks_dir);
        self
    }

    /// Sets the output directory for compiled artifacts.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Sets the base directory for per-group workspaces.
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// Sets the target summed duration per group, in seconds.
    pub fn target_duration_secs(mut self, secs: f64) -> Self {
        self.target_duration_secs = secs;
        self
    }

    /// Sets the output frame size.
    pub fn frame_size(mut self, width: u32, height: u32) -> Self {
        self.render.width = width;
        self.render.height = height;
        self
    }

    /// Sets the x264 preset used for normalization.
    pub fn encoder_preset(mut self, preset: &str) -> Self {
        self.render.preset = preset.to_string();
        self
    }

    /// Sets the CRF used for normalization.
    pub fn crf(mut self, crf: u8) -> Self {
        self.render.crf = crf;
        self
    }

    /// Sets the artifact file name prefix.
    pub fn artifact_prefix(mut self, prefix: &str) -> Self {
        self.artifact_prefix = prefix.to_string();
        self
    }

    /// Keep artifacts that already exist instead of rebuilding them.
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Sets the ntfy.sh topic URL for sending notifications.
    pub fn ntfy_topic(mut self, topic: &str) -> Self {
        self.ntfy_topic = Some(topic.to_string());
        self
    }

    /// Builds and validates a CoreConfig instance.
    ///
    /// # Errors
    ///
    /// * `CoreError::Config` if a required directory is missing or a value
    ///   fails validation
    pub fn build(self) -> CoreResult<CoreConfig> {
        let input_dir = self
            .input_dir
            .ok_or_else(|| CoreError::Config("input_dir is required".to_string()))?;
        let tracks_dir = self
            .tracks_dir
            .ok_or_else(|| CoreError::Config("tracks_dir is required".to_string()))?;
        let output_dir = self
            .output_dir
            .ok_or_else(|| CoreError::Config("output_dir is required".to_string()))?;

        let config = CoreConfig {
            input_dir,
            tracks_dir,
            output_dir,
            temp_dir: self.temp_dir,
            target_duration_secs: self.target_duration_secs,
            render: self.render,
            artifact_prefix: self.artifact_prefix,
            skip_existing: self.skip_existing,
            ntfy_topic: self.ntfy_topic,
        };
        config.validate()?;
        Ok(config)
    }
}
