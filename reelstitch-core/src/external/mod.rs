// ============================================================================
// reelstitch-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates the media transform gateway: everything the
// pipeline asks of ffmpeg/ffprobe goes through the traits defined here, so
// consumers can substitute their own implementations in tests.
//
// KEY COMPONENTS:
// - MediaTransformer: normalize / concat / mux capability used by compilation
// - FfprobeExecutor: duration probing used by the grouper
// - FfmpegSpawner/FfmpegProcess: process-level seam under FfmpegTransformer
// - check_dependency: verifies ffmpeg/ffprobe are on PATH

// ---- Internal crate imports ----
use crate::config::RenderSpec;
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Command construction for normalize, concat and mux, plus `FfmpegTransformer`
pub mod ffmpeg;

/// Common ffmpeg options builder
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg::FfmpegTransformer;
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};

// ============================================================================
// MEDIA TRANSFORM GATEWAY
// ============================================================================

/// The transforms the compilation pipeline needs from a media engine.
///
/// Every method blocks until the output file is complete or the transform
/// has failed. Implementations are shared across the per-group fan-out, so
/// they must be `Send + Sync`.
pub trait MediaTransformer: Send + Sync {
    /// Strips audio, re-encodes and scale-crops `input` into `output`.
    fn normalize(&self, input: &Path, output: &Path, spec: &RenderSpec) -> CoreResult<()>;

    /// Joins `inputs`, in order, into `output` without re-encoding.
    fn concat_copy(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<()>;

    /// Copies the video of `video`, encodes `audio` onto it and cuts the
    /// result at the shorter of the two.
    fn mux_audio(&self, video: &Path, audio: &Path, output: &Path, spec: &RenderSpec) -> CoreResult<()>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with output discarded.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` - If the command is not found
/// * `CoreError::CommandStart` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
