// ============================================================================
// reelstitch-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core Error Types
//
// This module defines the error type shared by every part of the core
// library, plus small constructors for the errors raised around external
// command execution.
//
// KEY COMPONENTS:
// - CoreError: All failure modes of grouping, compilation and scheduling
// - CoreResult: Result alias used throughout the crate
// - command_*_error helpers: Uniform errors for ffmpeg/ffprobe invocations

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required external command not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, std::io::Error),

    #[error("Command '{command}' failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Could not probe duration of '{}': {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("Transform of '{}' failed: {reason}", path.display())]
    Transform { path: PathBuf, reason: String },

    #[error("Compilation of group {group} failed: {source}")]
    GroupFailed {
        group: usize,
        #[source]
        source: Box<CoreError>,
    },

    #[error("No source clips found")]
    NoFilesFound,

    #[error("No audio tracks found in '{}'", .0.display())]
    NoAudioTracks(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

pub(crate) fn command_start_error(command: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), err)
}

pub(crate) fn command_wait_error(command: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), err)
}

pub(crate) fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}

impl CoreError {
    /// True for errors that abort a run before any media is touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            CoreError::NoFilesFound
                | CoreError::NoAudioTracks(_)
                | CoreError::Config(_)
                | CoreError::Credentials(_)
                | CoreError::DependencyNotFound(_)
        )
    }
}
