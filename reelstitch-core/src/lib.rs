//! Core library for turning short clips into compilations and scheduling
//! their publication.
//!
//! The library groups clips by duration, compiles each group with ffmpeg
//! (normalize, stream-copy concat, background track mux) and schedules the
//! resulting files for future publication, resuming from a progress ledger.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reelstitch_core::config::{CoreConfigBuilder, ScheduleConfig};
//! use reelstitch_core::external::{CrateFfprobeExecutor, FfmpegTransformer, SidecarSpawner};
//! use reelstitch_core::upload::YouTubeUploader;
//! use reelstitch_core::{RandomTrackPicker, run_compilation, run_schedule};
//! use chrono::Local;
//! use std::path::{Path, PathBuf};
//!
//! let config = CoreConfigBuilder::new()
//!     .input_dir(PathBuf::from("input"))
//!     .tracks_dir(PathBuf::from("tracks"))
//!     .output_dir(PathBuf::from("output"))
//!     .build()
//!     .unwrap();
//!
//! let summary = run_compilation(
//!     &CrateFfprobeExecutor::new(),
//!     &FfmpegTransformer::new(SidecarSpawner),
//!     &RandomTrackPicker,
//!     &config,
//! )
//! .unwrap();
//! println!("{} compilations written", summary.artifacts.len());
//!
//! let schedule = ScheduleConfig::new(PathBuf::from("output"), PathBuf::from("upload_progress.json"));
//! let uploader =
//!     YouTubeUploader::from_files(Path::new("credentials.json"), Path::new("token.json")).unwrap();
//! let report = run_schedule(&uploader, &schedule, Local::now().fixed_offset()).unwrap();
//! println!("{} uploads scheduled", report.uploaded.len());
//! ```

pub mod audio;
pub mod compilation;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod grouping;
pub mod ledger;
pub mod notifications;
pub mod schedule;
pub mod scheduler;
pub mod upload;
pub mod workspace;

// Re-exports for public API
pub use audio::{RandomTrackPicker, TrackPicker, TrackPool};
pub use compilation::{
    Artifact, ArtifactOutcome, CompilationPlan, CompileSummary, compile_group, compile_groups, execute_compilation,
    prepare_compilation, run_compilation,
};
pub use config::{CoreConfig, ScheduleConfig};
pub use discovery::{ArtifactFile, find_artifacts, find_audio_tracks, find_source_clips};
pub use error::{CoreError, CoreResult};
pub use grouping::{Clip, Group, group_clips, partition_by_duration};
pub use ledger::{Ledger, LedgerStore};
pub use notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
pub use scheduler::{ScheduleReport, run_schedule, schedule_artifacts};
pub use upload::{UploadRequest, Uploader};
