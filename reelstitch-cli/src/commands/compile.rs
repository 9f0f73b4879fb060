//! Implementation of the 'compile' subcommand.
//!
//! Builds the core configuration from the command line, checks that clips,
//! tracks and the ffmpeg tools are all present, then hands the run to
//! reelstitch-core and reports each compilation it wrote.

use crate::cli::CompileArgs;
use crate::commands::{notification_sender, notify};
use crate::error::CliResult;
use crate::logging;
use crate::terminal;

use reelstitch_core::config::{CoreConfig, CoreConfigBuilder};
use reelstitch_core::external::{CrateFfprobeExecutor, FfmpegTransformer, SidecarSpawner, check_dependency};
use reelstitch_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender, hostname};
use reelstitch_core::{ArtifactOutcome, CompilationPlan, CompileSummary, RandomTrackPicker, execute_compilation, prepare_compilation};

use log::{debug, info};
use std::path::{Path, PathBuf};

/// Everything a compile run needs once its preconditions have passed.
pub struct PreparedCompile {
    pub config: CoreConfig,
    pub plan: CompilationPlan,
    pub sender: Option<NtfyNotificationSender>,
}

/// Creates and configures CoreConfig from CLI arguments.
pub fn create_core_config(args: &CompileArgs) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .input_dir(args.input_dir.clone())
        .tracks_dir(args.tracks_dir.clone())
        .output_dir(args.output_dir.clone())
        .target_duration_secs(args.target_duration)
        .artifact_prefix(&args.prefix)
        .skip_existing(args.skip_existing);

    if let Some(temp_dir) = &args.temp_dir {
        builder = builder.temp_dir(temp_dir.clone());
    }
    if let Some(crf) = args.crf {
        builder = builder.crf(crf);
    }
    if let Some(preset) = &args.preset {
        builder = builder.encoder_preset(preset);
    }
    if let Some(topic) = &args.ntfy {
        builder = builder.ntfy_topic(topic);
    }

    builder.build()
}

/// Checks every precondition of a compile run, in order: configuration,
/// notification topic, source clips, background tracks, ffmpeg and ffprobe.
///
/// Nothing is written to disk by this step.
pub fn prepare(args: &CompileArgs) -> CliResult<PreparedCompile> {
    let config = create_core_config(args)?;
    let sender = notification_sender(config.ntfy_topic.as_deref())?;
    let plan = prepare_compilation(&config)?;
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    Ok(PreparedCompile { config, plan, sender })
}

/// Runs a prepared compilation and reports the outcome, including by
/// notification when a topic is configured.
pub fn execute(prepared: &PreparedCompile) -> CliResult<CompileSummary> {
    let PreparedCompile { config, plan, sender } = prepared;
    let sender = sender.as_ref().map(|s| s as &dyn NotificationSender);

    terminal::print_section("Compile");
    terminal::print_status("Clips", &plan.clips.len().to_string(), false);
    terminal::print_status("Tracks", &plan.tracks.len().to_string(), false);
    terminal::print_status("Target length", &format!("{}s", config.target_duration_secs), false);
    terminal::print_status("Output", &config.output_dir.display().to_string(), false);
    debug!("Render settings: {:?}", config.render);

    let result = execute_compilation(
        plan,
        &CrateFfprobeExecutor::new(),
        &FfmpegTransformer::new(SidecarSpawner),
        &RandomTrackPicker,
        config,
    );

    match result {
        Ok(summary) => {
            display_summary(&summary);
            notify(
                sender,
                &NotificationType::CompileComplete {
                    artifacts: summary.artifacts.len(),
                    skipped: summary.skipped,
                    elapsed: summary.elapsed,
                    hostname: hostname(),
                },
            );
            Ok(summary)
        }
        Err(e) => {
            notify(
                sender,
                &NotificationType::CompileError {
                    message: e.to_string(),
                    hostname: hostname(),
                },
            );
            Err(e)
        }
    }
}

fn display_summary(summary: &CompileSummary) {
    terminal::print_section("Compilation complete");
    for artifact in &summary.artifacts {
        let name = artifact
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| artifact.path.display().to_string());
        let detail = match &artifact.outcome {
            ArtifactOutcome::Written { track } => format!(
                "{} clips, {:.1}s, track {}",
                artifact.clip_count,
                artifact.source_duration_secs,
                track.file_name().map_or_else(|| track.display().to_string(), |n| n.to_string_lossy().into_owned())
            ),
            ArtifactOutcome::KeptExisting => "kept existing file".to_string(),
        };
        terminal::print_status(&name, &detail, false);
    }

    let written = summary.artifacts.len() - summary.skipped;
    terminal::print_success(&format!("Wrote {written} compilation(s)"));
    if summary.skipped > 0 {
        terminal::print_notice(&format!("{} compilation(s) already existed and were kept", summary.skipped));
    }
    terminal::print_status("Total time", &terminal::format_duration(summary.elapsed), true);
}

/// Default location of run logs for an output directory.
pub fn default_log_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("logs")
}

/// The `compile` command.
pub fn run_compile(args: CompileArgs, log_dir: Option<PathBuf>) -> CliResult<CompileSummary> {
    let prepared = prepare(&args)?;

    let log_dir = log_dir.unwrap_or_else(|| default_log_dir(&args.output_dir));
    let log_path = logging::attach_log_file(&log_dir, "compile")?;
    info!("Log file: {}", log_path.display());

    execute(&prepared)
}
