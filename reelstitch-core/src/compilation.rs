// ============================================================================
// reelstitch-core/src/compilation.rs
// ============================================================================
//
// COMPILATION: Group to Artifact Pipeline
//
// Turns each group of clips into one numbered compilation:
//
// 1. Acquire a workspace for the group
// 2. Normalize every clip concurrently (fan-out sized to the group, fan-in
//    before continuing; one failure fails the group)
// 3. Stream-copy concatenate the normalized clips in their original order
// 4. Pick one background track and mux it on, cut at the shorter stream
// 5. Move the muxed file into its final numbered path in one rename
// 6. Release the workspace whatever the outcome
//
// Groups are processed sequentially. A failing group stops the run; the
// artifacts of earlier groups are complete and stay where they are.

use crate::audio::{TrackPicker, TrackPool};
use crate::config::CoreConfig;
use crate::discovery::{find_audio_tracks, find_source_clips};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfprobeExecutor, MediaTransformer};
use crate::grouping::{Group, group_clips};
use crate::workspace::{Workspace, sweep_stale_workspaces};

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How an artifact came to be at its path in this run.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactOutcome {
    /// Built in this run with `track` as its background audio.
    Written { track: PathBuf },
    /// Already present and kept because existing files are skipped.
    KeptExisting,
}

/// One compiled file, numbered after the group it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub index: usize,
    pub path: PathBuf,
    pub outcome: ArtifactOutcome,
    pub clip_count: usize,
    pub source_duration_secs: f64,
}

impl Artifact {
    pub fn kept_existing(&self) -> bool {
        self.outcome == ArtifactOutcome::KeptExisting
    }
}

/// Outcome of a compilation run.
#[derive(Debug, Clone)]
pub struct CompileSummary {
    pub artifacts: Vec<Artifact>,
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Inputs validated before any media work starts.
#[derive(Debug, Clone)]
pub struct CompilationPlan {
    pub clips: Vec<PathBuf>,
    pub tracks: TrackPool,
}

/// Checks the run's preconditions without touching the output directory.
///
/// # Errors
///
/// * `CoreError::Config` - invalid configuration
/// * `CoreError::NoFilesFound` - no source clips
/// * `CoreError::NoAudioTracks` - empty background track pool
pub fn prepare_compilation(config: &CoreConfig) -> CoreResult<CompilationPlan> {
    config.validate()?;
    let clips = find_source_clips(&config.input_dir)?;
    let tracks = TrackPool::new(find_audio_tracks(&config.tracks_dir)?, &config.tracks_dir)?;
    log::info!(
        "Found {} clips in {} and {} tracks in {}",
        clips.len(),
        config.input_dir.display(),
        tracks.len(),
        config.tracks_dir.display()
    );
    Ok(CompilationPlan { clips, tracks })
}

/// Probes, groups and compiles a prepared plan.
pub fn execute_compilation<P, T, K>(
    plan: &CompilationPlan,
    prober: &P,
    transformer: &T,
    picker: &K,
    config: &CoreConfig,
) -> CoreResult<CompileSummary>
where
    P: FfprobeExecutor,
    T: MediaTransformer,
    K: TrackPicker,
{
    fs::create_dir_all(&config.output_dir)?;
    let swept = sweep_stale_workspaces(config.workspace_base())?;
    if swept > 0 {
        log::warn!("Removed {swept} workspace(s) left over from an interrupted run");
    }

    let groups = group_clips(prober, &plan.clips, config.target_duration_secs)?;
    compile_groups(transformer, picker, &groups, &plan.tracks, config)
}

/// Full compilation run: preconditions, probing, grouping, compiling.
pub fn run_compilation<P, T, K>(
    prober: &P,
    transformer: &T,
    picker: &K,
    config: &CoreConfig,
) -> CoreResult<CompileSummary>
where
    P: FfprobeExecutor,
    T: MediaTransformer,
    K: TrackPicker,
{
    let plan = prepare_compilation(config)?;
    execute_compilation(&plan, prober, transformer, picker, config)
}

/// Compiles `groups` one after another, stopping at the first failure.
pub fn compile_groups<T: MediaTransformer, K: TrackPicker>(
    transformer: &T,
    picker: &K,
    groups: &[Group],
    tracks: &TrackPool,
    config: &CoreConfig,
) -> CoreResult<CompileSummary> {
    let start = Instant::now();
    let mut artifacts = Vec::with_capacity(groups.len());
    let mut skipped = 0;

    for group in groups {
        log::info!(
            "Compiling {}/{}: {} clips, {:.1}s of source",
            group.index,
            groups.len(),
            group.clips.len(),
            group.total_duration()
        );
        let artifact = compile_group(transformer, picker, group, tracks, config)?;
        if artifact.kept_existing() {
            skipped += 1;
        } else {
            log::info!("Compilation {} written: {}", group.index, artifact.path.display());
        }
        artifacts.push(artifact);
    }

    log::info!("All {} compilations are ready", artifacts.len());
    Ok(CompileSummary {
        artifacts,
        skipped,
        elapsed: start.elapsed(),
    })
}

/// Compiles one group into its numbered artifact.
///
/// On failure nothing is left at the artifact path and the group's
/// workspace has been removed.
pub fn compile_group<T: MediaTransformer, K: TrackPicker>(
    transformer: &T,
    picker: &K,
    group: &Group,
    tracks: &TrackPool,
    config: &CoreConfig,
) -> CoreResult<Artifact> {
    let final_path = config.artifact_path(group.index);
    if config.skip_existing && final_path.is_file() {
        log::info!("Keeping existing {}", final_path.display());
        return Ok(Artifact {
            index: group.index,
            path: final_path,
            outcome: ArtifactOutcome::KeptExisting,
            clip_count: group.clips.len(),
            source_duration_secs: group.total_duration(),
        });
    }

    let fail = |source: CoreError| CoreError::GroupFailed {
        group: group.index,
        source: Box::new(source),
    };

    let workspace = Workspace::acquire(config.workspace_base(), group.index).map_err(fail)?;
    let built = build_in_workspace(transformer, picker, group, tracks, config, &workspace, &final_path);
    let released = workspace.release();

    match (built, released) {
        (Ok(artifact), Ok(())) => Ok(artifact),
        (Ok(artifact), Err(e)) => {
            log::warn!("Compilation {} is complete but its workspace was not fully removed: {}", group.index, e);
            Ok(artifact)
        }
        (Err(e), released) => {
            if let Err(cleanup) = released {
                log::warn!("Workspace cleanup for group {} also failed: {}", group.index, cleanup);
            }
            log::error!("Compilation {} failed: {}", group.index, e);
            Err(fail(e))
        }
    }
}

fn build_in_workspace<T: MediaTransformer, K: TrackPicker>(
    transformer: &T,
    picker: &K,
    group: &Group,
    tracks: &TrackPool,
    config: &CoreConfig,
    workspace: &Workspace,
    final_path: &Path,
) -> CoreResult<Artifact> {
    let normalized = normalize_all(transformer, group, config, workspace)?;

    let joined = workspace.file("joined.mp4");
    transformer.concat_copy(&normalized, &joined)?;

    let track = picker.pick(tracks);
    log::info!(
        "Group {}: background track {}",
        group.index,
        track.path().display()
    );
    let muxed = workspace.file("muxed.mp4");
    transformer.mux_audio(&joined, track.path(), &muxed, &config.render)?;

    promote(&muxed, final_path)?;
    Ok(Artifact {
        index: group.index,
        path: final_path.to_path_buf(),
        outcome: ArtifactOutcome::Written {
            track: track.path().to_path_buf(),
        },
        clip_count: group.clips.len(),
        source_duration_secs: group.total_duration(),
    })
}

/// Normalizes every clip of `group` on a pool with one thread per clip.
/// Output order matches clip order.
fn normalize_all<T: MediaTransformer>(
    transformer: &T,
    group: &Group,
    config: &CoreConfig,
    workspace: &Workspace,
) -> CoreResult<Vec<PathBuf>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(group.clips.len().max(1))
        .thread_name(move |i| format!("normalize-{i}"))
        .build()
        .map_err(|e| CoreError::OperationFailed(format!("could not start normalization threads: {e}")))?;

    pool.install(|| {
        group
            .clips
            .par_iter()
            .enumerate()
            .map(|(i, clip)| {
                let output = workspace.file(&format!("clip_{i}.mp4"));
                transformer.normalize(&clip.path, &output, &config.render)?;
                log::debug!("Normalized {} -> {}", clip.path.display(), output.display());
                Ok(output)
            })
            .collect::<CoreResult<Vec<PathBuf>>>()
    })
}

/// Moves a finished file to `final_path` so that the path only ever holds a
/// complete artifact.
///
/// A plain rename is tried first. When the workspace lives on another file
/// system the file is copied to a hidden partial file beside `final_path`
/// and renamed from there.
fn promote(finished: &Path, final_path: &Path) -> CoreResult<()> {
    if fs::rename(finished, final_path).is_ok() {
        return Ok(());
    }

    let file_name = final_path
        .file_name()
        .ok_or_else(|| CoreError::PathError(format!("no file name in {}", final_path.display())))?
        .to_string_lossy();
    let partial = final_path.with_file_name(format!(".{file_name}.partial"));

    let copied = fs::copy(finished, &partial).and_then(|_| fs::rename(&partial, final_path));
    if let Err(e) = copied {
        let _ = fs::remove_file(&partial);
        return Err(CoreError::Io(e));
    }
    Ok(())
}
