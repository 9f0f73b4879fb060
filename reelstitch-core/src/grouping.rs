// ============================================================================
// reelstitch-core/src/grouping.rs
// ============================================================================
//
// GROUPING: Duration Based Clip Partitioning
//
// Splits an ordered list of clips into contiguous groups whose summed
// duration stays at or under a target. The scan is greedy and the boundary
// rule is "exceeds before adding": a clip that would push a non-empty group
// over the target closes that group and starts the next one. A clip longer
// than the target on its own still gets a group, alone.

use crate::error::CoreResult;
use crate::external::FfprobeExecutor;

use std::path::PathBuf;

/// One source clip and its probed duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub path: PathBuf,
    pub duration_secs: f64,
}

impl Clip {
    pub fn new(path: impl Into<PathBuf>, duration_secs: f64) -> Self {
        Self {
            path: path.into(),
            duration_secs,
        }
    }
}

/// A contiguous run of clips compiled into one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// 1-based position of the group; also the artifact number.
    pub index: usize,
    pub clips: Vec<Clip>,
}

impl Group {
    pub fn total_duration(&self) -> f64 {
        self.clips.iter().map(|c| c.duration_secs).sum()
    }
}

/// Partitions `clips` greedily into groups of at most `target_secs`.
///
/// Concatenating the returned groups reproduces `clips` exactly. Every group
/// sums to at most `target_secs` unless it holds a single clip.
///
/// # Examples
///
/// ```rust
/// use reelstitch_core::grouping::{Clip, partition_by_duration};
///
/// let clips = vec![Clip::new("a", 20.0), Clip::new("b", 30.0), Clip::new("c", 30.0)];
/// let groups = partition_by_duration(&clips, 65.0);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].clips.len(), 2);
/// ```
pub fn partition_by_duration(clips: &[Clip], target_secs: f64) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut current: Vec<Clip> = Vec::new();
    let mut running = 0.0;

    for clip in clips {
        if running + clip.duration_secs > target_secs && !current.is_empty() {
            groups.push(Group {
                index: groups.len() + 1,
                clips: std::mem::take(&mut current),
            });
            running = 0.0;
        }
        current.push(clip.clone());
        running += clip.duration_secs;
    }

    if !current.is_empty() {
        groups.push(Group {
            index: groups.len() + 1,
            clips: current,
        });
    }
    groups
}

/// Probes every clip once, in order, and partitions the result.
///
/// The first probe failure aborts grouping: group boundaries depend on
/// every duration, so a partial list is never grouped.
pub fn group_clips<P: FfprobeExecutor>(
    prober: &P,
    paths: &[PathBuf],
    target_secs: f64,
) -> CoreResult<Vec<Group>> {
    let mut clips = Vec::with_capacity(paths.len());
    for path in paths {
        let duration_secs = prober.probe_duration(path)?;
        log::debug!("{}: {:.2}s", path.display(), duration_secs);
        clips.push(Clip::new(path.clone(), duration_secs));
    }

    let groups = partition_by_duration(&clips, target_secs);
    log::info!(
        "Grouped {} clips into {} compilations (target {:.0}s)",
        clips.len(),
        groups.len(),
        target_secs
    );
    Ok(groups)
}
