//! Background track pool and selection.
//!
//! Selection is a capability handed to the pipeline so that production runs
//! pick uniformly at random while tests can script the choice.

use crate::error::{CoreError, CoreResult};

use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A candidate background track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub path: PathBuf,
}

impl AudioTrack {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Non-empty set of tracks a group may be scored with.
#[derive(Debug, Clone)]
pub struct TrackPool {
    tracks: Vec<AudioTrack>,
}

impl TrackPool {
    /// Builds the pool, failing with `NoAudioTracks` when `paths` is empty.
    pub fn new(paths: Vec<PathBuf>, source_dir: &Path) -> CoreResult<Self> {
        if paths.is_empty() {
            return Err(CoreError::NoAudioTracks(source_dir.to_path_buf()));
        }
        Ok(Self {
            tracks: paths.into_iter().map(AudioTrack::new).collect(),
        })
    }

    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Chooses one track from a non-empty pool.
pub trait TrackPicker: Send + Sync {
    fn pick<'a>(&self, pool: &'a TrackPool) -> &'a AudioTrack;
}

/// Uniform random choice with replacement, using the thread-local RNG.
#[derive(Debug, Clone, Default)]
pub struct RandomTrackPicker;

impl TrackPicker for RandomTrackPicker {
    fn pick<'a>(&self, pool: &'a TrackPool) -> &'a AudioTrack {
        let tracks = pool.tracks();
        &tracks[rand::thread_rng().gen_range(0..tracks.len())]
    }
}

/// Cycles through a fixed sequence of pool positions.
///
/// Positions wrap modulo the pool size, so any sequence is valid for any
/// non-empty pool.
#[derive(Debug)]
pub struct SequenceTrackPicker {
    positions: Vec<usize>,
    cursor: Mutex<usize>,
}

impl SequenceTrackPicker {
    pub fn new(positions: Vec<usize>) -> Self {
        Self {
            positions,
            cursor: Mutex::new(0),
        }
    }
}

impl TrackPicker for SequenceTrackPicker {
    fn pick<'a>(&self, pool: &'a TrackPool) -> &'a AudioTrack {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        let position = self
            .positions
            .get(*cursor % self.positions.len().max(1))
            .copied()
            .unwrap_or(0);
        *cursor += 1;
        &pool.tracks()[position % pool.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> TrackPool {
        let paths = (0..n).map(|i| PathBuf::from(format!("track_{i}.mp3"))).collect();
        TrackPool::new(paths, Path::new("tracks")).unwrap()
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        match TrackPool::new(Vec::new(), Path::new("tracks")) {
            Err(CoreError::NoAudioTracks(dir)) => assert_eq!(dir, Path::new("tracks")),
            other => panic!("expected NoAudioTracks, got {other:?}"),
        }
    }

    #[test]
    fn test_random_picker_stays_in_pool() {
        let pool = pool(3);
        let picker = RandomTrackPicker;
        for _ in 0..50 {
            let track = picker.pick(&pool);
            assert!(pool.tracks().contains(track));
        }
    }

    #[test]
    fn test_sequence_picker_wraps() {
        let pool = pool(2);
        let picker = SequenceTrackPicker::new(vec![1, 0, 5]);
        let picked: Vec<&Path> = (0..4).map(|_| picker.pick(&pool).path()).collect();
        assert_eq!(
            picked,
            vec![
                Path::new("track_1.mp3"),
                Path::new("track_0.mp3"),
                Path::new("track_1.mp3"),
                Path::new("track_1.mp3"),
            ]
        );
    }
}
