//! File discovery for source clips, background tracks and compiled artifacts.
//!
//! All searches cover the top level of a directory only. Results are sorted
//! so that runs over an unchanged directory see the same order every time;
//! artifacts are ordered by their numeric suffix rather than lexically.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Extensions recognized as source clips.
pub const CLIP_EXTENSIONS: [&str; 1] = ["mp4"];

/// Extensions recognized as background tracks.
pub const TRACK_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn list_files_with(dir: &Path, extensions: &[&str]) -> CoreResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && has_extension(&path, extensions)).then_some(path)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Finds the source clips in `input_dir`, sorted by file name.
///
/// # Errors
///
/// * `CoreError::Io` - If the directory cannot be read
/// * `CoreError::NoFilesFound` - If it holds no `.mp4` files
///
/// # Examples
///
/// ```rust,no_run
/// use reelstitch_core::find_source_clips;
/// use std::path::Path;
///
/// let clips = find_source_clips(Path::new("input")).unwrap();
/// println!("Found {} clips", clips.len());
/// ```
pub fn find_source_clips(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let files = list_files_with(input_dir, &CLIP_EXTENSIONS)?;
    if files.is_empty() {
        Err(CoreError::NoFilesFound)
    } else {
        Ok(files)
    }
}

/// Finds candidate background tracks in `tracks_dir`, sorted by file name.
///
/// A missing directory is treated as an empty pool; the caller decides
/// whether an empty pool is fatal.
pub fn find_audio_tracks(tracks_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    if !tracks_dir.exists() {
        log::debug!("Tracks directory {} does not exist", tracks_dir.display());
        return Ok(Vec::new());
    }
    list_files_with(tracks_dir, &TRACK_EXTENSIONS)
}

/// Parses `<prefix>-<n>.mp4` into `n`.
pub fn parse_artifact_index(file_name: &str, prefix: &str) -> Option<usize> {
    file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".mp4")
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))?
        .parse()
        .ok()
}

/// A compiled file found on disk, with the group number it was written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub index: usize,
    pub path: PathBuf,
}

impl ArtifactFile {
    /// File name used as the ledger key.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Finds compiled artifacts named `<prefix>-<n>.mp4` in `dir`, ordered by `n`.
///
/// Other files, including in-progress partial files, are ignored.
pub fn find_artifacts(dir: &Path, prefix: &str) -> CoreResult<Vec<ArtifactFile>> {
    let mut artifacts: Vec<ArtifactFile> = std::fs::read_dir(dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            let index = parse_artifact_index(path.file_name()?.to_str()?, prefix)?;
            Some(ArtifactFile { index, path })
        })
        .collect();
    artifacts.sort_by_key(|a| a.index);
    Ok(artifacts)
}
