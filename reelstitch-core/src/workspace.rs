//! Per-group scratch directories.
//!
//! A `Workspace` owns every intermediate file produced while compiling one
//! group. It is backed by `tempfile::TempDir`, so the directory and its
//! contents are removed when the workspace is released or dropped, on
//! success and on every error path. Workspaces orphaned by a killed process
//! are recognized by their name prefix and swept on the next run.

use crate::error::CoreResult;

use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Name prefix shared by every workspace directory.
pub const WORKSPACE_PREFIX: &str = ".reelstitch-ws-";

/// Scratch directory exclusively owned by one group's compilation.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    group: usize,
}

impl Workspace {
    /// Creates a fresh, uniquely named workspace for `group` under `base`.
    pub fn acquire(base: &Path, group: usize) -> CoreResult<Self> {
        std::fs::create_dir_all(base)?;
        let dir = TempFileBuilder::new()
            .prefix(&format!("{WORKSPACE_PREFIX}{group}-"))
            .tempdir_in(base)?;
        log::debug!("Acquired workspace {} for group {}", dir.path().display(), group);
        Ok(Self { dir, group })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of an intermediate file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Removes the workspace now, reporting removal errors instead of
    /// ignoring them as `Drop` would.
    pub fn release(self) -> CoreResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        log::debug!("Released workspace {} of group {}", path.display(), self.group);
        Ok(())
    }
}

/// Removes workspace directories left behind under `base` by earlier runs.
///
/// Returns the number of directories removed. Failures to remove a single
/// directory are logged and skipped.
pub fn sweep_stale_workspaces(base: &Path) -> CoreResult<usize> {
    if !base.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(base)? {
        let path = entry?.path();
        let is_workspace = path.is_dir()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(WORKSPACE_PREFIX));
        if !is_workspace {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                log::info!("Removed stale workspace {}", path.display());
                removed += 1;
            }
            Err(e) => log::warn!("Could not remove stale workspace {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}
