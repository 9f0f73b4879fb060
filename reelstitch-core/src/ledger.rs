//! Upload progress ledger.
//!
//! A single JSON record naming the last artifact that was scheduled and the
//! last slot handed out:
//!
//! ```json
//! {"lastUploaded":"compilation-3.mp4","lastDate":"2026-03-10T21:00:00-03:00"}
//! ```
//!
//! A missing or unreadable ledger reads as an empty one. Writes go through a
//! temporary file in the same directory followed by a rename, so readers
//! only ever see the previous record or the new one.

use crate::error::{CoreError, CoreResult};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Resume state of the upload scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// File name of the last artifact scheduled successfully.
    #[serde(default)]
    pub last_uploaded: Option<String>,

    /// Last publish slot handed out, whether or not its upload succeeded.
    #[serde(default)]
    pub last_date: Option<DateTime<FixedOffset>>,
}

/// File-backed ledger storage.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the ledger, treating absence and corruption as an empty ledger.
    pub fn load(&self) -> Ledger {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No ledger at {}, starting fresh", self.path.display());
                return Ledger::default();
            }
            Err(e) => {
                log::warn!("Could not read ledger {}: {}. Starting fresh", self.path.display(), e);
                return Ledger::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(ledger) => ledger,
            Err(e) => {
                log::warn!("Ignoring corrupt ledger {}: {}", self.path.display(), e);
                Ledger::default()
            }
        }
    }

    /// Replaces the stored ledger atomically.
    pub fn save(&self, ledger: &Ledger) -> CoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, ledger)?;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| {
            CoreError::Ledger(format!("could not write {}: {}", self.path.display(), e.error))
        })?;
        log::debug!("Ledger saved: {:?}", ledger);
        Ok(())
    }
}
