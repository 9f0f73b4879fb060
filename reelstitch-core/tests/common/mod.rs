// reelstitch-core/tests/common/mod.rs
//
// In-memory stand-ins for ffmpeg, ffprobe and the upload API.

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use reelstitch_core::config::RenderSpec;
use reelstitch_core::error::{CoreError, CoreResult};
use reelstitch_core::external::{FfprobeExecutor, MediaTransformer};
use reelstitch_core::upload::{UploadRequest, Uploader};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

/// Writes marker contents instead of media so tests can trace what went
/// into each output.
#[derive(Default)]
pub struct FakeTransformer {
    fail_on: Option<String>,
    pub normalized: Mutex<Vec<String>>,
    pub concat_calls: Mutex<usize>,
    pub mux_calls: Mutex<usize>,
    /// Directories any intermediate file was written to.
    pub scratch_dirs: Mutex<Vec<PathBuf>>,
}

impl FakeTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails normalization of the clip with this file name.
    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    fn note_dir(&self, output: &Path) {
        let dir = output.parent().unwrap().to_path_buf();
        let mut dirs = self.scratch_dirs.lock().unwrap();
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }

    pub fn calls_made(&self) -> usize {
        self.normalized.lock().unwrap().len()
            + *self.concat_calls.lock().unwrap()
            + *self.mux_calls.lock().unwrap()
    }
}

impl MediaTransformer for FakeTransformer {
    fn normalize(&self, input: &Path, output: &Path, _spec: &RenderSpec) -> CoreResult<()> {
        self.note_dir(output);
        let name = file_name(input);
        if self.fail_on.as_deref() == Some(name.as_str()) {
            // Leave a partial output behind, as a crashed encoder would.
            fs::write(output, b"partial")?;
            return Err(CoreError::Transform {
                path: input.to_path_buf(),
                reason: "simulated encoder failure".to_string(),
            });
        }
        fs::write(output, format!("norm:{name}"))?;
        self.normalized.lock().unwrap().push(name);
        Ok(())
    }

    fn concat_copy(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<()> {
        self.note_dir(output);
        let parts = inputs
            .iter()
            .map(fs::read_to_string)
            .collect::<Result<Vec<_>, _>>()?;
        fs::write(output, parts.join("+"))?;
        *self.concat_calls.lock().unwrap() += 1;
        Ok(())
    }

    fn mux_audio(&self, video: &Path, audio: &Path, output: &Path, _spec: &RenderSpec) -> CoreResult<()> {
        self.note_dir(output);
        let video = fs::read_to_string(video)?;
        fs::write(output, format!("{video}|{}", file_name(audio)))?;
        *self.mux_calls.lock().unwrap() += 1;
        Ok(())
    }
}

/// Durations keyed by file name; unknown files fail to probe.
pub struct FakeProber {
    durations: HashMap<String, f64>,
}

impl FakeProber {
    pub fn new(durations: &[(&str, f64)]) -> Self {
        Self {
            durations: durations.iter().map(|(n, d)| (n.to_string(), *d)).collect(),
        }
    }
}

impl FfprobeExecutor for FakeProber {
    fn probe_duration(&self, path: &Path) -> CoreResult<f64> {
        self.durations
            .get(&file_name(path))
            .copied()
            .ok_or_else(|| CoreError::Probe {
                path: path.to_path_buf(),
                reason: "unreadable media".to_string(),
            })
    }
}

/// Records every upload; fails the upload of one named artifact.
#[derive(Default)]
pub struct FakeUploader {
    fail_on: Option<String>,
    pub uploads: Mutex<Vec<(String, DateTime<FixedOffset>)>>,
    pub attempts: Mutex<Vec<String>>,
}

impl FakeUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn slots(&self) -> Vec<DateTime<FixedOffset>> {
        self.uploads.lock().unwrap().iter().map(|(_, s)| *s).collect()
    }
}

impl Uploader for FakeUploader {
    fn schedule_upload(&self, file: &Path, request: &UploadRequest) -> CoreResult<String> {
        let name = file_name(file);
        self.attempts.lock().unwrap().push(name.clone());
        if self.fail_on.as_deref() == Some(name.as_str()) {
            return Err(CoreError::Upload("quota exceeded".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((name, request.publish_at));
        Ok(format!("vid-{}", uploads.len()))
    }
}

/// Creates `dir/name` with placeholder contents.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"placeholder").unwrap();
    path
}

/// Names of workspace directories currently under `dir`.
pub fn workspace_dirs(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(reelstitch_core::workspace::WORKSPACE_PREFIX))
        .collect()
}
