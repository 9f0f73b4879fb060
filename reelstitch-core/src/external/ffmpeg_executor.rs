//! Process seam beneath `FfmpegTransformer`.
//!
//! The transformer never touches `std::process` directly: it asks an
//! `FfmpegSpawner` for a process, drains that process's events and waits on
//! it. Tests substitute scripted processes; production uses ffmpeg-sidecar.

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

/// A running ffmpeg invocation.
pub trait FfmpegProcess {
    /// Feeds every parsed event to `handler` until the output stream closes
    /// or the handler returns an error.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Blocks until the process exits.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Starts ffmpeg processes. Shared by the parallel normalization workers.
pub trait FfmpegSpawner: Send + Sync {
    type Process: FfmpegProcess;
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// An ffmpeg-sidecar child process.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.0.iter().map_err(|e| {
            command_failed_error("ffmpeg (events)", ExitStatus::default(), e.to_string())
        })?;
        events.into_iter().try_for_each(&mut handler)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Spawns ffmpeg from `PATH` through ffmpeg-sidecar.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

/// Runs `cmd` to completion, collecting error output.
///
/// A non-zero exit status becomes `CoreError::CommandFailed` carrying the
/// error lines ffmpeg printed, labelled with `label`.
pub fn run_ffmpeg<S: FfmpegSpawner>(spawner: &S, cmd: FfmpegCommand, label: &str) -> CoreResult<()> {
    log::debug!("Running {label}: {cmd:?}");

    let mut process = spawner.spawn(cmd)?;
    let mut stderr_lines: Vec<String> = Vec::new();
    process.handle_events(|event| {
        match event {
            FfmpegEvent::Error(line) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                log::debug!("{label}: {line}");
                stderr_lines.push(line);
            }
            FfmpegEvent::Log(LogLevel::Warning, line) => log::trace!("{label}: {line}"),
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("{label} exited with {status}");
        return Err(command_failed_error(label, status, stderr_lines.join("\n")));
    }
    Ok(())
}
