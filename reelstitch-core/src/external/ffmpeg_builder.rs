//! Shared scaffolding for the ffmpeg invocations reelstitch makes.
//!
//! Every command runs without the banner and overwrites its output, since
//! outputs always land inside a workspace the pipeline owns.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::Path;

/// Accumulates inputs and options, then finishes with the output path.
pub struct FfmpegCommandBuilder {
    cmd: FfmpegCommand,
}

impl Default for FfmpegCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCommandBuilder {
    #[must_use]
    pub fn new() -> Self {
        let mut cmd = FfmpegCommand::new();
        cmd.arg("-hide_banner").arg("-y");
        Self { cmd }
    }

    /// Adds `path` as the next input.
    #[must_use]
    pub fn input(mut self, path: &Path) -> Self {
        self.cmd.input(&*path.to_string_lossy());
        self
    }

    /// Adds options verbatim at the current position.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cmd.args(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Writes to `path` and hands back the finished command.
    #[must_use]
    pub fn output(mut self, path: &Path) -> FfmpegCommand {
        self.cmd.output(&*path.to_string_lossy());
        self.cmd
    }
}
