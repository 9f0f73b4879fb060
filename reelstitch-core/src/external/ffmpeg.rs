//! FFmpeg command building for the three transforms of the pipeline.
//!
//! Normalization re-encodes a clip to a silent, fixed-geometry H.264 stream;
//! concatenation stream-copies normalized clips listed in a concat file;
//! muxing copies the joined video and encodes one background track onto it,
//! cut at the shorter of the two.

use crate::config::RenderSpec;
use crate::error::{CoreError, CoreResult};
use crate::external::MediaTransformer;
use crate::external::ffmpeg_builder::FfmpegCommandBuilder;
use crate::external::ffmpeg_executor::{FfmpegSpawner, SidecarSpawner, run_ffmpeg};

use ffmpeg_sidecar::command::FfmpegCommand;

use std::fs;
use std::path::{Path, PathBuf};

/// Builds the command that strips audio, re-encodes and scale-crops one clip.
pub fn build_normalize_command(input: &Path, output: &Path, spec: &RenderSpec) -> FfmpegCommand {
    let crf = spec.crf.to_string();
    let filter = spec.video_filter();
    FfmpegCommandBuilder::new()
        .input(input)
        .args(["-an", "-c:v", spec.video_codec.as_str(), "-preset", spec.preset.as_str()])
        .args(["-crf", crf.as_str(), "-vf", filter.as_str(), "-pix_fmt", "yuv420p"])
        .output(output)
}

/// Builds the stream-copy join over a concat demuxer list file.
pub fn build_concat_command(list_file: &Path, output: &Path) -> FfmpegCommand {
    // Demuxer options must precede the input they apply to.
    FfmpegCommandBuilder::new()
        .args(["-f", "concat", "-safe", "0"])
        .input(list_file)
        .args(["-c", "copy"])
        .output(output)
}

/// Builds the copy-video / encode-audio mux, truncated to the shorter stream.
pub fn build_mux_command(video: &Path, audio: &Path, output: &Path, spec: &RenderSpec) -> FfmpegCommand {
    FfmpegCommandBuilder::new()
        .input(video)
        .input(audio)
        .args(["-map", "0:v:0", "-map", "1:a:0"])
        .args(["-c:v", "copy", "-c:a", spec.audio_codec.as_str(), "-shortest"])
        .output(output)
}

/// Renders the concat demuxer list for `inputs`, one `file '...'` line each,
/// with single quotes escaped the way the demuxer expects.
pub fn concat_list_contents(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|p| format!("file '{}'", p.to_string_lossy().replace('\'', "'\\''")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `MediaTransformer` that drives ffmpeg through an `FfmpegSpawner`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTransformer<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegTransformer<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }
}

impl<S: FfmpegSpawner> MediaTransformer for FfmpegTransformer<S> {
    fn normalize(&self, input: &Path, output: &Path, spec: &RenderSpec) -> CoreResult<()> {
        let cmd = build_normalize_command(input, output, spec);
        run_ffmpeg(&self.spawner, cmd, "ffmpeg (normalize)").map_err(|e| CoreError::Transform {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn concat_copy(&self, inputs: &[PathBuf], output: &Path) -> CoreResult<()> {
        if inputs.is_empty() {
            return Err(CoreError::OperationFailed(
                "cannot concatenate an empty clip list".to_string(),
            ));
        }
        let list_file = output.with_extension("txt");
        fs::write(&list_file, concat_list_contents(inputs))?;
        log::debug!("Wrote concat list {} ({} entries)", list_file.display(), inputs.len());

        let cmd = build_concat_command(&list_file, output);
        let result = run_ffmpeg(&self.spawner, cmd, "ffmpeg (concat)");
        if let Err(e) = fs::remove_file(&list_file) {
            log::warn!("Could not remove concat list {}: {}", list_file.display(), e);
        }
        result.map_err(|e| CoreError::Transform {
            path: output.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn mux_audio(&self, video: &Path, audio: &Path, output: &Path, spec: &RenderSpec) -> CoreResult<()> {
        let cmd = build_mux_command(video, audio, output, spec);
        run_ffmpeg(&self.spawner, cmd, "ffmpeg (mux)").map_err(|e| CoreError::Transform {
            path: video.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::external::ffmpeg_executor::FfmpegProcess;
    use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::Mutex;

    fn args_of(cmd: &mut FfmpegCommand) -> Vec<String> {
        cmd.as_inner_mut()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    struct ScriptedProcess {
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    }

    impl FfmpegProcess for ScriptedProcess {
        fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
        where
            F: FnMut(FfmpegEvent) -> CoreResult<()>,
        {
            for event in self.events.drain(..) {
                handler(event)?;
            }
            Ok(())
        }

        fn wait(&mut self) -> CoreResult<ExitStatus> {
            Ok(ExitStatus::from_raw(self.exit_code << 8))
        }
    }

    /// Records every command; fails those whose args contain `fail_on`.
    #[derive(Default)]
    struct RecordingSpawner {
        calls: Mutex<Vec<Vec<String>>>,
        fail_on: Option<String>,
    }

    impl FfmpegSpawner for RecordingSpawner {
        type Process = ScriptedProcess;

        fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
            let args = args_of(&mut cmd);
            let fail = self
                .fail_on
                .as_ref()
                .is_some_and(|pat| args.iter().any(|a| a.contains(pat.as_str())));
            self.calls.lock().unwrap().push(args);
            Ok(if fail {
                ScriptedProcess {
                    events: vec![FfmpegEvent::Log(LogLevel::Error, "Invalid data found".to_string())],
                    exit_code: 1,
                }
            } else {
                ScriptedProcess { events: vec![], exit_code: 0 }
            })
        }
    }

    #[test]
    fn test_normalize_command_strips_audio_and_crops() {
        let mut cmd = build_normalize_command(Path::new("in.mp4"), Path::new("out.mp4"), &RenderSpec::default());
        let args = args_of(&mut cmd);
        assert!(args.contains(&"-an".to_string()));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-preset", "fast"]));
        assert!(args.windows(2).any(|w| w == ["-crf", "23"]));
        assert!(args.windows(2).any(|w| w[0] == "-vf" && w[1].contains("crop=1080:1920")));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_concat_command_places_demuxer_before_input() {
        let mut cmd = build_concat_command(Path::new("list.txt"), Path::new("joined.mp4"));
        let args = args_of(&mut cmd);
        let f_pos = args.iter().position(|a| a == "concat").unwrap();
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(f_pos < i_pos);
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    }

    #[test]
    fn test_mux_command_copies_video_and_cuts_shortest() {
        let mut cmd = build_mux_command(
            Path::new("joined.mp4"),
            Path::new("track.mp3"),
            Path::new("final.mp4"),
            &RenderSpec::default(),
        );
        let args = args_of(&mut cmd);
        assert!(args.windows(2).any(|w| w == ["-c:v", "copy"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let list = concat_list_contents(&[PathBuf::from("/ws/a.mp4"), PathBuf::from("/ws/it's.mp4")]);
        assert_eq!(list, "file '/ws/a.mp4'\nfile '/ws/it'\\''s.mp4'");
    }

    #[test]
    fn test_concat_copy_removes_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let transformer = FfmpegTransformer::new(RecordingSpawner::default());
        let output = dir.path().join("joined.mp4");

        transformer
            .concat_copy(&[dir.path().join("clip_0.mp4")], &output)
            .unwrap();

        assert!(!output.with_extension("txt").exists());
        assert_eq!(transformer.spawner().calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_normalize_names_the_clip() {
        let transformer = FfmpegTransformer::new(RecordingSpawner {
            fail_on: Some("broken.mp4".to_string()),
            ..Default::default()
        });
        let err = transformer
            .normalize(Path::new("broken.mp4"), Path::new("out.mp4"), &RenderSpec::default())
            .unwrap_err();
        match err {
            CoreError::Transform { path, reason } => {
                assert_eq!(path, Path::new("broken.mp4"));
                assert!(reason.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
