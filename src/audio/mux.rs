use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::atomic::PendingFile;
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::media::{probe_media, run_tool};

/// How the final duration is chosen when audio and video lengths differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuxPolicy {
    /// Output lasts exactly as long as the video: longer audio is cut, shorter audio is padded
    /// with silence.
    #[default]
    VideoPaced,
    /// No trimming; the container lasts as long as the longer stream.
    Longest,
}

/// Outcome of a mux.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MuxReport {
    pub output: PathBuf,
    pub video_secs: f64,
    pub audio_secs: f64,
    pub output_secs: f64,
    pub policy: MuxPolicy,
}

/// Combines a finished video with an external audio track.
pub trait AudioMuxer {
    /// Write `output` with the video stream of `video` and the audio stream of `audio`.
    ///
    /// Inputs are never modified and `output` must differ from both.
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> ExplainerResult<MuxReport>;
}

/// Muxer backed by the system `ffmpeg`: video is stream-copied, audio re-encoded to AAC.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegMuxer {
    policy: MuxPolicy,
}

impl FfmpegMuxer {
    pub fn new(policy: MuxPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MuxPolicy {
        self.policy
    }

    fn args(&self, video: &Path, audio: &Path, out: &Path, video_secs: f64) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-v", "error", "-nostdin", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(video.into());
        args.push("-i".into());
        args.push(audio.into());
        args.extend(
            [
                "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", "aac",
            ]
            .map(OsString::from),
        );
        if self.policy == MuxPolicy::VideoPaced {
            args.extend(["-af", "apad", "-t"].map(OsString::from));
            args.push(format!("{video_secs:.6}").into());
        }
        args.extend(
            [
                "-fflags",
                "+bitexact",
                "-flags:a",
                "+bitexact",
                "-map_metadata",
                "-1",
                "-movflags",
                "+faststart",
                "-f",
                "mp4",
            ]
            .map(OsString::from),
        );
        args.push(out.into());
        args
    }
}

impl AudioMuxer for FfmpegMuxer {
    #[tracing::instrument(skip(self), fields(policy = ?self.policy))]
    fn mux(&self, video: &Path, audio: &Path, output: &Path) -> ExplainerResult<MuxReport> {
        for input in [video, audio] {
            if same_file(input, output) {
                return Err(ExplainerError::validation(format!(
                    "mux output '{}' would overwrite input '{}'",
                    output.display(),
                    input.display()
                )));
            }
        }

        let video_info = probe_media(video)?;
        let video_secs = video_info
            .require_video()?
            .duration_secs
            .unwrap_or(video_info.duration_secs);
        let audio_info = probe_media(audio)?;
        let audio_secs = audio_info
            .require_audio()?
            .duration_secs
            .unwrap_or(audio_info.duration_secs);
        if video_secs <= 0.0 {
            return Err(ExplainerError::container(video, "video has zero duration"));
        }
        if (video_secs - audio_secs).abs() > 1e-3 {
            tracing::info!(
                video_secs,
                audio_secs,
                "audio and video durations differ; applying mux policy"
            );
        }

        let pending = PendingFile::reserve(output)?;
        let mut cmd = Command::new("ffmpeg");
        cmd.args(self.args(video, audio, pending.temp_path(), video_secs));
        run_tool(cmd, "ffmpeg")?;

        let output_secs = probe_media(pending.temp_path())?.duration_secs;
        let output = pending.commit()?;
        tracing::info!(out = %output.display(), output_secs, "muxed audio onto video");

        Ok(MuxReport {
            output,
            video_secs,
            audio_secs,
            output_secs,
            policy: self.policy,
        })
    }
}

pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mux.rs"]
mod tests;
