use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::{StreamConfig, VideoEncoder, VideoStream};
use crate::foundation::atomic::PendingFile;
use crate::foundation::core::Fps;
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::media::{StderrDrain, is_ffmpeg_on_path};
use crate::render::frame::Frame;

/// Options for [`FfmpegEncoder`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// Replace `out_path` if it already exists.
    pub overwrite: bool,
}

impl Default for FfmpegEncoderOpts {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Encoder that spawns the system `ffmpeg` and streams raw `rgb24` frames to its stdin.
///
/// Output goes to a hidden temp sibling of the final path and is renamed into place by a
/// successful [`VideoEncoder::close`]. Dropping the encoder before that kills `ffmpeg` and deletes
/// the temp file.
pub struct FfmpegEncoder {
    stream: VideoStream,
    out_path: PathBuf,
    pending: Option<PendingFile>,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr: Option<StderrDrain>,
    closed: bool,
}

impl FfmpegEncoder {
    /// Validate `config` and start `ffmpeg` writing an H.264 MP4 destined for `out_path`.
    #[tracing::instrument(skip(out_path, opts), fields(out = %out_path.as_ref().display()))]
    pub fn open(
        config: StreamConfig,
        out_path: impl AsRef<Path>,
        opts: FfmpegEncoderOpts,
    ) -> ExplainerResult<Self> {
        let out_path = out_path.as_ref();
        config.validate()?;

        if !opts.overwrite && out_path.exists() {
            return Err(ExplainerError::validation(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ExplainerError::validation(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let pending = PendingFile::reserve(out_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // The temp file already exists, so `-y` is always needed.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &config.canvas.to_string(),
        ]);
        push_input_fps(&mut cmd, config.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-fflags",
            "+bitexact",
            "-flags:v",
            "+bitexact",
            "-movflags",
            "+faststart",
            "-f",
            "mp4",
        ])
        .arg(pending.temp_path());
        tracing::debug!(?cmd, "spawning ffmpeg encoder");

        let mut child = cmd.spawn().map_err(|e| ExplainerError::ExternalTool {
            tool: "ffmpeg".to_string(),
            code: None,
            stderr: format!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"),
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExplainerError::validation("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr = StderrDrain::spawn(&mut child, "ffmpeg")?;

        Ok(Self {
            stream: VideoStream::new(config),
            out_path: out_path.to_path_buf(),
            pending: Some(pending),
            child: Some(child),
            stdin: Some(stdin),
            stderr: Some(stderr),
            closed: false,
        })
    }

    /// Wait for `ffmpeg` after stdin has been closed and turn a failed exit into an error.
    fn reap(&mut self) -> ExplainerResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| {
            ExplainerError::Other(anyhow::Error::new(e).context("failed to wait for ffmpeg"))
        })?;
        let stderr_bytes = match self.stderr.as_mut() {
            Some(drain) => drain.collect()?,
            None => Vec::new(),
        };
        if !status.success() {
            return Err(ExplainerError::external_tool(
                "ffmpeg",
                status.code(),
                &stderr_bytes,
            ));
        }
        Ok(())
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn stream(&self) -> &VideoStream {
        &self.stream
    }

    fn write(&mut self, frame: &Frame) -> ExplainerResult<()> {
        if self.closed {
            return Err(ExplainerError::validation("ffmpeg encoder is already closed"));
        }
        self.stream.check(frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ExplainerError::validation("ffmpeg encoder has no stdin"));
        };
        if let Err(e) = stdin.write_all(frame.data()) {
            // A dead pipe usually means ffmpeg already exited; prefer its diagnostics.
            self.reap()?;
            return Err(ExplainerError::Other(
                anyhow::Error::new(e).context("failed to write frame to ffmpeg stdin"),
            ));
        }
        self.stream.record();
        Ok(())
    }

    fn close(&mut self) -> ExplainerResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.stream.frames_written() == 0 {
            tracing::warn!(out = %self.out_path.display(), "finalizing a video with no frames");
        }

        // Closing stdin lets ffmpeg finish the container, even with zero frames.
        let reaped = self.reap();
        let pending = self.pending.take();
        reaped?;
        if let Some(pending) = pending {
            pending.commit()?;
        }

        tracing::info!(
            out = %self.out_path.display(),
            frames = self.stream.frames_written(),
            secs = self.stream.duration_secs(),
            "video encoded"
        );
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(mut drain) = self.stderr.take() {
            let _ = drain.collect();
        }
        if self.pending.take().is_some() {
            tracing::debug!(out = %self.out_path.display(), "discarded unfinished encode");
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
