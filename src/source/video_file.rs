use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::media::{StderrDrain, probe_media};
use crate::render::frame::Frame;
use crate::source::{FrameSource, SegmentSpec};

/// Segment decoded from an existing video file, one `rgb24` frame at a time.
///
/// Rate and size come from `ffprobe`; `ffmpeg` is only spawned on the first pull.
pub struct VideoFileSource {
    spec: SegmentSpec,
    path: PathBuf,
    decoder: Option<Decoder>,
    next: u64,
    done: bool,
}

struct Decoder {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr: StderrDrain,
}

impl VideoFileSource {
    /// Probe `path` and prepare a source for its first video stream.
    pub fn open(path: impl Into<PathBuf>) -> ExplainerResult<Self> {
        let path = path.into();
        let info = probe_media(&path)?;
        let video = info.require_video()?;
        let fps = video
            .fps
            .ok_or_else(|| ExplainerError::container(&path, "video stream has no frame rate"))?;
        let frame_count = video.frame_count.unwrap_or_else(|| {
            let secs = video.duration_secs.unwrap_or(info.duration_secs);
            (secs * fps.as_f64()).round().max(0.0) as u64
        });
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let spec = SegmentSpec::new(name, fps, video.canvas, frame_count)?;
        tracing::debug!(
            path = %path.display(),
            size = %spec.canvas,
            fps = %spec.fps,
            frames = spec.frame_count,
            "opened video file source"
        );
        Ok(Self {
            spec,
            path,
            decoder: None,
            next: 0,
            done: false,
        })
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn spawn_decoder(&self) -> ExplainerResult<Decoder> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-nostdin", "-i"])
            .arg(&self.path)
            .args([
                "-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-s",
            ])
            .arg(self.spec.canvas.to_string())
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        tracing::debug!(?cmd, "spawning ffmpeg decoder");

        let mut child = cmd.spawn().map_err(|e| {
            self.failure(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failure("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = StderrDrain::spawn(&mut child, "ffmpeg")?;
        Ok(Decoder {
            stdout: BufReader::with_capacity(self.spec.canvas.rgb_len() * 2, stdout),
            child,
            stderr,
        })
    }

    fn failure(&self, msg: impl Into<String>) -> ExplainerError {
        ExplainerError::render(&self.spec.name, self.next, msg)
    }

    fn stop_decoder(&mut self) {
        if let Some(mut dec) = self.decoder.take() {
            let _ = dec.child.kill();
            let _ = dec.child.wait();
            let _ = dec.stderr.collect();
        }
    }

    /// Wait for the decoder after EOF and surface a non-zero exit.
    fn finish_decoder(&mut self) -> ExplainerResult<()> {
        self.done = true;
        let Some(mut dec) = self.decoder.take() else {
            return Ok(());
        };
        let status = dec
            .child
            .wait()
            .map_err(|e| self.failure(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = dec.stderr.collect()?;
        if !status.success() {
            return Err(self.failure(format!(
                "ffmpeg decode exited with status {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl FrameSource for VideoFileSource {
    fn spec(&self) -> &SegmentSpec {
        &self.spec
    }

    fn next_frame(&mut self) -> ExplainerResult<Option<Frame>> {
        if self.done {
            return Ok(None);
        }
        if self.next >= self.spec.frame_count {
            // Declared length reached; any trailing frames the container holds are ignored.
            self.done = true;
            self.stop_decoder();
            return Ok(None);
        }
        if self.decoder.is_none() {
            self.decoder = Some(self.spawn_decoder()?);
        }

        let mut buf = vec![0u8; self.spec.canvas.rgb_len()];
        let read = match self.decoder.as_mut() {
            Some(dec) => read_full(&mut dec.stdout, &mut buf),
            None => Ok(0),
        }
        .map_err(|e| self.failure(format!("failed to read decoded frame: {e}")))?;

        if read == 0 {
            self.finish_decoder()?;
            return Ok(None);
        }
        if read < buf.len() {
            self.finish_decoder()?;
            return Err(self.failure(format!(
                "truncated frame from decoder: {read} of {} bytes",
                buf.len()
            )));
        }

        let frame = Frame::from_rgb(FrameIndex(self.next), self.spec.canvas, buf)?;
        self.next += 1;
        Ok(Some(frame))
    }
}

impl Drop for VideoFileSource {
    fn drop(&mut self) {
        self.stop_decoder();
    }
}

/// Fill `buf` until it is full or the reader hits EOF; return the byte count.
fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "../../tests/unit/source/video_file.rs"]
mod tests;
