//! Video encoders.
//!
//! An encoder owns one [`VideoStream`]: a fixed size and frame rate chosen at open time, and the
//! running count of frames written. Frame `i` lands at `i / fps` seconds.

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::frame::Frame;

/// `ffmpeg`-based MP4 encoder.
pub mod ffmpeg;

pub use ffmpeg::{FfmpegEncoder, FfmpegEncoderOpts};

/// Size and rate of an output stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamConfig {
    pub canvas: Canvas,
    pub fps: Fps,
}

impl StreamConfig {
    pub fn new(canvas: Canvas, fps: Fps) -> Self {
        Self { canvas, fps }
    }

    /// Check the configuration can be encoded as yuv420p H.264.
    pub fn validate(&self) -> ExplainerResult<()> {
        self.fps.validate()?;
        self.canvas.validate_for_encode()
    }
}

/// Accumulation state of an open encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoStream {
    config: StreamConfig,
    frames_written: u64,
}

impl VideoStream {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            frames_written: 0,
        }
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Duration covered by the frames written so far.
    pub fn duration_secs(&self) -> f64 {
        self.config.fps.frames_to_secs(self.frames_written)
    }

    /// Index the next written frame will occupy.
    pub fn next_index(&self) -> FrameIndex {
        FrameIndex(self.frames_written)
    }

    /// Reject frames whose size differs from the stream's.
    pub fn check(&self, frame: &Frame) -> ExplainerResult<()> {
        if frame.canvas() != self.config.canvas {
            return Err(ExplainerError::DimensionMismatch {
                expected: self.config.canvas,
                got: frame.canvas(),
            });
        }
        Ok(())
    }

    fn record(&mut self) -> FrameIndex {
        let idx = self.next_index();
        self.frames_written += 1;
        idx
    }
}

/// Ordered frame consumer that produces one fixed-rate video.
///
/// Contract:
/// - `write` appends in FIFO order and fails with `DimensionMismatch` for a wrongly sized frame.
/// - `close` finalizes exactly once; later calls are no-ops returning `Ok(())`.
/// - `write` after `close` is an error.
pub trait VideoEncoder {
    /// Current stream state.
    fn stream(&self) -> &VideoStream;

    /// Append one frame.
    fn write(&mut self, frame: &Frame) -> ExplainerResult<()>;

    /// Finalize the output and release resources.
    fn close(&mut self) -> ExplainerResult<()>;

    /// Whether `close` has already run.
    fn is_closed(&self) -> bool;
}

/// One frame as seen by [`InMemoryEncoder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodedFrame {
    /// Output position.
    pub index: FrameIndex,
    /// Presentation time in seconds.
    pub timestamp_secs: f64,
    /// Content fingerprint of the written frame.
    pub fingerprint: u64,
}

/// Encoder that records per-frame fingerprints instead of writing a file.
///
/// Useful for dry runs and for asserting frame order.
#[derive(Debug)]
pub struct InMemoryEncoder {
    stream: VideoStream,
    frames: Vec<EncodedFrame>,
    closed: bool,
}

impl InMemoryEncoder {
    /// Open an in-memory stream. Unlike file encoders, odd sizes are accepted.
    pub fn open(config: StreamConfig) -> ExplainerResult<Self> {
        config.fps.validate()?;
        if config.canvas.width == 0 || config.canvas.height == 0 {
            return Err(ExplainerError::validation(
                "stream width/height must be non-zero",
            ));
        }
        Ok(Self {
            stream: VideoStream::new(config),
            frames: Vec::new(),
            closed: false,
        })
    }

    /// Frames in write order.
    pub fn frames(&self) -> &[EncodedFrame] {
        &self.frames
    }

    /// Fingerprints in write order.
    pub fn fingerprints(&self) -> Vec<u64> {
        self.frames.iter().map(|f| f.fingerprint).collect()
    }
}

impl VideoEncoder for InMemoryEncoder {
    fn stream(&self) -> &VideoStream {
        &self.stream
    }

    fn write(&mut self, frame: &Frame) -> ExplainerResult<()> {
        if self.closed {
            return Err(ExplainerError::validation("encoder is already closed"));
        }
        self.stream.check(frame)?;
        let timestamp_secs = self.stream.duration_secs();
        let index = self.stream.record();
        self.frames.push(EncodedFrame {
            index,
            timestamp_secs,
            fingerprint: frame.fingerprint(),
        });
        Ok(())
    }

    fn close(&mut self) -> ExplainerResult<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mod.rs"]
mod tests;
