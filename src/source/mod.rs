//! Frame sources: lazy, finite, non-restartable frame sequences for one segment.

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::frame::Frame;

/// Progressive-reveal chart segment.
pub mod chart;
/// Static title card segment.
pub mod title;
/// Segment decoded from an existing video file.
pub mod video_file;

pub use chart::{ChartRevealSource, Dataset, DatasetSpec};
pub use title::TitleCardSource;
pub use video_file::VideoFileSource;

/// Static description of a segment: identity, native rate and size, declared length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentSpec {
    /// Name used in logs and errors.
    pub name: String,
    /// Native frame rate.
    pub fps: Fps,
    /// Native resolution.
    pub canvas: Canvas,
    /// Declared frame count. A source may yield fewer (early exhaustion) but never more.
    pub frame_count: u64,
}

impl SegmentSpec {
    /// Construct and validate a segment description.
    pub fn new(
        name: impl Into<String>,
        fps: Fps,
        canvas: Canvas,
        frame_count: u64,
    ) -> ExplainerResult<Self> {
        let spec = Self {
            name: name.into(),
            fps,
            canvas,
            frame_count,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check name, rate and size.
    pub fn validate(&self) -> ExplainerResult<()> {
        if self.name.trim().is_empty() {
            return Err(ExplainerError::validation("segment name must be non-empty"));
        }
        self.fps.validate()?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ExplainerError::validation(format!(
                "segment '{}' size must be non-zero, got {}",
                self.name, self.canvas
            )));
        }
        Ok(())
    }

    /// Declared duration in seconds (`frame_count / fps`).
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame_count)
    }
}

/// A lazy, finite sequence of frames for one segment.
///
/// Contract:
/// - `next_frame` yields frames with indices `0, 1, 2, ...` and then `Ok(None)` forever.
/// - Frames match `spec().canvas`.
/// - Content is a pure function of the source's parameters; a fresh instance with the same
///   parameters yields bit-identical frames. Sources are not restartable.
/// - An error means the frame could not be produced; callers abort the segment.
pub trait FrameSource {
    /// Segment description.
    fn spec(&self) -> &SegmentSpec;

    /// Produce the next frame, or `None` once the sequence is exhausted.
    fn next_frame(&mut self) -> ExplainerResult<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn spec(&self) -> &SegmentSpec {
        (**self).spec()
    }

    fn next_frame(&mut self) -> ExplainerResult<Option<Frame>> {
        (**self).next_frame()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/mod.rs"]
mod tests;
