//! Segment composition: ordered concatenation of heterogeneous segments into one stream.

/// Frame-level concatenation with rate and size normalization.
pub mod concat;

pub use concat::{
    ConcatOpts, ConcatReport, RatePolicy, ResizePolicy, SegmentConcatenator, SegmentReport,
    TargetPolicy, output_frames_for,
};
