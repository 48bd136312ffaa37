//! Explainer is a small media composition pipeline.
//!
//! It renders a title card and a progressive-reveal chart into raw frames, encodes them with the
//! system `ffmpeg`, concatenates segments of differing size and rate into one continuous stream,
//! and muxes a narration track onto the result:
//!
//! - Describe a job with a [`JobConfig`]
//! - Run it with a [`Pipeline`]
//! - Or drive the pieces directly: [`FrameSource`] into [`SegmentConcatenator`] into a
//!   [`VideoEncoder`], then [`AudioMuxer`]
#![forbid(unsafe_code)]

/// Narration assets, speech synthesis and audio muxing.
pub mod audio;
/// Segment concatenation.
pub mod compose;
/// Video encoders.
pub mod encode;
mod foundation;
/// `ffmpeg`/`ffprobe` helpers and media probing.
pub mod media;
/// Job configuration and the end-to-end pipeline.
pub mod pipeline;
/// Frames and rasterization.
pub mod render;
/// Frame sources.
pub mod source;

pub use crate::foundation::atomic::PendingFile;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgb8};
pub use crate::foundation::error::{ExplainerError, ExplainerResult, Stage};

pub use crate::audio::{
    AudioAsset, AudioMuxer, EspeakSynthesizer, FfmpegMuxer, MuxPolicy, MuxReport,
    SpeechSynthesizer, VoiceConfig,
};
pub use crate::compose::{
    ConcatOpts, ConcatReport, RatePolicy, ResizePolicy, SegmentConcatenator, SegmentReport,
    TargetPolicy,
};
pub use crate::encode::{
    EncodedFrame, FfmpegEncoder, FfmpegEncoderOpts, InMemoryEncoder, StreamConfig, VideoEncoder,
    VideoStream,
};
pub use crate::media::{MediaInfo, ffmpeg_tools_available, probe_media};
pub use crate::pipeline::{CompositionResult, JobConfig, Narration, Pipeline};
pub use crate::render::frame::Frame;
pub use crate::render::svg::SvgRenderer;
pub use crate::render::{CardRenderer, CardStyle, ChartRenderer, ChartStyle, DataWindow, TitleCard};
pub use crate::source::{
    ChartRevealSource, Dataset, DatasetSpec, FrameSource, SegmentSpec, TitleCardSource,
    VideoFileSource,
};
