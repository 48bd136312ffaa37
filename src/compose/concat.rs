use std::path::Path;

use crate::encode::{FfmpegEncoder, FfmpegEncoderOpts, StreamConfig, VideoEncoder};
use crate::foundation::core::{Canvas, Fps, FrameRange};
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::frame::Frame;
use crate::source::{FrameSource, SegmentSpec};

/// How the unified output size and rate are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Use the first segment's native size and rate.
    #[default]
    FirstSegment,
    /// Use a fixed size and rate.
    Explicit { canvas: Canvas, fps: Fps },
}

/// How a segment whose rate differs from the output rate is mapped onto output frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// Keep each segment's wall-clock duration by repeating or dropping source frames.
    /// Output frame `j` of a segment shows source frame `floor(j * src_fps / out_fps)`.
    #[default]
    PreserveDuration,
    /// Write every source frame exactly once; the segment plays at the output rate.
    PreserveFrames,
}

/// What to do with frames whose size differs from the output size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Bilinear rescale to the output size.
    #[default]
    Rescale,
    /// Pass frames through untouched; the encoder reports `DimensionMismatch`.
    Reject,
}

/// Concatenation settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConcatOpts {
    pub target: TargetPolicy,
    pub rate: RatePolicy,
    pub resize: ResizePolicy,
}

/// What one segment contributed to the output.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SegmentReport {
    pub name: String,
    /// Native size and rate of the segment.
    pub native: StreamConfig,
    pub declared_frames: u64,
    /// Frames actually pulled from the source.
    pub source_frames: u64,
    /// Output frames `[start, end)` occupied by the segment.
    pub output: FrameRange,
    /// The source ended before its declared count.
    pub exhausted_early: bool,
}

/// Result of a concatenation pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ConcatReport {
    pub config: StreamConfig,
    pub segments: Vec<SegmentReport>,
    pub total_frames: u64,
    pub duration_secs: f64,
}

/// Output frames a segment of `source_frames` frames at `src` occupies at `out` under `policy`.
pub fn output_frames_for(source_frames: u64, src: Fps, out: Fps, policy: RatePolicy) -> u64 {
    match policy {
        RatePolicy::PreserveFrames => source_frames,
        RatePolicy::PreserveDuration => {
            let (a, b) = rate_ratio(src, out);
            ceil_div(u128::from(source_frames) * b, a) as u64
        }
    }
}

/// `(a, b)` such that one source frame spans `b / a` output frames.
fn rate_ratio(src: Fps, out: Fps) -> (u128, u128) {
    (
        u128::from(src.num) * u128::from(out.den),
        u128::from(src.den) * u128::from(out.num),
    )
}

fn ceil_div(n: u128, d: u128) -> u128 {
    n.div_ceil(d)
}

/// Drives segments, in order, into one encoder with one size and rate.
#[derive(Clone, Debug, Default)]
pub struct SegmentConcatenator {
    opts: ConcatOpts,
}

impl SegmentConcatenator {
    pub fn new(opts: ConcatOpts) -> Self {
        Self { opts }
    }

    /// Pick the output size and rate for `specs` according to the target policy.
    pub fn resolve_target<'a>(
        &self,
        specs: impl IntoIterator<Item = &'a SegmentSpec>,
    ) -> ExplainerResult<StreamConfig> {
        let config = match self.opts.target {
            TargetPolicy::Explicit { canvas, fps } => StreamConfig::new(canvas, fps),
            TargetPolicy::FirstSegment => {
                let first = specs.into_iter().next().ok_or_else(|| {
                    ExplainerError::validation("cannot concatenate an empty segment list")
                })?;
                StreamConfig::new(first.canvas, first.fps)
            }
        };
        config.fps.validate()?;
        Ok(config)
    }

    /// Pull every frame of every source, in declaration order, into `encoder`.
    ///
    /// The encoder's stream configuration is the unified output. Segment `N + 1` starts right
    /// after the last output frame of segment `N`. A source that ends early is not an error; a
    /// source error aborts the pass as `RenderFailure`. The encoder is left open: the caller
    /// closes it on success and drops it on failure.
    pub fn run<S: FrameSource>(
        &self,
        sources: &mut [S],
        encoder: &mut dyn VideoEncoder,
    ) -> ExplainerResult<ConcatReport> {
        let config = encoder.stream().config();
        let mut segments = Vec::with_capacity(sources.len());
        for source in sources.iter_mut() {
            segments.push(self.run_segment(source, config, encoder)?);
        }

        let total_frames = encoder.stream().frames_written();
        Ok(ConcatReport {
            config,
            segments,
            total_frames,
            duration_secs: config.fps.frames_to_secs(total_frames),
        })
    }

    fn run_segment<S: FrameSource>(
        &self,
        source: &mut S,
        config: StreamConfig,
        encoder: &mut dyn VideoEncoder,
    ) -> ExplainerResult<SegmentReport> {
        let spec = source.spec().clone();
        let start = encoder.stream().next_index();
        let (a, b) = rate_ratio(spec.fps, config.fps);
        let mut scaled_cache: Option<(u64, Frame)> = None;
        let mut read = 0u64;

        let _span = tracing::info_span!("segment", name = %spec.name).entered();

        while read < spec.frame_count {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => return Err(as_render_failure(e, &spec.name, read)),
            };

            let frame = match self.opts.resize {
                ResizePolicy::Reject => frame,
                ResizePolicy::Rescale if frame.canvas() == config.canvas => frame,
                ResizePolicy::Rescale => {
                    let key = frame.fingerprint();
                    match &scaled_cache {
                        Some((k, scaled)) if *k == key => scaled.clone(),
                        _ => {
                            let scaled = frame
                                .rescaled(config.canvas)
                                .map_err(|e| as_render_failure(e, &spec.name, read))?;
                            scaled_cache = Some((key, scaled.clone()));
                            scaled
                        }
                    }
                }
            };

            let repeats = match self.opts.rate {
                RatePolicy::PreserveFrames => 1,
                RatePolicy::PreserveDuration => {
                    let i = u128::from(read);
                    (ceil_div((i + 1) * b, a) - ceil_div(i * b, a)) as u64
                }
            };
            for _ in 0..repeats {
                encoder.write(&frame.with_index(encoder.stream().next_index()))?;
            }
            read += 1;
        }

        let exhausted_early = read < spec.frame_count;
        if exhausted_early {
            tracing::warn!(
                declared = spec.frame_count,
                read,
                "segment source ended early, continuing with next segment"
            );
        }

        let end = encoder.stream().next_index();
        let output = FrameRange::new(start, end)?;
        tracing::info!(
            native = %format!("{}@{}", spec.canvas, spec.fps),
            source_frames = read,
            output_start = start.0,
            output_end = end.0,
            "segment written"
        );

        Ok(SegmentReport {
            name: spec.name,
            native: StreamConfig::new(spec.canvas, spec.fps),
            declared_frames: spec.frame_count,
            source_frames: read,
            output,
            exhausted_early,
        })
    }

    /// Resolve the target, encode all sources to `out_path` with `ffmpeg`, and close.
    ///
    /// On any failure the encoder is dropped unclosed, so nothing appears at `out_path`.
    pub fn concat_to_file<S: FrameSource>(
        &self,
        sources: &mut [S],
        out_path: &Path,
        enc_opts: FfmpegEncoderOpts,
    ) -> ExplainerResult<ConcatReport> {
        let config = self.resolve_target(sources.iter().map(|s| s.spec()))?;
        let mut encoder = FfmpegEncoder::open(config, out_path, enc_opts)?;
        let report = self.run(sources, &mut encoder)?;
        encoder.close()?;
        Ok(report)
    }
}

fn as_render_failure(e: ExplainerError, segment: &str, frame: u64) -> ExplainerError {
    match e {
        e @ ExplainerError::RenderFailure { .. } => e,
        e => ExplainerError::render(segment, frame, e.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/concat.rs"]
mod tests;
