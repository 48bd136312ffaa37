//! The explainer job: title card, chart animation, narration, composition, mux.
//!
//! Stages run sequentially and each publishes one artifact into the output directory through a
//! temp-then-rename, so a failed stage never leaves a partial file behind and artifacts of
//! earlier stages remain usable for a retry.

use std::path::{Path, PathBuf};

use crate::audio::{AudioAsset, AudioMuxer, FfmpegMuxer, MuxReport, SpeechSynthesizer};
use crate::compose::{ConcatOpts, ConcatReport, SegmentConcatenator};
use crate::encode::FfmpegEncoderOpts;
use crate::foundation::error::{ExplainerError, ExplainerResult, Stage};
use crate::render::TitleCard;
use crate::render::svg::SvgRenderer;
use crate::source::{
    ChartRevealSource, FrameSource, SegmentSpec, TitleCardSource, VideoFileSource,
};

/// Job configuration types.
pub mod config;

pub use config::{ChartSegmentConfig, JobConfig, OutputNames, TitleSegmentConfig};

/// Where the narration track comes from.
pub enum Narration<'a> {
    /// Speak the job's narration text with a caller-owned engine.
    Synthesize(&'a mut dyn SpeechSynthesizer),
    /// Use an existing audio file, copied into the output directory unchanged.
    Prerecorded(PathBuf),
}

/// Everything a finished job produced.
#[derive(Clone, Debug, serde::Serialize)]
pub struct CompositionResult {
    pub out_dir: PathBuf,
    pub title_video: PathBuf,
    pub title: ConcatReport,
    pub chart_video: PathBuf,
    pub chart: ConcatReport,
    pub narration: AudioAsset,
    pub composed_video: PathBuf,
    pub composed: ConcatReport,
    pub mux: MuxReport,
}

impl CompositionResult {
    /// The deliverable: composed video plus narration.
    pub fn final_video(&self) -> &Path {
        &self.mux.output
    }
}

/// Runs a validated [`JobConfig`].
#[derive(Debug)]
pub struct Pipeline {
    config: JobConfig,
    renderer: SvgRenderer,
}

impl Pipeline {
    pub fn new(config: JobConfig) -> ExplainerResult<Self> {
        config.validate()?;
        let font_dirs: Vec<&Path> = config.font_dirs.iter().map(PathBuf::as_path).collect();
        let renderer = SvgRenderer::with_font_dirs(&font_dirs);
        Ok(Self { config, renderer })
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Source for the title card segment.
    pub fn title_source(&self) -> ExplainerResult<TitleCardSource> {
        let t = &self.config.title_card;
        TitleCardSource::new(
            SegmentSpec::new("title", t.fps, t.canvas, t.frame_count())?,
            TitleCard {
                title: self.config.title.clone(),
                description: self.config.description.clone(),
            },
            t.style.clone(),
            Box::new(self.renderer.clone()),
        )
    }

    /// Source for the chart animation segment.
    pub fn chart_source(&self) -> ExplainerResult<ChartRevealSource> {
        let c = &self.config.chart;
        ChartRevealSource::new(
            "chart",
            c.fps,
            c.canvas,
            c.dataset.build()?,
            c.style.clone(),
            Box::new(self.renderer.clone()),
        )
    }

    /// Run every stage into `out_dir` and return what was written.
    #[tracing::instrument(skip(self, out_dir, narration), fields(out_dir = %out_dir.display(), title = %self.config.title))]
    pub fn run(
        &self,
        out_dir: &Path,
        narration: Narration<'_>,
    ) -> ExplainerResult<CompositionResult> {
        std::fs::create_dir_all(out_dir).map_err(|e| {
            ExplainerError::Other(anyhow::Error::new(e).context(format!(
                "failed to create output directory '{}'",
                out_dir.display()
            )))
        })?;
        let names = &self.config.outputs;
        let at = |name: &str| out_dir.join(name);

        let title_video = at(&names.title_video);
        let title = self
            .encode_segment(self.title_source(), &title_video)
            .map_err(|e| e.in_stage(Stage::Title))?;

        let chart_video = at(&names.chart_video);
        let chart = self
            .encode_segment(self.chart_source(), &chart_video)
            .map_err(|e| e.in_stage(Stage::Chart))?;

        let narration = self
            .narrate(narration, &at(&names.narration))
            .map_err(|e| e.in_stage(Stage::Narration))?;

        let composed_video = at(&names.composed_video);
        // A zero-length segment file contributes nothing and has no frame rate to decode.
        let inputs: Vec<&Path> = [(&title_video, &title), (&chart_video, &chart)]
            .into_iter()
            .filter(|(_, report)| report.total_frames > 0)
            .map(|(path, _)| path.as_path())
            .collect();
        let composed = self
            .compose(&inputs, &composed_video)
            .map_err(|e| e.in_stage(Stage::Compose))?;

        let mux = FfmpegMuxer::new(self.config.mux)
            .mux(&composed_video, &narration.path, &at(&names.final_video))
            .map_err(|e| e.in_stage(Stage::Mux))?;

        tracing::info!(
            out = %mux.output.display(),
            secs = mux.output_secs,
            "explainer video created"
        );
        Ok(CompositionResult {
            out_dir: out_dir.to_path_buf(),
            title_video,
            title,
            chart_video,
            chart,
            narration,
            composed_video,
            composed,
            mux,
        })
    }

    /// Encode one segment at its native size and rate.
    fn encode_segment<S: FrameSource>(
        &self,
        source: ExplainerResult<S>,
        out: &Path,
    ) -> ExplainerResult<ConcatReport> {
        let mut sources = [source?];
        let report = SegmentConcatenator::new(ConcatOpts::default()).concat_to_file(
            &mut sources,
            out,
            FfmpegEncoderOpts::default(),
        )?;
        tracing::info!(
            out = %out.display(),
            frames = report.total_frames,
            secs = report.duration_secs,
            "segment encoded"
        );
        Ok(report)
    }

    fn narrate(&self, narration: Narration<'_>, out: &Path) -> ExplainerResult<AudioAsset> {
        let asset = match narration {
            Narration::Synthesize(engine) => {
                engine.synthesize(&self.config.narration_text(), &self.config.voice, out)?
            }
            Narration::Prerecorded(path) => AudioAsset::open(path)?.publish_to(out)?,
        };
        tracing::info!(
            path = %asset.path.display(),
            secs = asset.duration_secs,
            "narration ready"
        );
        Ok(asset)
    }

    /// Decode the finished segment files back and join them into one video-only file.
    fn compose(&self, inputs: &[&Path], out: &Path) -> ExplainerResult<ConcatReport> {
        let mut sources = inputs
            .iter()
            .map(|p| VideoFileSource::open(*p))
            .collect::<ExplainerResult<Vec<_>>>()?;
        let report = SegmentConcatenator::new(self.config.compose).concat_to_file(
            &mut sources,
            out,
            FfmpegEncoderOpts::default(),
        )?;
        tracing::info!(
            out = %out.display(),
            frames = report.total_frames,
            secs = report.duration_secs,
            "segments composed"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/mod.rs"]
mod tests;
