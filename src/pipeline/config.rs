use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::audio::{MuxPolicy, VoiceConfig};
use crate::compose::ConcatOpts;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::render::{CardStyle, ChartStyle};
use crate::source::DatasetSpec;

/// File names of the artifacts a job writes into its output directory.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputNames {
    pub title_video: String,
    pub chart_video: String,
    pub narration: String,
    /// Concatenated segments without audio. Kept after muxing.
    pub composed_video: String,
    pub final_video: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            title_video: "title_screen.mp4".to_string(),
            chart_video: "chart_animation.mp4".to_string(),
            narration: "voiceover.wav".to_string(),
            composed_video: "composed_video.mp4".to_string(),
            final_video: "final_video.mp4".to_string(),
        }
    }
}

impl OutputNames {
    fn all(&self) -> [(&'static str, &str); 5] {
        [
            ("title_video", &self.title_video),
            ("chart_video", &self.chart_video),
            ("narration", &self.narration),
            ("composed_video", &self.composed_video),
            ("final_video", &self.final_video),
        ]
    }

    fn validate(&self) -> ExplainerResult<()> {
        let all = self.all();
        for (i, (field, name)) in all.iter().enumerate() {
            let p = Path::new(name);
            if name.trim().is_empty() || p.file_name() != Some(p.as_os_str()) {
                return Err(ExplainerError::validation(format!(
                    "outputs.{field} must be a plain file name, got '{name}'"
                )));
            }
            if let Some((other, _)) = all[..i].iter().find(|(_, n)| n == name) {
                return Err(ExplainerError::validation(format!(
                    "outputs.{field} and outputs.{other} both name '{name}'"
                )));
            }
        }
        Ok(())
    }
}

/// Title card segment settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TitleSegmentConfig {
    pub fps: Fps,
    pub seconds: f64,
    pub canvas: Canvas,
    pub style: CardStyle,
}

impl Default for TitleSegmentConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 24, den: 1 },
            seconds: 5.0,
            canvas: Canvas::HD,
            style: CardStyle::default(),
        }
    }
}

impl TitleSegmentConfig {
    /// `seconds × fps`, rounded to the nearest frame.
    pub fn frame_count(&self) -> u64 {
        (self.seconds * self.fps.as_f64()).round().max(0.0) as u64
    }
}

/// Chart animation segment settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartSegmentConfig {
    pub fps: Fps,
    pub canvas: Canvas,
    pub dataset: DatasetSpec,
    pub style: ChartStyle,
}

impl Default for ChartSegmentConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 2, den: 1 },
            canvas: Canvas::HD,
            dataset: DatasetSpec::default(),
            style: ChartStyle::default(),
        }
    }
}

/// A complete explainer job. Every field has a default, so `{}` parses; only `title` must be
/// supplied before running.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    pub title: String,
    pub description: String,
    /// Narration text; `{title}` and `{description}` are substituted.
    pub narration: String,
    pub outputs: OutputNames,
    pub title_card: TitleSegmentConfig,
    pub chart: ChartSegmentConfig,
    /// How the segments are joined into the composed video.
    pub compose: ConcatOpts,
    pub mux: MuxPolicy,
    pub voice: VoiceConfig,
    /// Extra font directories for the renderer, on top of system fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            narration: "Welcome to this video about {title}. {description}.".to_string(),
            outputs: OutputNames::default(),
            title_card: TitleSegmentConfig::default(),
            chart: ChartSegmentConfig::default(),
            compose: ConcatOpts::default(),
            mux: MuxPolicy::default(),
            voice: VoiceConfig::default(),
            font_dirs: Vec::new(),
        }
    }
}

impl JobConfig {
    /// Parse a job from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ExplainerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ExplainerError::validation(format!("parse job JSON: {e}")))
    }

    /// Parse a job from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ExplainerResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ExplainerError::validation(format!("open job JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Narration text with the title and description filled in.
    pub fn narration_text(&self) -> String {
        self.narration
            .replace("{title}", &self.title)
            .replace("{description}", &self.description)
    }

    pub fn validate(&self) -> ExplainerResult<()> {
        if self.title.trim().is_empty() {
            return Err(ExplainerError::validation("job title must be non-empty"));
        }
        if self.narration_text().trim().is_empty() {
            return Err(ExplainerError::validation("narration text must be non-empty"));
        }
        self.outputs.validate()?;

        let t = &self.title_card;
        t.fps.validate()?;
        if !t.seconds.is_finite() || t.seconds < 0.0 {
            return Err(ExplainerError::validation(format!(
                "title_card.seconds must be finite and >= 0, got {}",
                t.seconds
            )));
        }
        t.canvas.validate_for_encode()?;
        t.style.design.validate_for_encode()?;

        let c = &self.chart;
        c.fps.validate()?;
        c.canvas.validate_for_encode()?;
        c.dataset.build()?;
        if !c.style.line_width.is_finite() || c.style.line_width <= 0.0 {
            return Err(ExplainerError::validation(
                "chart.style.line_width must be finite and > 0",
            ));
        }

        if let crate::compose::TargetPolicy::Explicit { canvas, fps } = self.compose.target {
            fps.validate()?;
            canvas.validate_for_encode()?;
        }
        self.voice.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
