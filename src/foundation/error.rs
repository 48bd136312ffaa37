use std::fmt;
use std::path::PathBuf;

use crate::foundation::core::Canvas;

/// Crate-wide result alias.
pub type ExplainerResult<T> = Result<T, ExplainerError>;

/// Pipeline stage names used to give errors their context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Title card segment encode.
    Title,
    /// Chart animation segment encode.
    Chart,
    /// Narration synthesis.
    Narration,
    /// Concatenation of all segments into the video-only artifact.
    Compose,
    /// Audio mux onto the composed video.
    Mux,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Title => "title",
            Stage::Chart => "chart",
            Stage::Narration => "narration",
            Stage::Compose => "compose",
            Stage::Mux => "mux",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ExplainerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render failure in segment '{segment}' at frame {frame}: {message}")]
    RenderFailure {
        segment: String,
        frame: u64,
        message: String,
    },

    #[error("dimension mismatch: got {got}, expected {expected}")]
    DimensionMismatch { expected: Canvas, got: Canvas },

    #[error("container error for '{}': {message}", .path.display())]
    Container { path: PathBuf, message: String },

    #[error("{tool} exited with {}: {stderr}", fmt_exit_code(.code))]
    ExternalTool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ExplainerError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

impl ExplainerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(segment: impl Into<String>, frame: u64, msg: impl Into<String>) -> Self {
        Self::RenderFailure {
            segment: segment.into(),
            frame,
            message: msg.into(),
        }
    }

    pub fn container(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Container {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn external_tool(tool: impl Into<String>, code: Option<i32>, stderr: &[u8]) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            code,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Attach a pipeline stage. Already-staged errors keep their original stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            e @ Self::Stage { .. } => e,
            e => Self::Stage {
                stage,
                source: Box::new(e),
            },
        }
    }

    /// Stage the error was raised in, if it has been tagged.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, with any stage wrapper removed.
    pub fn root(&self) -> &ExplainerError {
        match self {
            Self::Stage { source, .. } => source.root(),
            e => e,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
