//! Narration audio: the external asset, its synthesis, and muxing it onto a finished video.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::atomic::PendingFile;
use crate::foundation::error::ExplainerResult;
use crate::media::probe_media;

/// Audio/video mux with a duration policy.
pub mod mux;
/// Text-to-speech collaborators.
pub mod speech;

pub use mux::{AudioMuxer, FfmpegMuxer, MuxPolicy, MuxReport};
pub use speech::{EspeakSynthesizer, SpeechSynthesizer, VoiceConfig};

/// A pre-rendered audio file and its probed duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration_secs: f64,
}

impl AudioAsset {
    /// Probe `path` and require an audio stream.
    pub fn open(path: impl AsRef<Path>) -> ExplainerResult<Self> {
        let path = path.as_ref();
        let info = probe_media(path)?;
        let audio = info.require_audio()?;
        Ok(Self {
            path: path.to_path_buf(),
            duration_secs: audio.duration_secs.unwrap_or(info.duration_secs),
        })
    }

    /// Copy the file to `dest` through a temp-then-rename and return the copy.
    ///
    /// A `dest` that already is this file is left untouched.
    pub fn publish_to(&self, dest: &Path) -> ExplainerResult<Self> {
        if mux::same_file(&self.path, dest) {
            return Ok(self.clone());
        }
        let pending = PendingFile::reserve(dest)?;
        std::fs::copy(&self.path, pending.temp_path()).with_context(|| {
            format!(
                "failed to copy narration '{}' to '{}'",
                self.path.display(),
                dest.display()
            )
        })?;
        let path = pending.commit()?;
        tracing::debug!(from = %self.path.display(), to = %path.display(), "narration published");
        Ok(Self {
            path,
            duration_secs: self.duration_secs,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mod.rs"]
mod tests;
