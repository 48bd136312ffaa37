use std::path::Path;
use std::process::{Command, Stdio};

use crate::audio::AudioAsset;
use crate::foundation::atomic::PendingFile;
use crate::foundation::error::{ExplainerError, ExplainerResult};
use crate::media::run_tool;

/// Voice parameters handed to a [`SpeechSynthesizer`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Engine voice name; `None` uses the engine default.
    pub voice: Option<String>,
    pub words_per_minute: u32,
    /// 0..=99.
    pub pitch: u8,
    /// 0..=200.
    pub amplitude: u16,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice: None,
            words_per_minute: 175,
            pitch: 50,
            amplitude: 100,
        }
    }
}

impl VoiceConfig {
    pub fn validate(&self) -> ExplainerResult<()> {
        if !(80..=500).contains(&self.words_per_minute) {
            return Err(ExplainerError::validation(format!(
                "voice words_per_minute must be in 80..=500, got {}",
                self.words_per_minute
            )));
        }
        if self.pitch > 99 {
            return Err(ExplainerError::validation(format!(
                "voice pitch must be in 0..=99, got {}",
                self.pitch
            )));
        }
        if self.amplitude > 200 {
            return Err(ExplainerError::validation(format!(
                "voice amplitude must be in 0..=200, got {}",
                self.amplitude
            )));
        }
        if let Some(v) = &self.voice
            && v.trim().is_empty()
        {
            return Err(ExplainerError::validation("voice name must be non-empty"));
        }
        Ok(())
    }
}

/// Text-to-speech engine writing one audio file per call.
///
/// Engines are constructed by the caller and live for one pipeline run.
pub trait SpeechSynthesizer {
    /// Speak `text` into `out` and return the resulting asset.
    ///
    /// Nothing appears at `out` unless synthesis succeeds.
    fn synthesize(
        &mut self,
        text: &str,
        voice: &VoiceConfig,
        out: &Path,
    ) -> ExplainerResult<AudioAsset>;
}

/// Synthesizer backed by the `espeak-ng` (or legacy `espeak`) command-line tool, writing WAV.
#[derive(Clone, Debug)]
pub struct EspeakSynthesizer {
    program: String,
}

impl EspeakSynthesizer {
    const CANDIDATES: [&'static str; 2] = ["espeak-ng", "espeak"];

    /// Use the first of `espeak-ng`, `espeak` found on `PATH`.
    pub fn detect() -> ExplainerResult<Self> {
        Self::CANDIDATES
            .iter()
            .find(|p| responds_to_version(p))
            .map(|p| Self::with_program(*p))
            .ok_or_else(|| {
                ExplainerError::validation(
                    "speech synthesis requires espeak-ng or espeak on PATH; \
                     pass pre-rendered narration audio instead",
                )
            })
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, text: &str, voice: &VoiceConfig, wav: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-w").arg(wav);
        cmd.args([
            "-s",
            &voice.words_per_minute.to_string(),
            "-p",
            &voice.pitch.to_string(),
            "-a",
            &voice.amplitude.to_string(),
        ]);
        if let Some(v) = &voice.voice {
            cmd.args(["-v", v]);
        }
        // `--` keeps text that starts with `-` from being parsed as a flag.
        cmd.arg("--").arg(text);
        cmd
    }
}

impl SpeechSynthesizer for EspeakSynthesizer {
    #[tracing::instrument(skip(self, text, voice, out), fields(program = %self.program, out = %out.display()))]
    fn synthesize(
        &mut self,
        text: &str,
        voice: &VoiceConfig,
        out: &Path,
    ) -> ExplainerResult<AudioAsset> {
        if text.trim().is_empty() {
            return Err(ExplainerError::validation("narration text must be non-empty"));
        }
        voice.validate()?;

        let pending = PendingFile::reserve(out)?;
        run_tool(self.command(text, voice, pending.temp_path()), &self.program)?;
        let mut asset = AudioAsset::open(pending.temp_path())?;
        asset.path = pending.commit()?;
        tracing::info!(secs = asset.duration_secs, "narration synthesized");
        Ok(asset)
    }
}

fn responds_to_version(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/speech.rs"]
mod tests;
