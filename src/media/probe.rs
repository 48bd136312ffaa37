use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ExplainerError, ExplainerResult};

/// Container-level facts read through `ffprobe`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    /// Container duration in seconds (0 when `ffprobe` reports none).
    pub duration_secs: f64,
    /// First video stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// First audio stream, if any.
    pub audio: Option<AudioStreamInfo>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoStreamInfo {
    pub codec: Option<String>,
    pub canvas: Canvas,
    /// Stream frame rate from `r_frame_rate`.
    pub fps: Option<Fps>,
    /// `nb_frames` when the container records it.
    pub frame_count: Option<u64>,
    pub duration_secs: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioStreamInfo {
    pub codec: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub duration_secs: Option<f64>,
}

impl MediaInfo {
    /// Video stream or a `ContainerError` naming the file.
    pub fn require_video(&self) -> ExplainerResult<&VideoStreamInfo> {
        self.video
            .as_ref()
            .ok_or_else(|| ExplainerError::container(&self.path, "no video stream found"))
    }

    /// Audio stream or a `ContainerError` naming the file.
    pub fn require_audio(&self) -> ExplainerResult<&AudioStreamInfo> {
        self.audio
            .as_ref()
            .ok_or_else(|| ExplainerError::container(&self.path, "no audio stream found"))
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe `path` with `ffprobe`.
///
/// Missing files, unreadable data and `ffprobe` rejections all surface as `ContainerError`.
#[tracing::instrument(level = "debug")]
pub fn probe_media(path: &Path) -> ExplainerResult<MediaInfo> {
    if !path.is_file() {
        return Err(ExplainerError::container(path, "file does not exist"));
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(ffprobe_spawn_error)?;
    if !out.status.success() {
        return Err(ExplainerError::container(
            path,
            format!(
                "ffprobe rejected the file: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    parse_probe_json(path, &out.stdout)
}

fn ffprobe_spawn_error(e: std::io::Error) -> ExplainerError {
    ExplainerError::ExternalTool {
        tool: "ffprobe".to_string(),
        code: None,
        stderr: format!("failed to spawn ffprobe (is it installed and on PATH?): {e}"),
    }
}

pub(crate) fn parse_probe_json(path: &Path, json: &[u8]) -> ExplainerResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ExplainerError::container(path, format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .map(|s| -> ExplainerResult<VideoStreamInfo> {
            let width = s
                .width
                .ok_or_else(|| ExplainerError::container(path, "missing video width"))?;
            let height = s
                .height
                .ok_or_else(|| ExplainerError::container(path, "missing video height"))?;
            Ok(VideoStreamInfo {
                codec: s.codec_name.clone(),
                canvas: Canvas::new(width, height),
                fps: s.r_frame_rate.as_deref().and_then(|r| r.parse::<Fps>().ok()),
                frame_count: s.nb_frames.as_deref().and_then(|n| n.parse().ok()),
                duration_secs: parse_secs(s.duration.as_deref()),
            })
        })
        .transpose()?;

    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStreamInfo {
            codec: s.codec_name.clone(),
            sample_rate: s.sample_rate.as_deref().and_then(|r| r.parse().ok()),
            channels: s.channels,
            duration_secs: parse_secs(s.duration.as_deref()),
        });

    if video.is_none() && audio.is_none() {
        return Err(ExplainerError::container(
            path,
            "no audio or video streams found",
        ));
    }

    let duration_secs = parse_secs(parsed.format.and_then(|f| f.duration).as_deref())
        .or_else(|| video.as_ref().and_then(|v| v.duration_secs))
        .or_else(|| audio.as_ref().and_then(|a| a.duration_secs))
        .unwrap_or(0.0);

    Ok(MediaInfo {
        path: path.to_path_buf(),
        duration_secs,
        video,
        audio,
    })
}

fn parse_secs(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
