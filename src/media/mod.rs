//! Thin wrappers around the system `ffmpeg`/`ffprobe` binaries.

use std::io::Read as _;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;

use crate::foundation::error::{ExplainerError, ExplainerResult};

/// `ffprobe` metadata queries.
pub mod probe;

pub use probe::{AudioStreamInfo, MediaInfo, VideoStreamInfo, probe_media};

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg")
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn ffmpeg_tools_available() -> bool {
    is_ffmpeg_on_path() && is_tool_on_path("ffprobe")
}

/// Background reader for a child's stderr.
///
/// `ffmpeg` can block on a full stderr pipe while we block writing stdin or reading stdout, so the
/// pipe is drained on its own thread and collected after the child exits.
pub(crate) struct StderrDrain {
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl StderrDrain {
    /// Take `child.stderr` (which must be piped) and start draining it.
    pub(crate) fn spawn(child: &mut Child, tool: &str) -> ExplainerResult<Self> {
        let mut stderr = child.stderr.take().ok_or_else(|| {
            ExplainerError::validation(format!("failed to open {tool} stderr (unexpected)"))
        })?;
        let handle = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });
        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Join the drain thread and return everything the child wrote to stderr.
    pub(crate) fn collect(&mut self) -> ExplainerResult<Vec<u8>> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ExplainerError::validation("stderr drain thread panicked"))?
                .map_err(|e| {
                    ExplainerError::Other(anyhow::Error::new(e).context("stderr read failed"))
                }),
            None => Ok(Vec::new()),
        }
    }
}

/// Run `cmd` to completion, discarding stdout. A non-zero exit becomes `ExternalToolError` carrying
/// the exit code and stderr text.
pub(crate) fn run_tool(mut cmd: Command, tool: &str) -> ExplainerResult<()> {
    tracing::debug!(?cmd, "running {tool}");
    let out = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ExplainerError::ExternalTool {
            tool: tool.to_string(),
            code: None,
            stderr: format!("failed to spawn {tool} (is it installed and on PATH?): {e}"),
        })?;
    if !out.status.success() {
        return Err(ExplainerError::external_tool(
            tool,
            out.status.code(),
            &out.stderr,
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/media/mod.rs"]
mod tests;
