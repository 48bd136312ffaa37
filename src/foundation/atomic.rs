//! Temp-then-rename helpers shared by every stage that publishes a file.
//!
//! A [`PendingFile`] reserves a hidden sibling of the final path. Writers (usually a spawned
//! `ffmpeg`) fill the sibling; [`PendingFile::commit`] renames it over the final path. Dropping
//! an uncommitted `PendingFile` deletes the sibling, so a failed or interrupted stage never leaves
//! anything at the final path.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ExplainerError, ExplainerResult};

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ExplainerResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// A reserved temp file that becomes `final_path` on commit.
#[derive(Debug)]
pub struct PendingFile {
    temp: tempfile::TempPath,
    final_path: PathBuf,
}

impl PendingFile {
    /// Reserve a hidden temp sibling of `final_path`, keeping its extension so tools that sniff
    /// the container format from the file name still work.
    pub fn reserve(final_path: &Path) -> ExplainerResult<Self> {
        ensure_parent_dir(final_path)?;
        let dir = match final_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = final_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ExplainerError::validation(format!(
                    "output path '{}' has no file name",
                    final_path.display()
                ))
            })?;
        let suffix = final_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(&format!(".{stem}."))
            .suffix(&suffix)
            .tempfile_in(&dir)
            .with_context(|| format!("failed to create temp file in '{}'", dir.display()))?
            .into_temp_path();

        Ok(Self {
            temp,
            final_path: final_path.to_path_buf(),
        })
    }

    /// Path writers should fill.
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Path the file will occupy after [`PendingFile::commit`].
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Atomically move the temp file over the final path.
    pub fn commit(self) -> ExplainerResult<PathBuf> {
        let Self { temp, final_path } = self;
        temp.persist(&final_path).map_err(|e| {
            ExplainerError::Other(anyhow::Error::new(e.error).context(format!(
                "failed to move finished file into '{}'",
                final_path.display()
            )))
        })?;
        Ok(final_path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/atomic.rs"]
mod tests;
