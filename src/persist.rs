//! Disk I/O helpers: make sure the backing file exists, read it back, and
//! write a full table over it.
//!
//! The default [`WriteMode::Overwrite`] truncates and rewrites the file in
//! place, so a crash mid-write can leave a torn file. [`WriteMode::Atomic`]
//! writes `<path>.tmp` and renames it over the target, which is close to
//! atomic on most local file systems (no guarantees on FAT32 or network
//! shares).

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// How a table gets written to its backing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Truncate and rewrite the file in place.
    #[default]
    Overwrite,
    /// Write a sibling temp file, then rename it over the target.
    Atomic,
}

impl std::str::FromStr for WriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(WriteMode::Overwrite),
            "atomic" => Ok(WriteMode::Atomic),
            other => Err(Error::Validation(format!("unknown write mode: {other}"))),
        }
    }
}

/// Create `path` (and its parent directories) as an empty file if it does
/// not exist yet. Existing content is left alone.
pub fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(drop)
        .map_err(Error::from)
}

/// Read the whole backing file.
pub fn load(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::Io(format!("failed to read {}: {e}", path.display())))
}

/// Replace the content of `path` with `bytes` in full.
pub fn write(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<()> {
    match mode {
        WriteMode::Overwrite => std::fs::write(path, bytes)
            .map_err(|e| Error::Io(format!("failed to write {}: {e}", path.display()))),
        WriteMode::Atomic => atomic_write(path, bytes),
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| Error::Io(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::Io(e.to_string()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("db");
    path.with_extension(format!("{ext}.tmp"))
}
