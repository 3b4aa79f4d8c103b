use std::path::Path;
use std::fs;
use anyhow::{Result, Context};
use log::{debug, trace};

/// Create a directory if it doesn't exist
pub fn ensure_dir_exists(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    debug!("Creating directory: {}", dir.display());
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Read a file to string with better error handling
pub fn read_file_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read file {}", path.display()))
}

/// Write a string to a file, creating parent directories as needed.
///
/// The content goes to a sibling `.tmp` file which is then renamed over the
/// target; readers see either the old or the new content.
pub fn write_string_to_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    trace!("Writing {} bytes to {}", content.len(), tmp_path.display());
    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move {} to {}", tmp_path.display(), path.display()))
}
