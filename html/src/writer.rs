//! Writes generated pages to disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Writes an HTML page to the given path, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_html(path: &Path, content: &str) -> Result<()> {
    write_text(path, content).with_context(|| format!("Failed to write HTML: {}", path.display()))
}

/// Writes a text file (JSON, filled templates) to the given path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}
