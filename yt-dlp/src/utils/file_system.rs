//! Tools for working with the file system.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Returns the name of the given path.
pub fn try_name(path: impl AsRef<Path>) -> Result<String> {
    let name = path
        .as_ref()
        .file_name()
        .ok_or(Error::Path("Failed to get name".to_string()))?;
    let name = name
        .to_str()
        .ok_or(Error::Path("Failed to convert name".to_string()))?;

    Ok(name.to_string())
}

/// Returns the name of the given path without its last extension.
pub fn try_without_extension(path: impl AsRef<Path>) -> Result<String> {
    let stem = path
        .as_ref()
        .file_stem()
        .ok_or(Error::Path("Failed to get name".to_string()))?;
    let stem = stem
        .to_str()
        .ok_or(Error::Path("Failed to convert name".to_string()))?;

    Ok(stem.to_string())
}

/// Lists the files directly inside `dir` whose extension is `extension`
/// (case-insensitive), sorted by path. A missing directory yields an empty list.
///
/// # Arguments
///
/// * `dir` - The directory to scan, not recursively.
/// * `extension` - The extension without the leading dot.
pub fn files_with_extension(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::IO(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
