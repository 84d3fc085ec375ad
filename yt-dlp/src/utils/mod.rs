//! Utility functions shared by the engine binding.

use std::path::{Path, PathBuf};

pub mod file_system;
pub mod platform;

/// Returns the platform-specific file name of an executable.
///
/// # Arguments
///
/// * `name` - The bare executable name, e.g. `yt-dlp`.
pub fn find_executable(name: impl AsRef<str>) -> String {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            format!("{}.exe", name.as_ref())
        } else {
            name.as_ref().to_string()
        }
    }
}

/// Looks an executable up in the directories of the `PATH` environment variable.
///
/// # Arguments
///
/// * `name` - The bare executable name, e.g. `ffmpeg`.
pub fn find_in_path(name: impl AsRef<str>) -> Option<PathBuf> {
    let file_name = find_executable(name);
    let paths = std::env::var_os("PATH")?;

    std::env::split_paths(&paths)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| is_executable(candidate))
}

/// Whether the path points to a file that can be executed.
pub fn is_executable(path: impl AsRef<Path>) -> bool {
    let Ok(metadata) = std::fs::metadata(path.as_ref()) else {
        return false;
    };

    cfg_if::cfg_if! {
        if #[cfg(unix)] {
            use std::os::unix::fs::PermissionsExt;
            metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
        } else {
            metadata.is_file()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn finds_shell_in_path() {
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("definitely-not-an-installed-tool-4242").is_none());
    }

    #[test]
    fn plain_files_are_not_executable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("yt-dlp");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();

        assert!(!is_executable(&file));
        assert!(!is_executable(dir.path()));
    }
}
