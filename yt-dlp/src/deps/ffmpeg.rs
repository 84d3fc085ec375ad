//! Detection of the optional ffmpeg transcoder.

use crate::utils;
use crate::utils::platform::Platform;
use std::path::{Path, PathBuf};

/// Locates ffmpeg, preferring an explicit path over `PATH`.
///
/// An explicit path that is not executable counts as absent rather than falling
/// back to `PATH`, so a stale configuration is noticed.
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) if utils::is_executable(path) => Some(path.to_path_buf()),
        Some(_path) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Configured ffmpeg {:?} is not executable", _path);

            None
        }
        None => utils::find_in_path("ffmpeg"),
    }
}

/// Installation instructions for ffmpeg on the given platform.
pub fn install_hints(platform: &Platform) -> Vec<&'static str> {
    match platform {
        Platform::Mac => vec!["brew install ffmpeg"],
        Platform::Linux => vec![
            "sudo apt install ffmpeg",
            "sudo dnf install ffmpeg",
            "sudo pacman -S ffmpeg",
        ],
        Platform::Windows => vec![
            "winget install ffmpeg",
            "or download a build from https://ffmpeg.org/download.html",
        ],
        Platform::Unknown(_) => vec!["download a build from https://ffmpeg.org/download.html"],
    }
}
