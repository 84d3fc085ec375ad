//! Discovery of the executables the engine relies on.

use crate::error::{Error, Result};
use crate::utils;
use derive_more::Constructor;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod ffmpeg;

/// The located libraries.
///
/// # Examples
///
/// ```rust,no_run
/// # use ytdlp_engine::deps::Libraries;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let libraries = Libraries::detect(None, None)?;
/// println!("yt-dlp at {}", libraries.youtube.display());
/// # Ok(())
/// # }
/// ```
#[derive(Constructor, Clone, Debug, PartialEq, Eq)]
pub struct Libraries {
    /// The path to the yt-dlp binary.
    pub youtube: PathBuf,
    /// The path to the ffmpeg binary, when one is available.
    pub ffmpeg: Option<PathBuf>,
}

impl fmt::Display for Libraries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Libraries(yt-dlp={}, ffmpeg={})",
            self.youtube.display(),
            self.ffmpeg
                .as_deref()
                .map_or_else(|| String::from("none"), |p| p.display().to_string())
        )
    }
}

impl Libraries {
    /// Locates yt-dlp and ffmpeg, preferring the given paths over `PATH`.
    ///
    /// # Arguments
    ///
    /// * `youtube` - An explicit yt-dlp path, if configured.
    /// * `ffmpeg` - An explicit ffmpeg path, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when yt-dlp cannot be located. A missing ffmpeg is
    /// not an error, it only disables transcoding.
    pub fn detect(youtube: Option<&Path>, ffmpeg: Option<&Path>) -> Result<Self> {
        let youtube = match youtube {
            Some(path) if utils::is_executable(path) => path.to_path_buf(),
            Some(path) => return Err(Error::NotFound(path.display().to_string())),
            None => utils::find_in_path("yt-dlp")
                .ok_or_else(|| Error::NotFound(utils::find_executable("yt-dlp")))?,
        };

        let ffmpeg = ffmpeg::locate(ffmpeg);

        #[cfg(feature = "tracing")]
        tracing::debug!("Located yt-dlp at {:?}, ffmpeg at {:?}", youtube, ffmpeg);

        Ok(Self::new(youtube, ffmpeg))
    }

    /// Whether audio transcoding and subtitle conversion are possible.
    pub fn has_transcoder(&self) -> bool {
        self.ffmpeg.is_some()
    }
}
