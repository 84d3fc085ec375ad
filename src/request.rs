//! The immutable description of one download.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use ytdlp_engine::model::VideoQuality;

/// Lowest height accepted as an explicit quality.
pub const MIN_HEIGHT: u32 = 144;
/// Highest height accepted as an explicit quality.
pub const MAX_HEIGHT: u32 = 4320;

/// The requested video quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Best,
    Worst,
    /// Best stream no taller than this many pixels.
    Height(u32),
}

impl FromStr for Quality {
    type Err = Error;

    /// Accepts `best`, `worst`, and heights written `720p` or `720`.
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "best" => return Ok(Quality::Best),
            "worst" => return Ok(Quality::Worst),
            _ => {}
        }

        let digits = value.strip_suffix('p').unwrap_or(&value);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidQuality(s.to_string()));
        }

        match digits.parse::<u32>() {
            Ok(height) if (MIN_HEIGHT..=MAX_HEIGHT).contains(&height) => {
                Ok(Quality::Height(height))
            }
            _ => Err(Error::InvalidQuality(s.to_string())),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Best => write!(f, "best"),
            Quality::Worst => write!(f, "worst"),
            Quality::Height(height) => write!(f, "{}p", height),
        }
    }
}

impl From<Quality> for VideoQuality {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Best => VideoQuality::Best,
            Quality::Worst => VideoQuality::Worst,
            Quality::Height(height) => VideoQuality::MaxHeight(height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    source_url: String,
    output_directory: PathBuf,
    quality: Quality,
    audio_only: bool,
    is_playlist: bool,
}

impl DownloadRequest {
    /// Builds a request from a textual quality.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuality`] when `quality` is not recognised, before
    /// anything reaches the engine.
    pub fn new(
        source_url: impl Into<String>,
        output_directory: impl Into<PathBuf>,
        quality: &str,
        audio_only: bool,
        is_playlist: bool,
    ) -> Result<Self> {
        Ok(Self::with_quality(
            source_url,
            output_directory,
            quality.parse()?,
            audio_only,
            is_playlist,
        ))
    }

    pub fn with_quality(
        source_url: impl Into<String>,
        output_directory: impl Into<PathBuf>,
        quality: Quality,
        audio_only: bool,
        is_playlist: bool,
    ) -> Self {
        Self {
            source_url: source_url.into().trim().to_string(),
            output_directory: output_directory.into(),
            quality,
            audio_only,
            is_playlist,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn audio_only(&self) -> bool {
        self.audio_only
    }

    pub fn is_playlist(&self) -> bool {
        self.is_playlist
    }

    /// Where the engine writes files: one folder per playlist, flat otherwise.
    pub fn output_template(&self) -> String {
        let template = if self.is_playlist {
            self.output_directory
                .join("%(playlist)s")
                .join("%(title)s.%(ext)s")
        } else {
            self.output_directory.join("%(title)s.%(ext)s")
        };

        template.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_explicit_qualities() {
        assert_eq!("best".parse::<Quality>().unwrap(), Quality::Best);
        assert_eq!(" Worst ".parse::<Quality>().unwrap(), Quality::Worst);
        assert_eq!("1080p".parse::<Quality>().unwrap(), Quality::Height(1080));
        assert_eq!("240".parse::<Quality>().unwrap(), Quality::Height(240));
        assert_eq!("2160P".parse::<Quality>().unwrap(), Quality::Height(2160));
    }

    #[test]
    fn rejects_unknown_qualities() {
        for input in ["", "p", "high", "720i", "+720p", "-1p", "100p", "9000p", "1e3p"] {
            assert!(
                matches!(input.parse::<Quality>(), Err(Error::InvalidQuality(_))),
                "{input:?} was accepted"
            );
        }
    }

    #[test]
    fn display_round_trips_through_parse() {
        for quality in [Quality::Best, Quality::Worst, Quality::Height(480)] {
            assert_eq!(quality.to_string().parse::<Quality>().unwrap(), quality);
        }
    }

    #[test]
    fn invalid_quality_fails_construction() {
        let request = DownloadRequest::new("https://youtu.be/x", "out", "ultra", false, false);

        assert!(matches!(request, Err(Error::InvalidQuality(q)) if q == "ultra"));
    }

    #[test]
    fn playlist_requests_get_a_folder_per_playlist() {
        let single = DownloadRequest::with_quality("u", "out", Quality::Best, false, false);
        let list = DownloadRequest::with_quality("u", "out", Quality::Best, false, true);

        assert_eq!(
            single.output_template(),
            Path::new("out").join("%(title)s.%(ext)s").display().to_string()
        );
        assert_eq!(
            list.output_template(),
            Path::new("out")
                .join("%(playlist)s")
                .join("%(title)s.%(ext)s")
                .display()
                .to_string()
        );
    }
}
