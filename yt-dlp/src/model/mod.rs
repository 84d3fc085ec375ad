//! The models used to configure an invocation of 'yt-dlp'.
//!
//! [`EngineConfig`] is the typed counterpart of the engine's option set: output
//! template, format selector, subtitle options, merge container, post-processors
//! and error policy. It is validated before it is rendered to arguments.

use crate::error::{Error, Result};
use crate::model::caption::{SubtitleOptions, is_valid_language};
use crate::model::format_selector::FormatSelector;
use crate::model::progress::{FILE_PREFIX, PROGRESS_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod caption;
pub mod format_selector;
pub mod progress;

// Re-export format selectors for easier access
pub use format_selector::{VideoCodecPreference, VideoQuality};

/// The container used when separate video and audio streams are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// MPEG-4
    Mp4,
    /// Matroska
    Mkv,
    /// WebM
    Webm,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Mp4 => write!(f, "mp4"),
            Container::Mkv => write!(f, "mkv"),
            Container::Webm => write!(f, "webm"),
        }
    }
}

/// Target codec of an audio extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// MP3
    Mp3,
    /// AAC in an m4a container
    M4a,
    /// Opus
    Opus,
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCodec::Mp3 => write!(f, "mp3"),
            AudioCodec::M4a => write!(f, "m4a"),
            AudioCodec::Opus => write!(f, "opus"),
        }
    }
}

/// A post-processing step run by the engine after the download (needs ffmpeg).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostProcessor {
    /// Extract the audio track and transcode it.
    ExtractAudio {
        /// The target codec.
        codec: AudioCodec,
        /// The target bitrate in kbps.
        bitrate_kbps: u32,
    },
}

impl PostProcessor {
    fn to_args(&self) -> Vec<String> {
        match self {
            PostProcessor::ExtractAudio {
                codec,
                bitrate_kbps,
            } => vec![
                String::from("--extract-audio"),
                String::from("--audio-format"),
                codec.to_string(),
                String::from("--audio-quality"),
                format!("{}K", bitrate_kbps),
            ],
        }
    }
}

/// The full configuration of one engine invocation.
///
/// # Examples
///
/// ```rust
/// # use ytdlp_engine::model::EngineConfig;
/// # use ytdlp_engine::model::format_selector::FormatSelector;
/// let config = EngineConfig::new("downloads/%(title)s.%(ext)s", FormatSelector::audio());
/// let args = config.to_args().unwrap();
/// assert!(args.contains(&String::from("bestaudio/best")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The output path template, e.g. `downloads/%(title)s.%(ext)s`.
    pub output_template: String,
    /// The format selector expression.
    pub format: FormatSelector,
    /// Subtitle options, `None` to fetch no subtitles at all.
    pub subtitles: Option<SubtitleOptions>,
    /// The container used when streams are merged.
    pub merge_container: Option<Container>,
    /// Post-processing steps.
    pub postprocessors: Vec<PostProcessor>,
    /// Keep going when one entry of a playlist fails.
    pub ignore_errors: bool,
    /// Fetch side files only, never the media itself.
    pub skip_media: bool,
    /// Follow playlist URLs instead of only the referenced video.
    pub playlist: bool,
}

impl EngineConfig {
    /// Creates a configuration with the given template and format, and nothing else.
    pub fn new(output_template: impl Into<String>, format: FormatSelector) -> Self {
        Self {
            output_template: output_template.into(),
            format,
            subtitles: None,
            merge_container: None,
            postprocessors: Vec::new(),
            ignore_errors: false,
            skip_media: false,
            playlist: false,
        }
    }

    /// Checks the configuration for combinations the engine would misinterpret.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] on an empty output template, on `skip_media`
    /// without subtitles, on an empty or malformed language list, or on a zero bitrate.
    pub fn validate(&self) -> Result<()> {
        if self.output_template.trim().is_empty() {
            return Err(Error::InvalidConfig(String::from(
                "the output template is empty",
            )));
        }

        if self.skip_media && self.subtitles.is_none() {
            return Err(Error::InvalidConfig(String::from(
                "skipping the media without requesting subtitles would fetch nothing",
            )));
        }

        if let Some(languages) = self.subtitles.as_ref().and_then(|s| s.languages.as_ref()) {
            if languages.is_empty() {
                return Err(Error::InvalidConfig(String::from(
                    "the subtitle language list is empty",
                )));
            }

            if let Some(bad) = languages.iter().find(|l| !is_valid_language(l)) {
                return Err(Error::InvalidConfig(format!(
                    "invalid subtitle language tag {:?}",
                    bad
                )));
            }
        }

        for postprocessor in &self.postprocessors {
            let PostProcessor::ExtractAudio { bitrate_kbps, .. } = postprocessor;
            if *bitrate_kbps == 0 {
                return Err(Error::InvalidConfig(String::from(
                    "the audio bitrate must be positive",
                )));
            }
        }

        Ok(())
    }

    /// Validates the configuration and renders it as `yt-dlp` arguments, without the URL.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::validate`].
    pub fn to_args(&self) -> Result<Vec<String>> {
        self.validate()?;

        let mut args = vec![
            String::from("--output"),
            self.output_template.clone(),
            String::from("--format"),
            self.format.to_string(),
        ];

        if let Some(container) = self.merge_container {
            args.push(String::from("--merge-output-format"));
            args.push(container.to_string());
        }

        for postprocessor in &self.postprocessors {
            args.extend(postprocessor.to_args());
        }

        if let Some(subtitles) = &self.subtitles {
            args.extend(subtitles.to_args());
        }

        if self.ignore_errors {
            args.push(String::from("--ignore-errors"));
        }

        args.push(String::from(if self.playlist {
            "--yes-playlist"
        } else {
            "--no-playlist"
        }));

        if self.skip_media {
            args.push(String::from("--skip-download"));
        } else {
            args.push(String::from("--print"));
            args.push(format!("after_move:{}%(filepath)s", FILE_PREFIX));
        }

        args.extend([
            String::from("--no-simulate"),
            String::from("--newline"),
            String::from("--progress"),
            String::from("--progress-template"),
            format!("download:{}%(progress)j", PROGRESS_PREFIX),
        ]);

        Ok(args)
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EngineConfig(format={}, subtitles={}, skip_media={})",
            self.format,
            self.subtitles.is_some(),
            self.skip_media
        )
    }
}
