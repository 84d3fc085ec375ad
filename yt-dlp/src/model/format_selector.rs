//! Format selector expressions for audio and video downloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents video quality preferences for format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoQuality {
    /// Best available video quality
    Best,
    /// Worst available video quality, without any codec preference
    Worst,
    /// Best video whose height does not exceed the given number of pixels
    MaxHeight(u32),
}

/// Represents codec preferences for video format selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoCodecPreference {
    /// Prefer VP9 codec
    VP9,
    /// Prefer AVC1/H.264 codec
    AVC1,
    /// Prefer AV01/AV1 codec
    AV1,
    /// Custom codec prefix
    Custom(String),
    /// No specific codec preference
    Any,
}

impl VideoCodecPreference {
    /// The `[vcodec^=...]` filter for this preference, if any.
    pub fn filter(&self) -> Option<String> {
        let prefix = match self {
            VideoCodecPreference::VP9 => "vp9",
            VideoCodecPreference::AVC1 => "avc",
            VideoCodecPreference::AV1 => "av01",
            VideoCodecPreference::Custom(custom) => custom.as_str(),
            VideoCodecPreference::Any => return None,
        };

        Some(format!("[vcodec^={}]", prefix))
    }
}

/// A format selector expression, as understood by `yt-dlp -f`.
///
/// Selectors are only built through the constructors below, so every value handed
/// to the engine comes from a known quality.
///
/// # Examples
///
/// ```rust
/// # use ytdlp_engine::model::format_selector::{FormatSelector, VideoCodecPreference, VideoQuality};
/// let selector = FormatSelector::video(VideoQuality::MaxHeight(720), &VideoCodecPreference::AVC1);
/// assert_eq!(
///     selector.as_str(),
///     "bestvideo[ext=mp4][height<=720][vcodec^=avc]+bestaudio[ext=m4a]/best[height<=720]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatSelector(String);

impl FormatSelector {
    /// The best audio-only stream, falling back to the best combined stream.
    pub fn audio() -> Self {
        Self(String::from("bestaudio/best"))
    }

    /// A video selector for the given quality.
    ///
    /// `Best` and `MaxHeight` prefer an mp4 video stream with the given codec merged
    /// with an m4a audio stream, and fall back to the best single-file format (bounded
    /// by the same height, if any). `Worst` asks for the worst combined format.
    ///
    /// # Arguments
    ///
    /// * `quality` - The requested quality.
    /// * `codec` - The preferred video codec for the merged pair.
    pub fn video(quality: VideoQuality, codec: &VideoCodecPreference) -> Self {
        let codec = codec.filter().unwrap_or_default();

        match quality {
            VideoQuality::Best => Self(format!(
                "bestvideo[ext=mp4]{}+bestaudio[ext=m4a]/best",
                codec
            )),
            VideoQuality::Worst => Self(String::from("worst")),
            VideoQuality::MaxHeight(height) => Self(format!(
                "bestvideo[ext=mp4][height<={height}]{codec}+bestaudio[ext=m4a]/best[height<={height}]"
            )),
        }
    }

    /// Whether the selector may merge separate video and audio streams.
    pub fn merges(&self) -> bool {
        self.0.contains('+')
    }

    /// The raw selector expression.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_prefers_avc_mp4_with_m4a() {
        let selector = FormatSelector::video(VideoQuality::Best, &VideoCodecPreference::AVC1);

        assert_eq!(
            selector.as_str(),
            "bestvideo[ext=mp4][vcodec^=avc]+bestaudio[ext=m4a]/best"
        );
        assert!(selector.merges());
    }

    #[test]
    fn worst_has_no_codec_preference() {
        let selector = FormatSelector::video(VideoQuality::Worst, &VideoCodecPreference::AVC1);

        assert_eq!(selector.as_str(), "worst");
        assert!(!selector.merges());
    }

    #[test]
    fn heights_bound_both_alternatives() {
        for height in [144, 240, 360, 480, 720, 1080, 1440, 2160] {
            let selector =
                FormatSelector::video(VideoQuality::MaxHeight(height), &VideoCodecPreference::AVC1);
            let bound = format!("[height<={height}]");

            assert_eq!(selector.as_str().matches(&bound).count(), 2, "{selector}");
            assert!(selector.as_str().ends_with(&format!("/best{bound}")));
        }
    }

    #[test]
    fn any_codec_adds_no_filter() {
        let selector = FormatSelector::video(VideoQuality::Best, &VideoCodecPreference::Any);

        assert_eq!(selector.as_str(), "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best");
    }

    #[test]
    fn audio_selector_falls_back_to_best() {
        assert_eq!(FormatSelector::audio().as_str(), "bestaudio/best");
    }
}
