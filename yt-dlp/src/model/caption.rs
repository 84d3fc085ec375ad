//! Subtitle-related models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subtitle file extensions the engine can write or convert to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    /// The Srt extension.
    Srt,
    /// The Vtt extension.
    Vtt,
    /// The Ass extension.
    Ass,
    /// The Lrc extension.
    Lrc,
    /// The JSON extension.
    Json3,
    /// The Ttml extension.
    Ttml,
}

impl Extension {
    /// The extension without the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Srt => "srt",
            Extension::Vtt => "vtt",
            Extension::Ass => "ass",
            Extension::Lrc => "lrc",
            Extension::Json3 => "json3",
            Extension::Ttml => "ttml",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subtitle part of an engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleOptions {
    /// Ordered language tags to accept. `None` lets the engine pick one itself.
    pub languages: Option<Vec<String>>,
    /// Also accept auto-generated subtitles when no manual ones exist.
    pub include_automatic: bool,
    /// The preferred subtitle format to fetch.
    pub format: Extension,
    /// Convert fetched subtitles to this format (needs ffmpeg).
    pub convert: Option<Extension>,
}

impl SubtitleOptions {
    /// Subtitles restricted to the given languages, in order of preference.
    pub fn preferred<I, S>(languages: I, format: Extension) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: Some(languages.into_iter().map(Into::into).collect()),
            include_automatic: true,
            format,
            convert: None,
        }
    }

    /// The same options without any language restriction.
    pub fn any_language(&self) -> Self {
        Self {
            languages: None,
            ..self.clone()
        }
    }

    /// Sets the conversion target.
    pub fn with_conversion(mut self, convert: Option<Extension>) -> Self {
        self.convert = convert;
        self
    }

    /// Renders the options as `yt-dlp` arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![String::from("--write-subs")];
        if self.include_automatic {
            args.push(String::from("--write-auto-subs"));
        }

        if let Some(languages) = &self.languages {
            args.push(String::from("--sub-langs"));
            args.push(languages.join(","));
        }

        args.push(String::from("--sub-format"));
        args.push(format!("{}/best", self.format));

        if let Some(convert) = self.convert {
            args.push(String::from("--convert-subs"));
            args.push(convert.to_string());
        }

        args
    }
}

/// Whether a language tag is safe to hand to `--sub-langs`.
pub fn is_valid_language(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_languages_keep_their_order() {
        let options = SubtitleOptions::preferred(["en", "zh-CN", "zh-TW", "zh"], Extension::Srt);
        let args = options.to_args();

        let position = args.iter().position(|a| a == "--sub-langs").unwrap();
        assert_eq!(args[position + 1], "en,zh-CN,zh-TW,zh");
        assert!(args.contains(&String::from("--write-auto-subs")));
        assert!(!args.iter().any(|a| a == "--all-subs"));
    }

    #[test]
    fn any_language_drops_the_restriction_only() {
        let options = SubtitleOptions::preferred(["en"], Extension::Srt)
            .with_conversion(Some(Extension::Srt))
            .any_language();
        let args = options.to_args();

        assert!(!args.contains(&String::from("--sub-langs")));
        assert!(args.contains(&String::from("--convert-subs")));
        assert!(args.contains(&String::from("srt/best")));
    }

    #[test]
    fn language_tags_are_checked() {
        assert!(is_valid_language("zh-TW"));
        assert!(is_valid_language("pt_BR"));
        assert!(!is_valid_language(""));
        assert!(!is_valid_language("en,all"));
        assert!(!is_valid_language("en us"));
    }
}
