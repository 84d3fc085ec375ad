//! The optional configuration file and the settings derived from it at start-up.

use crate::progress::Verbosity;
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use ytdlp_engine::model::caption::is_valid_language;

pub const APP_NAME: &str = "tubefetch";
pub const DEFAULT_OUTPUT_ROOT: &str = "./downloads";
pub const DEFAULT_LANGUAGES: [&str; 4] = ["en", "zh-CN", "zh-TW", "zh"];
pub const DEFAULT_AUDIO_BITRATE: u32 = 192;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The contents of `<config_dir>/tubefetch/config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub output_root: Option<PathBuf>,
    pub subtitle_languages: Option<Vec<String>>,
    pub audio_bitrate: Option<u32>,
    pub ytdlp_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub verbosity: Option<Verbosity>,
}

impl FileConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
    }

    /// Loads the file at the default location. A missing file is an empty config.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Run settings, computed once at process start and handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub subtitle_languages: Vec<String>,
    pub audio_bitrate: u32,
    pub transcoder_available: bool,
}

impl Settings {
    /// Settings with the built-in defaults for the given output directory.
    pub fn new(output_dir: impl Into<PathBuf>, transcoder_available: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            subtitle_languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE,
            transcoder_available,
        }
    }

    /// Merges the config file with the command-line override.
    ///
    /// Without an override the output directory is `<output_root>/<YYYY-MM-DD>` for `today`.
    pub fn resolve(
        file: &FileConfig,
        output_override: Option<PathBuf>,
        transcoder_available: bool,
        today: NaiveDate,
    ) -> Self {
        let output_dir = output_override.unwrap_or_else(|| {
            let root = file
                .output_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));
            dated_dir(&root, today)
        });

        let mut settings = Self::new(output_dir, transcoder_available);
        if let Some(languages) = &file.subtitle_languages {
            let valid = sanitize_languages(languages);
            if valid.is_empty() {
                warn!("No usable subtitle language in the config file, using the defaults");
            } else {
                settings.subtitle_languages = valid;
            }
        }

        match file.audio_bitrate {
            Some(0) => warn!("Ignoring audio_bitrate = 0 in the config file"),
            Some(bitrate) => settings.audio_bitrate = bitrate,
            None => {}
        }

        settings
    }
}

pub fn dated_dir(root: &Path, day: NaiveDate) -> PathBuf {
    root.join(day.format("%Y-%m-%d").to_string())
}

fn sanitize_languages(languages: &[String]) -> Vec<String> {
    let mut valid = Vec::new();
    for language in languages {
        let language = language.trim();
        if !is_valid_language(language) {
            warn!("Ignoring subtitle language {:?}", language);
        } else if !valid.iter().any(|l: &String| l == language) {
            valid.push(language.to_string());
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn defaults_to_a_dated_folder_under_downloads() {
        let settings = Settings::resolve(&FileConfig::default(), None, false, day());

        assert_eq!(settings.output_dir, Path::new("./downloads").join("2026-10-19"));
        assert_eq!(settings.subtitle_languages, vec!["en", "zh-CN", "zh-TW", "zh"]);
        assert_eq!(settings.audio_bitrate, 192);
    }

    #[test]
    fn override_beats_configured_root() {
        let file = FileConfig {
            output_root: Some(PathBuf::from("/media")),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(&file, Some(PathBuf::from("mine")), true, day());
        assert_eq!(settings.output_dir, PathBuf::from("mine"));

        let settings = Settings::resolve(&file, None, true, day());
        assert_eq!(settings.output_dir, Path::new("/media").join("2026-10-19"));
    }

    #[test]
    fn bad_languages_are_dropped() {
        let file = FileConfig {
            subtitle_languages: Some(vec![
                String::from(" ja "),
                String::from("en,all"),
                String::from("ja"),
            ]),
            audio_bitrate: Some(0),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(&file, None, false, day());
        assert_eq!(settings.subtitle_languages, vec!["ja"]);
        assert_eq!(settings.audio_bitrate, 192);
    }

    #[test]
    fn reads_toml_and_reports_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        assert_eq!(FileConfig::load_from(&path).unwrap(), FileConfig::default());

        fs::write(
            &path,
            "output_root = \"/srv/videos\"\nsubtitle_languages = [\"fr\"]\nverbosity = \"debug\"\n",
        )
        .unwrap();
        let file = FileConfig::load_from(&path).unwrap();
        assert_eq!(file.output_root, Some(PathBuf::from("/srv/videos")));
        assert_eq!(file.verbosity, Some(Verbosity::Debug));

        fs::write(&path, "output_root = [").unwrap();
        assert!(matches!(
            FileConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
