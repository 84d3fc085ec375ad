//! Format and subtitle policy, and the one-or-two invocation protocol around the engine.

use crate::config::Settings;
use crate::error::{Error, ErrorKind, Result};
use crate::request::DownloadRequest;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use ytdlp_engine::model::caption::{Extension, SubtitleOptions};
use ytdlp_engine::model::format_selector::{FormatSelector, VideoCodecPreference};
use ytdlp_engine::model::{AudioCodec, Container, PostProcessor};
use ytdlp_engine::utils::file_system;
use ytdlp_engine::{Engine, EngineConfig, ProgressHook};

const SUBTITLE_EXTENSION: Extension = Extension::Srt;

/// Which subtitles a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePolicy {
    pub preferred_languages: Vec<String>,
    /// Whether a relaxed, subtitle-only second invocation may follow.
    pub fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub succeeded: bool,
    pub media_path: Option<PathBuf>,
    pub subtitle_path: Option<PathBuf>,
    pub error: Option<ErrorKind>,
    /// The engine's message when the download failed.
    pub message: Option<String>,
}

impl DownloadOutcome {
    fn failed(error: Error) -> Self {
        Self {
            succeeded: false,
            error: Some(error.kind()),
            message: Some(error.to_string()),
            ..Self::default()
        }
    }
}

pub struct Orchestrator<E> {
    engine: E,
    settings: Settings,
}

impl<E: Engine> Orchestrator<E> {
    pub fn new(engine: E, settings: Settings) -> Self {
        Self { engine, settings }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Audio-only requests get no subtitles. Playlists get the preferred languages
    /// but no fallback pass.
    pub fn subtitle_policy(&self, request: &DownloadRequest) -> Option<SubtitlePolicy> {
        if request.audio_only() {
            return None;
        }

        Some(SubtitlePolicy {
            preferred_languages: self.settings.subtitle_languages.clone(),
            fallback: !request.is_playlist(),
        })
    }

    /// The configuration of the media invocation.
    pub fn primary_config(&self, request: &DownloadRequest) -> EngineConfig {
        let mut config = if request.audio_only() {
            let mut config = EngineConfig::new(request.output_template(), FormatSelector::audio());
            if self.settings.transcoder_available {
                config.postprocessors.push(PostProcessor::ExtractAudio {
                    codec: AudioCodec::Mp3,
                    bitrate_kbps: self.settings.audio_bitrate,
                });
            } else {
                debug!("No transcoder, keeping the delivered audio format");
            }
            config
        } else {
            let format =
                FormatSelector::video(request.quality().into(), &VideoCodecPreference::AVC1);
            let mut config = EngineConfig::new(request.output_template(), format);
            if config.format.merges() {
                config.merge_container = Some(Container::Mp4);
            }
            config
        };

        if let Some(policy) = self.subtitle_policy(request) {
            let convert = self
                .settings
                .transcoder_available
                .then_some(SUBTITLE_EXTENSION);
            config.subtitles = Some(
                SubtitleOptions::preferred(policy.preferred_languages, SUBTITLE_EXTENSION)
                    .with_conversion(convert),
            );
        }

        config.ignore_errors = true;
        config.playlist = request.is_playlist();
        config
    }

    /// The subtitle-only retry: no language restriction, no media.
    pub fn fallback_config(&self, primary: &EngineConfig) -> Option<EngineConfig> {
        let subtitles = primary.subtitles.as_ref()?.any_language();

        Some(EngineConfig {
            subtitles: Some(subtitles),
            skip_media: true,
            ..primary.clone()
        })
    }

    /// Downloads one request, then fetches a subtitle in any language if none of the
    /// preferred ones came down with the media.
    ///
    /// Engine failures end up in the returned outcome. A failure of the subtitle
    /// retry is only logged.
    ///
    /// # Errors
    ///
    /// Only [`Error::UserCancelled`], when the user interrupts either invocation.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        progress: &ProgressHook<'_>,
    ) -> Result<DownloadOutcome> {
        let dir = request.output_directory();
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            return Ok(DownloadOutcome::failed(Error::Io(e)));
        }

        let policy = self.subtitle_policy(request);
        let existing: HashSet<PathBuf> = match &policy {
            Some(_) => subtitle_files(dir).into_iter().collect(),
            None => HashSet::new(),
        };

        let primary = self.primary_config(request);
        info!("Downloading {} into {}", request.source_url(), dir.display());

        let invocation = match self
            .engine
            .invoke(request.source_url(), &primary, progress)
            .await
        {
            Ok(invocation) => invocation,
            Err(e) => {
                let error = Error::from(e);
                if error.kind() == ErrorKind::UserCancelled {
                    return Err(error);
                }
                return Ok(DownloadOutcome::failed(error));
            }
        };

        if let Some(message) = &invocation.partial_failure {
            warn!("Some items could not be downloaded: {}", message);
        }

        let mut outcome = DownloadOutcome {
            succeeded: true,
            media_path: invocation.files.last().cloned(),
            ..DownloadOutcome::default()
        };

        let Some(policy) = policy else {
            return Ok(outcome);
        };

        outcome.subtitle_path = find_subtitle(dir, &existing, &invocation.files, &policy);
        if outcome.subtitle_path.is_some() || !policy.fallback {
            return Ok(outcome);
        }

        let Some(fallback) = self.fallback_config(&primary) else {
            return Ok(outcome);
        };

        warn!(
            "No subtitle in {}, trying any available language",
            policy.preferred_languages.join(", ")
        );

        match self
            .engine
            .invoke(request.source_url(), &fallback, progress)
            .await
        {
            Ok(_) => {
                outcome.subtitle_path = find_subtitle(dir, &existing, &invocation.files, &policy);
                if outcome.subtitle_path.is_none() {
                    info!("No subtitle available for {}", request.source_url());
                }
            }
            Err(e) if e.is_cancelled() => return Err(Error::UserCancelled),
            Err(e) => warn!("Subtitle fallback failed, continuing without subtitles: {}", e),
        }

        Ok(outcome)
    }
}

fn subtitle_files(dir: &Path) -> Vec<PathBuf> {
    file_system::files_with_extension(dir, SUBTITLE_EXTENSION.as_str()).unwrap_or_else(|e| {
        warn!("Cannot scan {} for subtitles: {}", dir.display(), e);
        Vec::new()
    })
}

/// A subtitle counts when it appeared during this request, or when it belongs to one
/// of the media files the engine reported. Preferred languages win over the rest.
fn find_subtitle(
    dir: &Path,
    existing: &HashSet<PathBuf>,
    media: &[PathBuf],
    policy: &SubtitlePolicy,
) -> Option<PathBuf> {
    let stems: Vec<String> = media
        .iter()
        .filter_map(|m| file_system::try_without_extension(m).ok())
        .map(|stem| format!("{}.", stem))
        .collect();

    let mut dirs = vec![dir.to_path_buf()];
    for parent in media.iter().filter_map(|m| m.parent()) {
        if !dirs.iter().any(|d| d == parent) {
            dirs.push(parent.to_path_buf());
        }
    }

    let candidates: Vec<PathBuf> = dirs
        .iter()
        .flat_map(|d| subtitle_files(d))
        .filter(|file| {
            let name = file_system::try_name(file).unwrap_or_default();
            !existing.contains(file) || stems.iter().any(|stem| name.starts_with(stem.as_str()))
        })
        .collect();

    policy
        .preferred_languages
        .iter()
        .find_map(|language| {
            let suffix = format!(".{}.{}", language, SUBTITLE_EXTENSION);
            candidates
                .iter()
                .find(|file| file_system::try_name(file).is_ok_and(|n| n.ends_with(&suffix)))
        })
        .or_else(|| candidates.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Quality;
    use ytdlp_engine::Invocation;

    struct Unused;

    impl Engine for Unused {
        async fn invoke(
            &self,
            _url: &str,
            _config: &EngineConfig,
            _progress: &ProgressHook<'_>,
        ) -> ytdlp_engine::error::Result<Invocation> {
            Ok(Invocation::default())
        }
    }

    fn orchestrator(transcoder: bool) -> Orchestrator<Unused> {
        Orchestrator::new(Unused, Settings::new("out", transcoder))
    }

    fn request(quality: Quality, audio_only: bool, playlist: bool) -> DownloadRequest {
        DownloadRequest::with_quality("https://youtu.be/x", "out", quality, audio_only, playlist)
    }

    #[test]
    fn audio_requests_never_carry_subtitles() {
        for transcoder in [true, false] {
            let orchestrator = orchestrator(transcoder);
            let request = request(Quality::Best, true, false);
            let config = orchestrator.primary_config(&request);

            assert_eq!(config.format.as_str(), "bestaudio/best");
            assert!(config.subtitles.is_none());
            assert!(orchestrator.subtitle_policy(&request).is_none());
            assert!(orchestrator.fallback_config(&config).is_none());
            assert!(!config.to_args().unwrap().iter().any(|a| a.contains("sub")));
        }
    }

    #[test]
    fn mp3_extraction_needs_a_transcoder() {
        let request = request(Quality::Best, true, false);

        let with = orchestrator(true).primary_config(&request);
        assert_eq!(
            with.postprocessors,
            vec![PostProcessor::ExtractAudio {
                codec: AudioCodec::Mp3,
                bitrate_kbps: 192
            }]
        );

        let without = orchestrator(false).primary_config(&request);
        assert!(without.postprocessors.is_empty());
        assert!(without.merge_container.is_none());
    }

    #[test]
    fn explicit_heights_are_bounded() {
        let orchestrator = orchestrator(true);
        for height in (144..=2160).step_by(8) {
            let bounded = request(Quality::Height(height), false, false);
            let config = orchestrator.primary_config(&bounded);

            assert!(config.format.as_str().contains(&format!("[height<={height}]")));
            assert!(config.format.as_str().ends_with(&format!("/best[height<={height}]")));
            assert_eq!(config.merge_container, Some(Container::Mp4));
        }
    }

    #[test]
    fn worst_is_not_merged() {
        let config = orchestrator(true).primary_config(&request(Quality::Worst, false, false));

        assert_eq!(config.format.as_str(), "worst");
        assert_eq!(config.merge_container, None);
        assert!(config.subtitles.is_some());
    }

    #[test]
    fn video_requests_prefer_languages_then_relax() {
        let orchestrator = orchestrator(true);
        let primary = orchestrator.primary_config(&request(Quality::Best, false, false));
        let subtitles = primary.subtitles.clone().unwrap();

        assert_eq!(
            subtitles.languages,
            Some(vec![
                String::from("en"),
                String::from("zh-CN"),
                String::from("zh-TW"),
                String::from("zh")
            ])
        );
        assert!(subtitles.include_automatic);
        assert_eq!(subtitles.format, Extension::Srt);
        assert_eq!(subtitles.convert, Some(Extension::Srt));
        assert!(!primary.skip_media);

        let fallback = orchestrator.fallback_config(&primary).unwrap();
        assert!(fallback.skip_media);
        assert_eq!(fallback.subtitles.as_ref().unwrap().languages, None);
        assert_eq!(fallback.format, primary.format);
        assert_eq!(fallback.output_template, primary.output_template);
    }

    #[test]
    fn playlists_skip_the_fallback() {
        let orchestrator = orchestrator(false);
        let request = request(Quality::Best, false, true);

        assert!(!orchestrator.subtitle_policy(&request).unwrap().fallback);
        assert!(orchestrator.primary_config(&request).playlist);
    }

    #[test]
    fn picks_new_or_matching_subtitles_in_preference_order() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("Older.en.srt");
        std::fs::write(&old, "").unwrap();
        let existing: HashSet<PathBuf> = [old.clone()].into_iter().collect();
        let policy = SubtitlePolicy {
            preferred_languages: vec![String::from("en"), String::from("zh")],
            fallback: true,
        };

        assert_eq!(find_subtitle(dir.path(), &existing, &[], &policy), None);

        let zh = dir.path().join("Clip.zh.srt");
        std::fs::write(&zh, "").unwrap();
        assert_eq!(find_subtitle(dir.path(), &existing, &[], &policy), Some(zh.clone()));

        let en = dir.path().join("Clip.en.srt");
        std::fs::write(&en, "").unwrap();
        assert_eq!(find_subtitle(dir.path(), &existing, &[], &policy), Some(en));

        let media = [dir.path().join("Older.mp4")];
        let existing: HashSet<PathBuf> = file_system::files_with_extension(dir.path(), "srt")
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(find_subtitle(dir.path(), &existing, &media, &policy), Some(old));
    }
}
