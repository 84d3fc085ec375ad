//! Sequential downloads driven by a URL listing.

use crate::error::{Error, Result};
use crate::orchestrator::Orchestrator;
use crate::request::{DownloadRequest, Quality};
use crate::url::looks_like_playlist;
use log::{error, info, warn};
use std::fs;
use std::path::Path;
use ytdlp_engine::{Engine, ProgressHook};

/// The URLs of a listing: one per line, blank lines and `#` comments skipped.
pub fn parse_listing(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Reads and parses a listing file.
///
/// # Errors
///
/// [`Error::InvalidListingFile`] when the file cannot be read, [`Error::EmptyListing`]
/// when it holds no URL.
pub fn read_listing(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| Error::InvalidListingFile {
        path: path.to_path_buf(),
        source,
    })?;

    let urls = parse_listing(&content);
    if urls.is_empty() {
        return Err(Error::EmptyListing(path.to_path_buf()));
    }

    Ok(urls)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Set when the user interrupted the batch.
    pub cancelled: bool,
    /// Items never attempted because of the interruption.
    pub skipped: usize,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

pub struct Batch {
    requests: Vec<DownloadRequest>,
}

impl Batch {
    /// Builds one request per URL, all sharing the same directory and quality.
    /// A URL is a playlist when `playlist` is set or when it looks like one.
    pub fn new(
        urls: Vec<String>,
        output_directory: &Path,
        quality: Quality,
        audio_only: bool,
        playlist: bool,
    ) -> Self {
        let requests = urls
            .into_iter()
            .map(|url| {
                let is_playlist = playlist || looks_like_playlist(&url);
                DownloadRequest::with_quality(
                    url,
                    output_directory,
                    quality,
                    audio_only,
                    is_playlist,
                )
            })
            .collect();

        Self { requests }
    }

    pub fn requests(&self) -> &[DownloadRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Runs the requests one after the other. Failures are counted and skipped over;
    /// an interrupt stops the batch and keeps the counts so far.
    pub async fn run<E: Engine>(
        &self,
        orchestrator: &Orchestrator<E>,
        progress: &ProgressHook<'_>,
    ) -> BatchReport {
        let total = self.requests.len();
        let mut report = BatchReport::default();

        for (index, request) in self.requests.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, request.source_url());

            match orchestrator.download(request, progress).await {
                Ok(outcome) if outcome.succeeded => report.succeeded += 1,
                Ok(outcome) => {
                    error!(
                        "[{}/{}] {}",
                        index + 1,
                        total,
                        outcome.message.as_deref().unwrap_or("download failed")
                    );
                    report.failed += 1;
                }
                Err(e) => {
                    warn!("[{}/{}] {}, stopping the batch", index + 1, total, e);
                    report.cancelled = true;
                    report.skipped = total - index - 1;
                    break;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let urls = parse_listing(
            "# my list\nhttps://youtu.be/a\n\n   \n  # indented comment\n  https://youtu.be/b  \r\n",
        );

        assert_eq!(urls, vec!["https://youtu.be/a", "https://youtu.be/b"]);
    }

    #[test]
    fn missing_file_is_invalid_listing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_listing(&dir.path().join("urls.txt")).unwrap_err();

        assert!(matches!(err, Error::InvalidListingFile { .. }));
    }

    #[test]
    fn comments_only_is_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        fs::write(&path, "# nothing yet\n\n").unwrap();

        assert!(matches!(read_listing(&path), Err(Error::EmptyListing(_))));
    }

    #[test]
    fn playlist_urls_are_detected_per_line() {
        let batch = Batch::new(
            vec![
                String::from("https://youtu.be/a"),
                String::from("https://www.youtube.com/playlist?list=PL1"),
            ],
            Path::new("out"),
            Quality::Best,
            false,
            false,
        );

        let playlists: Vec<bool> = batch.requests().iter().map(|r| r.is_playlist()).collect();
        assert_eq!(playlists, vec![false, true]);
        assert_eq!(batch.len(), 2);
    }
}
