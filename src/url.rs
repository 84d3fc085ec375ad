//! Checks on the URLs handed to the downloader.

use regex::Regex;
use std::sync::LazyLock;

static SITE_HOST: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[a-z][a-z0-9+.-]*://)?(?:[a-z0-9-]+\.)*(?:youtube\.com|youtu\.be|youtube-nocookie\.com)(?::\d+)?(?:[/?#]|$)",
    )
    .ok()
});

/// Whether the URL points at the video site (including its short and embed hosts).
pub fn is_site_url(url: &str) -> bool {
    SITE_HOST
        .as_ref()
        .is_some_and(|re| re.is_match(url.trim()))
}

/// Whether the URL should be treated as a playlist when no flag says so.
///
/// This is a plain substring test, kept for compatibility: a video URL that
/// merely mentions "playlist" in a query parameter is treated as a playlist too.
pub fn looks_like_playlist(url: &str) -> bool {
    url.to_ascii_lowercase().contains("playlist")
}
