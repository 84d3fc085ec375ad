//! Progress reports and other structured lines printed by the engine.

use serde::Deserialize;
use std::path::PathBuf;

/// The prefix of progress lines, as requested through `--progress-template`.
pub const PROGRESS_PREFIX: &str = "[progress] ";
/// The prefix of final file lines, as requested through `--print`.
pub const FILE_PREFIX: &str = "[file] ";

/// The state of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Bytes are being transferred.
    Downloading,
    /// The transfer finished; post-processing may follow.
    Finished,
    /// The transfer failed.
    Error,
    /// Any status this crate does not know about.
    #[serde(other)]
    Other,
}

/// A progress report for the current transfer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Progress {
    /// The state of the transfer.
    pub status: ProgressStatus,
    /// Bytes downloaded so far.
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    /// Total size, when the server reports it.
    #[serde(default)]
    pub total_bytes: Option<f64>,
    /// Estimated total size, for fragmented streams.
    #[serde(default)]
    pub total_bytes_estimate: Option<f64>,
    /// Speed in bytes per second.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Estimated seconds left.
    #[serde(default)]
    pub eta: Option<f64>,
    /// The file being written.
    #[serde(default)]
    pub filename: Option<String>,
}

impl Progress {
    /// A report with the given status and no metrics.
    pub fn new(status: ProgressStatus) -> Self {
        Self {
            status,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimate: None,
            speed: None,
            eta: None,
            filename: None,
        }
    }

    /// The completion percentage, if the total size is known.
    pub fn percent(&self) -> Option<f64> {
        let total = self.total_bytes.or(self.total_bytes_estimate)?;
        let downloaded = self.downloaded_bytes?;
        if total <= 0.0 {
            return None;
        }

        Some((downloaded / total * 100.0).clamp(0.0, 100.0))
    }
}

/// One line of engine stdout.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineLine {
    /// A progress report.
    Progress(Progress),
    /// The final path of a written media file.
    File(PathBuf),
    /// Anything else.
    Other(String),
}

impl EngineLine {
    /// Classifies a stdout line. Malformed progress lines are kept as [`EngineLine::Other`].
    pub fn parse(line: &str) -> Self {
        if let Some(json) = line.strip_prefix(PROGRESS_PREFIX) {
            return match serde_json::from_str::<Progress>(json) {
                Ok(progress) => EngineLine::Progress(progress),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Unreadable progress line {:?}: {}", line, _e);

                    EngineLine::Other(line.to_string())
                }
            };
        }

        if let Some(path) = line.strip_prefix(FILE_PREFIX) {
            let path = path.trim();
            if !path.is_empty() && path != "NA" {
                return EngineLine::File(PathBuf::from(path));
            }
        }

        EngineLine::Other(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_downloading_progress() {
        let line = r#"[progress] {"status": "downloading", "downloaded_bytes": 512, "total_bytes": 2048, "speed": 1048576.5, "eta": 3, "_percent_str": " 25.0%"}"#;

        match EngineLine::parse(line) {
            EngineLine::Progress(progress) => {
                assert_eq!(progress.status, ProgressStatus::Downloading);
                assert_eq!(progress.percent(), Some(25.0));
                assert_eq!(progress.eta, Some(3.0));
            }
            other => panic!("unexpected line: {other:?}"),
        }
    }

    #[test]
    fn uses_estimate_when_total_is_null() {
        let line = r#"[progress] {"status": "downloading", "downloaded_bytes": 50, "total_bytes": null, "total_bytes_estimate": 200.0}"#;

        let EngineLine::Progress(progress) = EngineLine::parse(line) else {
            panic!("expected progress");
        };
        assert_eq!(progress.percent(), Some(25.0));
    }

    #[test]
    fn unknown_status_and_missing_metrics_are_tolerated() {
        let EngineLine::Progress(progress) =
            EngineLine::parse(r#"[progress] {"status": "postprocessing"}"#)
        else {
            panic!("expected progress");
        };

        assert_eq!(progress.status, ProgressStatus::Other);
        assert_eq!(progress.percent(), None);
    }

    #[test]
    fn file_lines_carry_paths() {
        assert_eq!(
            EngineLine::parse("[file] /tmp/out/My.Video.mp4"),
            EngineLine::File(PathBuf::from("/tmp/out/My.Video.mp4"))
        );
        assert!(matches!(EngineLine::parse("[file] NA"), EngineLine::Other(_)));
    }

    #[test]
    fn garbage_is_other() {
        assert!(matches!(
            EngineLine::parse("[progress] {not json"),
            EngineLine::Other(_)
        ));
        assert!(matches!(
            EngineLine::parse("[youtube] abc: Downloading webpage"),
            EngineLine::Other(_)
        ));
    }
}
