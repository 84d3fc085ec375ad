//! A typed binding to the `yt-dlp` executable.
//!
//! The crate does not download anything itself. It renders an [`EngineConfig`]
//! into command-line arguments, runs `yt-dlp` through the [`Executor`], streams
//! its progress reports back to the caller, and reports the media files it wrote.
//!
//! The [`Engine`] trait is the seam between an orchestrator and the real process,
//! so callers can drive the same logic against a scripted engine in tests.

use crate::deps::Libraries;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::model::progress::{EngineLine, Progress, ProgressStatus};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

pub mod deps;
pub mod error;
pub mod executor;
pub mod model;
pub mod utils;

pub use model::EngineConfig;

/// The progress callback handed to an engine invocation.
pub type ProgressHook<'a> = dyn Fn(&Progress) + Send + Sync + 'a;

/// What a completed invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// The final paths of the media files written, in the order they were reported.
    pub files: Vec<PathBuf>,
    /// Set when some playlist entries failed but others were written.
    pub partial_failure: Option<String>,
}

/// Something that can carry out one download described by an [`EngineConfig`].
pub trait Engine {
    /// Runs one invocation for `url` and waits for it to finish.
    ///
    /// # Arguments
    ///
    /// * `url` - The page or playlist URL.
    /// * `config` - The invocation configuration.
    /// * `progress` - Called with every progress report.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::Cancelled`] when the user interrupted the
    /// invocation, and any other variant when the download itself failed.
    fn invoke(
        &self,
        url: &str,
        config: &EngineConfig,
        progress: &ProgressHook<'_>,
    ) -> impl Future<Output = Result<Invocation>> + Send;
}

/// The `yt-dlp` process engine.
///
/// # Examples
///
/// ```rust,no_run
/// # use ytdlp_engine::{Engine, YtDlp};
/// # use ytdlp_engine::deps::Libraries;
/// # use ytdlp_engine::model::EngineConfig;
/// # use ytdlp_engine::model::format_selector::FormatSelector;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = YtDlp::new(Libraries::detect(None, None)?);
/// let config = EngineConfig::new("downloads/%(title)s.%(ext)s", FormatSelector::audio());
///
/// let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
/// let invocation = engine.invoke(url, &config, &|_| {}).await?;
/// println!("Wrote {:?}", invocation.files);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct YtDlp {
    /// The located executables.
    pub libraries: Libraries,
    /// The timeout of a single invocation, if any.
    pub timeout: Option<Duration>,
}

impl fmt::Display for YtDlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "YtDlp({}, timeout={:?})", self.libraries, self.timeout)
    }
}

impl YtDlp {
    /// Creates an engine for the given executables, without a timeout.
    pub fn new(libraries: Libraries) -> Self {
        Self {
            libraries,
            timeout: None,
        }
    }

    /// Sets the timeout of a single invocation.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the version string reported by the executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the executable cannot be run.
    pub async fn version(&self) -> Result<String> {
        let executor = Executor {
            executable_path: self.libraries.youtube.clone(),
            timeout: Some(Duration::from_secs(30)),
            args: vec![String::from("--version")],
        };

        let output = executor.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// The complete argument list for one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn build_args(&self, url: &str, config: &EngineConfig) -> Result<Vec<String>> {
        let mut args = Vec::new();
        if let Some(ffmpeg) = &self.libraries.ffmpeg {
            args.push(String::from("--ffmpeg-location"));
            args.push(ffmpeg.display().to_string());
        }

        args.extend(config.to_args()?);
        args.push(String::from("--"));
        args.push(url.to_string());

        Ok(args)
    }
}

impl Engine for YtDlp {
    async fn invoke(
        &self,
        url: &str,
        config: &EngineConfig,
        progress: &ProgressHook<'_>,
    ) -> Result<Invocation> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Invoking yt-dlp for {} with {}", url, config);

        let executor = Executor {
            executable_path: self.libraries.youtube.clone(),
            timeout: self.timeout,
            args: self.build_args(url, config)?,
        };

        let mut files = Vec::new();
        let output = executor
            .execute_streaming(|line| match EngineLine::parse(line) {
                EngineLine::Progress(report) => progress(&report),
                EngineLine::File(path) => {
                    progress(&Progress::new(ProgressStatus::Finished));
                    files.push(path);
                }
                EngineLine::Other(_line) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!("yt-dlp: {}", _line);
                }
            })
            .await?;

        match output.into_result() {
            Ok(_) => Ok(Invocation {
                files,
                partial_failure: None,
            }),
            Err(Error::Command(message)) if config.ignore_errors && !files.is_empty() => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Some entries failed: {}", message);

                Ok(Invocation {
                    files,
                    partial_failure: Some(message),
                })
            }
            Err(e) => Err(e),
        }
    }
}
