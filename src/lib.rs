use {
    crate::orchestrator::DownloadOutcome,
    crate::progress::ProgressDisplay,
    crate::request::DownloadRequest,
    ytdlp_engine::Engine,
};

pub mod batch;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod request;
pub mod url;

pub use batch::{Batch, BatchReport};
pub use config::{FileConfig, Settings};
pub use error::{Error, ErrorKind, Result};
pub use orchestrator::Orchestrator;

/// Downloads one request while drawing its progress, and clears any bar an
/// interrupted or failed invocation left behind.
pub async fn download_one<E: Engine>(
    orchestrator: &Orchestrator<E>,
    request: &DownloadRequest,
    display: &ProgressDisplay,
) -> Result<DownloadOutcome> {
    let result = orchestrator
        .download(request, &|progress| display.update(progress))
        .await;
    display.clear();
    result
}

/// Runs a whole batch with the same progress display.
pub async fn download_batch<E: Engine>(
    orchestrator: &Orchestrator<E>,
    batch: &Batch,
    display: &ProgressDisplay,
) -> BatchReport {
    let report = batch
        .run(orchestrator, &|progress| display.update(progress))
        .await;
    display.clear();
    report
}
