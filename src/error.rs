//! Errors raised by the download orchestration.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid quality {0:?}, expected best, worst or a height such as 720p")]
    InvalidQuality(String),
    #[error("Cannot read URL listing {}: {source}", path.display())]
    InvalidListingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No URL found in {}", .0.display())]
    EmptyListing(PathBuf),
    #[error("Download failed: {0}")]
    EngineFailure(String),
    #[error("Download cancelled by the user")]
    UserCancelled,

    #[error("An IO error occurred: {0}")]
    Io(#[from] std::io::Error),
}

/// The flat error taxonomy recorded in a [`crate::orchestrator::DownloadOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidQuality,
    InvalidListingFile,
    EmptyListing,
    EngineFailure,
    UserCancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidQuality(_) => ErrorKind::InvalidQuality,
            Error::InvalidListingFile { .. } => ErrorKind::InvalidListingFile,
            Error::EmptyListing(_) => ErrorKind::EmptyListing,
            Error::UserCancelled => ErrorKind::UserCancelled,
            Error::EngineFailure(_) | Error::Io(_) => ErrorKind::EngineFailure,
        }
    }
}

impl From<ytdlp_engine::error::Error> for Error {
    fn from(e: ytdlp_engine::error::Error) -> Self {
        match e {
            ytdlp_engine::error::Error::Cancelled => Error::UserCancelled,
            other => Error::EngineFailure(other.to_string()),
        }
    }
}
