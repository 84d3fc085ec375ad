//! The errors that can occur.

use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// An error occurred while running the runtime.
    #[error("An error occurred while running the runtime: {0}")]
    Runtime(#[from] tokio::task::JoinError),
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),

    /// An error occurred while running a command.
    #[error("Failed to execute command: {0}")]
    Command(String),
    /// The process was interrupted by the user.
    #[error("The download was cancelled by the user")]
    Cancelled,
    /// An error occurred due to a timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    /// A required executable could not be located.
    #[error("Executable not found: {0}")]
    NotFound(String),
    /// The engine configuration was rejected before use.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
    /// An error occurred manipulating a path.
    #[error("An invalid path was provided: {0}")]
    Path(String),
}

impl Error {
    /// Whether this error comes from a user interrupt rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
