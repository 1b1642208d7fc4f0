//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Notification store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Payload decode error: {0}")]
    PayloadDecode(#[from] plist::Error),

    #[error("Delivery rejected: status {status} {reason}")]
    Delivery {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error should stop the process.
    ///
    /// Per-record failures (bad payload, rejected or failed send) are
    /// recoverable: the poll loop logs them and moves on. Everything else
    /// means the process cannot do useful work and should exit.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::PayloadDecode(_) | Self::Delivery { .. } | Self::Http(_)
        )
    }
}
