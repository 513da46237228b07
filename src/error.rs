//! Error types for the omok crate.
//!
//! Illegal moves are not errors: they come back as
//! [`MoveRejection`](crate::rules::MoveRejection) values. Everything here is
//! about the outside world (files, sockets, malformed JSON).

use derive_more::{Display, Error, From};
use tracing::instrument;

/// Configuration error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Top-level error for the networked parts of the crate.
#[derive(Debug, Display, Error, From)]
pub enum OmokError {
    /// Socket or file failure.
    #[display("I/O error: {_0}")]
    Io(std::io::Error),
    /// A wire line that is not a known event.
    #[display("protocol error: {_0}")]
    Json(serde_json::Error),
    /// Bad or unreadable configuration.
    #[display("{_0}")]
    Config(ConfigError),
    /// A blocking search task panicked or was cancelled.
    #[display("background task failed: {_0}")]
    Task(tokio::task::JoinError),
    /// The peer closed the stream.
    #[display("connection closed")]
    #[from(ignore)]
    Closed,
}

/// Result alias used across the crate.
pub type OmokResult<T> = Result<T, OmokError>;
