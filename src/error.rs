//! Error types for serving API calls

use thiserror::Error;

/// Failures surfaced while talking to the serving API
///
/// `Server` carries the user-facing message verbatim in its Display impl:
/// `Server error: {status} - {detail}`, with "Unknown error" standing in
/// when the response body carried no detail field.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The server answered with a non-success status
    #[error("Server error: {status} - {}", .detail.as_deref().unwrap_or("Unknown error"))]
    Server { status: u16, detail: Option<String> },

    /// The request never produced an HTTP response
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ConsoleError {
    /// Status code for server-reported failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::Server { status, .. } => Some(*status),
            ConsoleError::Network(_) => None,
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
