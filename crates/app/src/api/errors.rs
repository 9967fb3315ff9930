//! Backend API errors.

use thiserror::Error;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the access token. The session must be cleared
    /// and the customer sent back to login; never retried in place.
    #[error("authentication rejected")]
    Unauthorized,

    /// The backend returned a non-2xx response, with its `message` field
    /// when one was present.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Backend-supplied message, or the status line.
        message: String,
    },
}
