//! Error types for the Bitly API client.
//!
//! # Design
//! Three failure sources are kept apart: the transport never got a
//! response (`Transport`), the service answered with a non-success status
//! (`Api`), or the answer did not have the expected shape (`Decode`).
//! Every layer forwards the first error it sees without rewrapping it.

use thiserror::Error;

/// Failure reported by a `Transport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Errors returned by `Client` and `Links` operations.
#[derive(Debug, Error)]
pub enum BitlyError {
    /// The request never produced a response: connection refused, timeout,
    /// unreadable body.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The service returned a non-success status code.
    #[error("api error {status_code}: {status_txt}")]
    Api { status_code: u16, status_txt: String },

    /// The response body or its payload did not match the expected JSON shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The base URL and path could not be joined into a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl BitlyError {
    pub(crate) fn decode(err: serde_json::Error) -> Self {
        BitlyError::Decode(err.to_string())
    }
}
