//! Error types for the backend API boundary

use thiserror::Error;

/// Failures surfaced by the HTTP client layer.
///
/// Every failing user action ends up as one of these; screens render the
/// `Display` string and stay in their current mode. Client-side validation
/// failures never construct an `ApiError` because no request is sent.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, bad TLS).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered `success:false`. The message is shown verbatim.
    #[error("{0}")]
    Server(String),

    /// The response body did not match the envelope convention.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Business failure carrying the server message, with a generic fallback
    /// when the backend did not include one.
    pub fn server_message(message: Option<String>) -> Self {
        ApiError::Server(message.unwrap_or_else(|| "Request failed".to_string()))
    }
}
