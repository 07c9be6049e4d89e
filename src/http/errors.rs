//! Error types for the HTTP transport layer.
//!
//! Transport failures (DNS, TLS, timeouts, socket-level problems) surface as
//! [`HttpError::Transport`]. Application-level error statuses are *not*
//! transport errors: they arrive as valid responses and are classified by
//! the result layer. The remaining variants are programmer-misuse
//! conditions: an unusable URI or a request driven outside its state
//! machine.

use thiserror::Error;

/// Errors raised by the HTTP transport layer.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The URI lacks a scheme or host, or cannot be parsed at all.
    #[error("invalid request URI '{uri}': {reason}")]
    InvalidUri {
        /// The URI as given.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `execute()` was called before `get()` or `post()` configured the
    /// request.
    #[error("request executed before get() or post() configured it")]
    NotConfigured,

    /// `execute()` was called a second time; an exchange runs exactly once.
    #[error("request already executed; an exchange runs exactly once")]
    AlreadyExecuted,

    /// The exchange failed below the application level: connection failure,
    /// timeout, TLS problem, or a malformed response at the socket level.
    #[error("transport error for {uri}: {message}")]
    Transport {
        /// The request URI.
        uri: String,
        /// The transport provider's error message.
        message: String,
        /// The underlying provider error, when one is available.
        #[source]
        source: Option<reqwest::Error>,
    },
}

impl HttpError {
    /// Wraps a provider error as a transport failure for `uri`.
    pub(crate) fn transport(uri: &str, error: reqwest::Error) -> Self {
        Self::Transport {
            uri: uri.to_string(),
            message: error.to_string(),
            source: Some(error),
        }
    }
}
