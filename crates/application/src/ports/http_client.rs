//! HTTP Client port

use std::future::Future;

use forcepull_domain::{HttpRequest, HttpResponse};

/// Transport-level failures. Error statuses are not failures; they come
/// back as ordinary responses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpClientError {
    /// The URL could not be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No response within the configured timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Host name resolution failed.
    #[error("Could not resolve host '{host}': {message}")]
    DnsError {
        /// Host that failed to resolve
        host: String,
        /// Resolver detail
        message: String,
    },

    /// The server actively refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host
        host: String,
        /// Target port
        port: u16,
    },

    /// Any other connect-phase failure, TLS included.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured maximum
        max: usize,
    },

    /// Anything the adapter could not classify.
    #[error("{0}")]
    Other(String),
}

/// Port for sending HTTP requests.
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    fn send(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpClientError>> + Send;
}
