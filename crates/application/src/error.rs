//! Application error types

use forcepull_domain::DomainError;
use thiserror::Error;

use crate::auth::ExchangeError;
use crate::fetch::FetchError;
use crate::ports::{HttpClientError, SinkError, StoreError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    /// A credential store operation failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A token endpoint exchange failed.
    #[error("token exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// A data request could not be sent.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Writing rows failed.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
