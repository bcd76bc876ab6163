//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A configuration value is missing or unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The token endpoint answered with a body that is not a usable token response.
    #[error("malformed token response: {0}")]
    MalformedTokenResponse(String),

    /// The data endpoint answered with a body that is not a query envelope.
    #[error("malformed query response: {0}")]
    MalformedQueryResponse(String),

    /// A query could not be built from its parts.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
