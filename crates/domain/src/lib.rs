//! Forcepull Domain - Core business types
//!
//! This crate defines the domain model for the Forcepull record fetcher.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod query;
pub mod record;
pub mod state;

pub use auth::{
    AuthorizationRequest, TokenErrorResponse, TokenGrant, TokenResponse, token_preview,
};
pub use config::{FetchConfig, OAuthConfig};
pub use credential::{Credential, CredentialField, CredentialFile};
pub use error::{DomainError, DomainResult};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{Filter, FilterOperator, FilterValue, SoqlQuery};
pub use record::{ApiRecord, QueryEnvelope};
pub use state::{FetchOutcome, OrchestratorState};
