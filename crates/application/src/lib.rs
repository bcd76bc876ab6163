//! Forcepull Application - Ports and request orchestration
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for external dependencies)
//! - The `OAuth2` authorization-code lifecycle
//! - The fetch / refresh-and-retry / login state machine
//! - Application-level error handling

pub mod auth;
pub mod entry_point;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod ports;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use auth::{
    AuthFlow, CallbackPage, CallbackParams, ExchangeError, InMemoryCredentialStore, LoginPrompt,
    TokenExchanger,
};
pub use entry_point::EntryPoint;
pub use error::{ApplicationError, ApplicationResult};
pub use fetch::{DataFetcher, FetchError};
pub use orchestrator::{RequestOrchestrator, RunFailure, RunOutcome};
pub use ports::{
    CredentialStore, FileSystem, FileSystemError, HttpClient, HttpClientError, Presenter,
    RecordSink, SinkError, StoreError,
};
pub use writer::RecordWriter;
