//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod credential_store;
mod file_system;
mod http_client;
mod presenter;
mod sink;

pub use credential_store::{CredentialStore, StoreError};
pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{HttpClient, HttpClientError};
pub use presenter::Presenter;
pub use sink::{RecordSink, SinkError};
