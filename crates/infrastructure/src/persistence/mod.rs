//! Persistence adapters.

mod credential_store;
mod file_system;

pub use credential_store::FileCredentialStore;
pub use file_system::TokioFileSystem;
