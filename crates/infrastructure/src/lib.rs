//! Forcepull Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the settings loader and the
//! local callback listener used by the binary.

pub mod adapters;
pub mod callback;
pub mod persistence;
pub mod presenter;
pub mod serialization;
pub mod settings;
pub mod sink;

pub use adapters::{DEFAULT_TIMEOUT, ReqwestHttpClient};
pub use callback::{CallbackError, CallbackListener};
pub use persistence::{FileCredentialStore, TokioFileSystem};
pub use presenter::ConsolePresenter;
pub use serialization::{SerializationError, from_json, to_json_stable, to_json_stable_bytes};
pub use settings::{
    DEFAULT_SETTINGS_FILE, OutputSettings, Settings, SettingsError, default_credential_path,
};
pub use sink::{ConsoleTableSink, TsvFileSink};
