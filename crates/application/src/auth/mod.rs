//! `OAuth2` authorization-code lifecycle.
//!
//! - [`AuthFlow`] builds the login prompt and handles the provider callback
//! - [`TokenExchanger`] talks to the token endpoint and writes credentials
//! - [`InMemoryCredentialStore`] keeps credentials for tests and short-lived sessions

mod exchanger;
mod flow;
mod memory_store;
mod surface;

pub use exchanger::{ExchangeError, TokenExchanger};
pub use flow::AuthFlow;
pub use memory_store::InMemoryCredentialStore;
pub use surface::{CallbackPage, CallbackParams, LoginPrompt};
