//! Local redirect URI listener.

mod server;

pub use server::{CallbackError, CallbackListener};
