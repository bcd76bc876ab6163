//! User-facing presentation port.

use crate::auth::{CallbackPage, LoginPrompt};

/// Shows login prompts, callback results and errors to the user.
pub trait Presenter: Send + Sync {
    /// Shows the one-time login interstitial.
    fn show_login(&self, prompt: &LoginPrompt);

    /// Shows the outcome of an authorization callback.
    fn show_callback(&self, page: &CallbackPage);

    /// Shows a failure message.
    fn show_error(&self, message: &str);
}
