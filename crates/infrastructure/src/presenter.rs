//! Terminal presenter.

use std::io::{Stderr, Write};
use std::sync::Mutex;

use forcepull_application::auth::{CallbackPage, LoginPrompt};
use forcepull_application::ports::Presenter;

/// Writes prompts and errors to a terminal stream (stderr by default).
pub struct ConsolePresenter<W = Stderr> {
    out: Mutex<W>,
}

impl ConsolePresenter {
    /// Presenter writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(std::io::stderr())
    }
}

impl<W: Write + Send> ConsolePresenter<W> {
    /// Presenter writing to `out`.
    pub const fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: &str) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write + Send> Presenter for ConsolePresenter<W> {
    fn show_login(&self, prompt: &LoginPrompt) {
        self.line(&prompt.text());
    }

    fn show_callback(&self, page: &CallbackPage) {
        match page {
            CallbackPage::Ignored => {}
            CallbackPage::Completed { .. } => {
                self.line("Finished with oAuth. You can close the browser window.");
            }
            CallbackPage::Failed { error } => self.line(&format!("Login failed: {error}")),
        }
    }

    fn show_error(&self, message: &str) {
        self.line(message);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(presenter: ConsolePresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_login_prompt_shows_link() {
        let presenter = ConsolePresenter::with_writer(Vec::new());
        presenter.show_login(&LoginPrompt::new("https://login.example.com/authorize?x=1"));
        assert_eq!(
            output(presenter),
            "You need to login: https://login.example.com/authorize?x=1\n\
             Re-open this window when you return.\n"
        );
    }

    #[test]
    fn test_ignored_callback_prints_nothing() {
        let presenter = ConsolePresenter::with_writer(Vec::new());
        presenter.show_callback(&CallbackPage::Ignored);
        presenter.show_error("Error 500: boom");
        assert_eq!(output(presenter), "Error 500: boom\n");
    }
}
