//! Login interstitial and callback pages.
//!
//! These are the only surfaces the authorization-code flow shows to the
//! user: a link to the provider before consent, and a static page after
//! the provider redirects back.

use std::collections::HashMap;

/// One-time interstitial pointing the user at the authorize URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrompt {
    /// Provider authorize URL with the grant parameters applied
    pub authorize_url: String,
}

impl LoginPrompt {
    /// Creates a prompt for the given authorize URL.
    #[must_use]
    pub fn new(authorize_url: impl Into<String>) -> Self {
        Self {
            authorize_url: authorize_url.into(),
        }
    }

    /// Interstitial page body.
    #[must_use]
    pub fn html(&self) -> String {
        let href = escape_html(&self.authorize_url);
        format!(
            "<html><body><h1>You need to login</h1>\
             <p><a href=\"{href}\" target=\"_blank\">{href}</a></p>\
             <p>Re-open this window when you return.</p></body></html>"
        )
    }

    /// Plain-text rendering for terminals.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "You need to login: {}\nRe-open this window when you return.",
            self.authorize_url
        )
    }
}

/// Query parameters received on the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code, when consent was given
    pub code: Option<String>,
    /// Provider error code, e.g. `access_denied`
    pub error: Option<String>,
    /// Provider error detail
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Callback carrying a code.
    #[must_use]
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Parses a raw query string (without the leading `?`).
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let pairs: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let non_empty = |key: &str| pairs.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            code: non_empty("code"),
            error: non_empty("error"),
            error_description: non_empty("error_description"),
        }
    }
}

/// Result of handling one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackPage {
    /// No code was supplied; nothing happened.
    Ignored,
    /// The code was exchanged and the credential stored.
    Completed {
        /// Preview of the new access token.
        access_token_preview: String,
    },
    /// The provider reported an error or the exchange failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl CallbackPage {
    /// Check if the exchange completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Check if the callback ends the login attempt.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }

    /// HTTP status the callback listener answers with.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Ignored | Self::Completed { .. } => 200,
            Self::Failed { .. } => 502,
        }
    }

    /// Page body.
    #[must_use]
    pub fn html(&self) -> String {
        match self {
            Self::Ignored => String::new(),
            Self::Completed { .. } => "<html><body><h1>Finished with oAuth</h1>\
                                       <p>You can close this window.</p></body></html>"
                .to_string(),
            Self::Failed { error } => format!(
                "<html><body><h1>Login failed</h1><p>{}</p></body></html>",
                escape_html(error)
            ),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
