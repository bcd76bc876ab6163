//! Authorization-code login flow.

use std::sync::Arc;

use forcepull_domain::{
    AuthorizationRequest, DomainError, DomainResult, OAuthConfig, token_preview,
};
use url::Url;

use super::exchanger::TokenExchanger;
use super::surface::{CallbackPage, CallbackParams, LoginPrompt};
use crate::ports::HttpClient;

/// Builds the login prompt and completes the grant on callback.
pub struct AuthFlow<H: HttpClient> {
    authorize_url: Url,
    redirect_url: Url,
    exchanger: Arc<TokenExchanger<H>>,
}

impl<H: HttpClient> AuthFlow<H> {
    /// Creates the flow for the exchanger's client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(exchanger: Arc<TokenExchanger<H>>) -> DomainResult<Self> {
        let config = exchanger.config();
        config.validate()?;
        let authorize_url = Self::build_authorize_url(config)?;
        let redirect_url = Url::parse(&config.redirect_url)
            .map_err(|e| DomainError::InvalidUrl(format!("redirect_url: {e}")))?;
        Ok(Self {
            authorize_url,
            redirect_url,
            exchanger,
        })
    }

    /// Composes `<authorize_url>?response_type=code&client_id=..&redirect_uri=..`.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorize endpoint is not a valid URL.
    pub fn build_authorize_url(config: &OAuthConfig) -> DomainResult<Url> {
        AuthorizationRequest::new(&config.client_id, &config.redirect_url)
            .authorize_url(&config.authorize_url)
    }

    /// The redirect URI the provider calls back on.
    #[must_use]
    pub const fn redirect_url(&self) -> &Url {
        &self.redirect_url
    }

    /// Produces the login interstitial. No network call, no store mutation.
    #[must_use]
    pub fn login(&self) -> LoginPrompt {
        tracing::info!("login required");
        LoginPrompt::new(self.authorize_url.as_str())
    }

    /// Handles a redirect back from the provider.
    ///
    /// Without a code nothing is exchanged: the callback is ignored, or
    /// reported as failed when the provider sent an error.
    pub async fn handle_callback(&self, params: &CallbackParams) -> CallbackPage {
        let Some(code) = params.code.as_deref() else {
            return match &params.error {
                Some(error) => {
                    let message = params
                        .error_description
                        .clone()
                        .unwrap_or_else(|| error.clone());
                    tracing::warn!(%error, %message, "provider denied authorization");
                    CallbackPage::Failed { error: message }
                }
                None => {
                    tracing::debug!("callback without code ignored");
                    CallbackPage::Ignored
                }
            };
        };

        match self.exchanger.exchange_code(code).await {
            Ok(credential) => CallbackPage::Completed {
                access_token_preview: token_preview(&credential.access_token),
            },
            Err(e) => {
                tracing::warn!(error = %e, "authorization code exchange failed");
                CallbackPage::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
