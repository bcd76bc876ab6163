//! Token endpoint client.
//!
//! Exchanges an authorization code, or the stored refresh token, for a
//! fresh credential and writes the result to the credential store.

use std::sync::Arc;

use forcepull_domain::{
    Credential, DomainError, HttpRequest, HttpResponse, OAuthConfig,
    TokenErrorResponse, TokenGrant, TokenResponse, token_preview,
};
use thiserror::Error;

use crate::ports::{CredentialStore, HttpClient, HttpClientError, StoreError};

/// Errors raised by the token endpoint exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The form body could not be encoded.
    #[error("failed to encode token request: {0}")]
    Encoding(String),

    /// No response from the token endpoint.
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] HttpClientError),

    /// The token endpoint refused the grant.
    #[error("token endpoint returned {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Provider error detail
        message: String,
    },

    /// The token endpoint answered 200 with an unusable body.
    #[error("{0}")]
    MalformedResponse(#[from] DomainError),

    /// The credential could not be persisted.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

/// Turns authorization codes and refresh tokens into credentials.
pub struct TokenExchanger<H: HttpClient> {
    http: Arc<H>,
    config: OAuthConfig,
    store: Arc<dyn CredentialStore>,
}

impl<H: HttpClient> TokenExchanger<H> {
    /// Creates an exchanger writing into `store`.
    pub fn new(http: Arc<H>, config: OAuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            http,
            config,
            store,
        }
    }

    /// The client configuration in use.
    #[must_use]
    pub const fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Exchanges an authorization code for a credential.
    ///
    /// On success all three fields are overwritten in one store update. When
    /// the provider issues no refresh token the stored one is removed, so the
    /// stored pair always comes from the same grant.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` on transport failure, a non-200 status, or an
    /// unusable body. The store is left untouched in each of those cases.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, ExchangeError> {
        let grant = TokenGrant::AuthorizationCode {
            code: code.to_string(),
            redirect_uri: self.config.redirect_url.clone(),
        };
        let response = self.request_token(&grant).await?;

        if response.status != 200 {
            let message = TokenErrorResponse::message_from_body(&response.body);
            tracing::warn!(status = response.status, %message, "authorization code rejected");
            return Err(ExchangeError::Rejected {
                status: response.status,
                message,
            });
        }

        let credential = TokenResponse::parse(&response.body)?.into_credential()?;
        self.store.save(&credential).await?;

        tracing::info!(
            user = self.store.user(),
            access_token = %token_preview(&credential.access_token),
            has_refresh_token = credential.refresh_token.is_some(),
            "authorization code exchanged"
        );
        Ok(credential)
    }

    /// Renews the access token with the stored refresh token.
    ///
    /// Returns `Ok(false)` without touching the store when no refreshable
    /// credential is stored or the endpoint answers anything but 200. On 200
    /// the instance URL and access token are overwritten in one store update;
    /// the refresh token only when the response carries a non-empty one.
    ///
    /// # Errors
    ///
    /// Returns `ExchangeError` on transport failure, an unusable 200 body, or
    /// a store failure.
    pub async fn refresh(&self) -> Result<bool, ExchangeError> {
        let Some(stored) = self.store.load().await?.filter(Credential::can_refresh) else {
            tracing::info!(user = self.store.user(), "no refresh token stored");
            return Ok(false);
        };

        let grant = TokenGrant::RefreshToken {
            refresh_token: stored.refresh_token.clone().unwrap_or_default(),
        };
        let response = self.request_token(&grant).await?;

        if response.status != 200 {
            tracing::warn!(
                status = response.status,
                message = %TokenErrorResponse::message_from_body(&response.body),
                "refresh token rejected"
            );
            return Ok(false);
        }

        let token = TokenResponse::parse(&response.body)?;
        let issued_refresh = token.issued_refresh_token().map(str::to_string);
        let credential = Credential {
            refresh_token: issued_refresh.clone().or(stored.refresh_token),
            ..token.into_credential()?
        };
        self.store.save(&credential).await?;

        tracing::info!(
            user = self.store.user(),
            access_token = %token_preview(&credential.access_token),
            rotated_refresh_token = issued_refresh.is_some(),
            "access token refreshed"
        );
        Ok(true)
    }

    async fn request_token(&self, grant: &TokenGrant) -> Result<HttpResponse, ExchangeError> {
        let params = grant.form_params(&self.config.client_id, &self.config.client_secret);
        let body = serde_urlencoded::to_string(&params)
            .map_err(|e| ExchangeError::Encoding(e.to_string()))?;
        let request = HttpRequest::post_form(&self.config.token_url, body)
            .with_header("Accept", "application/json");

        tracing::debug!(grant_type = grant.grant_type(), url = %self.config.token_url, "calling token endpoint");
        Ok(self.http.send(&request).await?)
    }
}
