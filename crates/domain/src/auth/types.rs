//! Authorization-code grant types

use serde::{Deserialize, Serialize};
use url::Url;

use crate::credential::Credential;
use crate::error::{DomainError, DomainResult};

/// Get a preview of a token (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        token.to_string()
    }
}

/// Parameters of the browser redirect to the authorization endpoint.
///
/// Ephemeral: built for each login prompt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Client ID
    pub client_id: String,
    /// Redirect URI the provider sends the code back to
    pub redirect_url: String,
    /// Always `code` for this grant
    pub response_type: String,
}

impl AuthorizationRequest {
    /// Creates a `response_type=code` request.
    #[must_use]
    pub fn new(client_id: impl Into<String>, redirect_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_url: redirect_url.into(),
            response_type: "code".to_string(),
        }
    }

    /// Composes the authorize URL against the given endpoint.
    ///
    /// Produces `<endpoint>?response_type=code&client_id=<id>&redirect_uri=<url>`
    /// with every value percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL.
    pub fn authorize_url(&self, endpoint: &str) -> DomainResult<Url> {
        let mut url =
            Url::parse(endpoint).map_err(|e| DomainError::InvalidUrl(format!("{e}: {endpoint}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", &self.response_type)
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url);
        Ok(url)
    }
}

/// A grant presented to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// Exchange of a freshly issued authorization code.
    AuthorizationCode {
        /// The code received on the callback
        code: String,
        /// Must equal the redirect URI used in the authorize request
        redirect_uri: String,
    },
    /// Renewal of the access token.
    RefreshToken {
        /// The stored refresh token
        refresh_token: String,
    },
}

impl TokenGrant {
    /// The `grant_type` form value.
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form parameters for the token request, client credentials included.
    #[must_use]
    pub fn form_params(&self, client_id: &str, client_secret: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("grant_type", self.grant_type().to_string())];
        match self {
            Self::AuthorizationCode { code, redirect_uri } => {
                params.push(("code", code.clone()));
                params.push(("client_id", client_id.to_string()));
                params.push(("client_secret", client_secret.to_string()));
                params.push(("redirect_uri", redirect_uri.clone()));
            }
            Self::RefreshToken { refresh_token } => {
                params.push(("refresh_token", refresh_token.clone()));
                params.push(("client_id", client_id.to_string()));
                params.push(("client_secret", client_secret.to_string()));
            }
        }
        params
    }
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorizationCode { redirect_uri, .. } => f
                .debug_struct("AuthorizationCode")
                .field("code", &"<redacted>")
                .field("redirect_uri", redirect_uri)
                .finish(),
            Self::RefreshToken { refresh_token } => f
                .debug_struct("RefreshToken")
                .field("refresh_token", &token_preview(refresh_token))
                .finish(),
        }
    }
}

/// Token endpoint success body.
///
/// `refresh_token` is only guaranteed on the authorization-code grant.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Instance base URL the account lives on
    pub instance_url: Option<String>,
    /// Newly issued access token
    pub access_token: Option<String>,
    /// Newly issued refresh token, if any
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer")
    pub token_type: Option<String>,
    /// Granted scopes
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Parses a token endpoint body.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTokenResponse` if the body is not a JSON object.
    pub fn parse(body: &str) -> DomainResult<Self> {
        serde_json::from_str(body).map_err(|e| DomainError::MalformedTokenResponse(e.to_string()))
    }

    /// The refresh token, if the provider issued a non-empty one.
    #[must_use]
    pub fn issued_refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Validates the response and converts it into a credential.
    ///
    /// Instance URL and access token must be present, non-empty, and the
    /// instance URL must parse. An empty refresh token counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTokenResponse` naming the unusable field.
    pub fn into_credential(self) -> DomainResult<Credential> {
        let instance_url = required(self.instance_url, "instance_url")?;
        Url::parse(&instance_url).map_err(|e| {
            DomainError::MalformedTokenResponse(format!("instance_url is not a URL: {e}"))
        })?;
        let access_token = required(self.access_token, "access_token")?;
        let refresh_token = self.refresh_token.filter(|t| !t.trim().is_empty());
        Ok(Credential::new(instance_url, access_token, refresh_token))
    }
}

fn required(value: Option<String>, name: &str) -> DomainResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DomainError::MalformedTokenResponse(format!("missing {name}")))
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("instance_url", &self.instance_url)
            .field("access_token", &self.access_token.as_deref().map(token_preview))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(token_preview),
            )
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}

/// `OAuth2` error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenErrorResponse {
    /// Error code, e.g. `invalid_grant`
    pub error: String,
    /// Human-readable detail
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenErrorResponse {
    /// Best message available from an error body, falling back to the raw text.
    #[must_use]
    pub fn message_from_body(body: &str) -> String {
        serde_json::from_str::<Self>(body).map_or_else(
            |_| body.to_string(),
            |err| err.error_description.unwrap_or(err.error),
        )
    }
}
