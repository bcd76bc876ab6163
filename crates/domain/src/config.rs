//! Immutable configuration passed into each component.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};
use crate::query::SoqlQuery;

/// Production authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://login.salesforce.com/services/oauth2/authorize";

/// Production token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// Redirect URL served by the local callback listener.
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/callback";

/// Data API version used in query URLs.
pub const DEFAULT_API_VERSION: &str = "v26.0";

/// Upper bound on followed `nextRecordsUrl` pages per run.
pub const DEFAULT_MAX_PAGES: usize = 50;

/// `OAuth2` client settings for the authorization-code grant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization endpoint URL
    pub authorize_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Client ID
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Redirect URI registered with the provider
    pub redirect_url: String,
}

impl OAuthConfig {
    /// Creates a config against the production endpoints.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            ..Self::default()
        }
    }

    /// Overrides the authorization and token endpoints.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.authorize_url = authorize_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Checks that every value needed by the grant is present and parseable.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unusable value.
    pub fn validate(&self) -> DomainResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "client_id is empty".to_string(),
            ));
        }
        if self.client_secret.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "client_secret is empty".to_string(),
            ));
        }
        for (name, value) in [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("redirect_url", &self.redirect_url),
        ] {
            Url::parse(value).map_err(|e| DomainError::InvalidUrl(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

/// What to fetch and which fields reach the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Data API version segment, e.g. `v26.0`
    pub api_version: String,
    /// Query sent to the data endpoint
    pub query: SoqlQuery,
    /// Record fields projected into each output row, in order
    pub columns: Vec<String>,
    /// Maximum number of pages fetched in one run
    pub max_pages: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            query: SoqlQuery::default(),
            columns: vec![
                "Name".to_string(),
                "Phone".to_string(),
                "Industry".to_string(),
            ],
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl FetchConfig {
    /// Checks the query and column list.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid or no column is configured.
    pub fn validate(&self) -> DomainResult<()> {
        if self.api_version.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "api_version is empty".to_string(),
            ));
        }
        if self.columns.is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "no output columns configured".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(DomainError::InvalidConfiguration(
                "max_pages must be at least 1".to_string(),
            ));
        }
        self.query.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_production() {
        let config = OAuthConfig::new("id", "secret", "http://localhost:8080/callback");
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_client_secret_is_rejected() {
        let config = OAuthConfig::new("id", "  ", "http://localhost:8080/callback");
        assert_eq!(
            config.validate(),
            Err(DomainError::InvalidConfiguration(
                "client_secret is empty".to_string()
            ))
        );
    }

    #[test]
    fn test_unparseable_endpoint_is_rejected() {
        let config = OAuthConfig::new("id", "secret", "http://localhost:8080/callback")
            .with_endpoints("not a url", DEFAULT_TOKEN_URL);
        assert!(matches!(config.validate(), Err(DomainError::InvalidUrl(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = OAuthConfig::new("id", "top-secret", "http://localhost:8080/callback");
        let debug = format!("{config:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.api_version, "v26.0");
        assert_eq!(config.columns, vec!["Name", "Phone", "Industry"]);
        assert!(config.validate().is_ok());
    }
}
