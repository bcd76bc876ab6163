//! Runtime settings loaded from an optional file and `FORCEPULL__*` variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use forcepull_domain::{DomainError, FetchConfig, OAuthConfig};
use serde::Deserialize;
use thiserror::Error;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "forcepull.toml";

const ENV_PREFIX: &str = "FORCEPULL";
const ENV_SEPARATOR: &str = "__";

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is unusable.
    #[error("invalid settings: {0}")]
    Invalid(#[from] DomainError),

    /// No credential path was configured and no config directory exists.
    #[error("cannot determine a credential file location; set credential_path")]
    NoCredentialPath,
}

/// Where fetched rows go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Append rows to this TSV file instead of printing a table.
    pub tsv_path: Option<PathBuf>,
}

/// Everything the binary needs to wire one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key of the credential entry in the credential file
    pub user: String,
    /// Credential file; defaults to the platform config directory
    pub credential_path: Option<PathBuf>,
    /// How long the callback listener waits for the redirect
    pub callback_timeout_secs: u64,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
    /// `OAuth2` client settings
    pub oauth: OAuthConfig,
    /// Query and projected columns
    pub fetch: FetchConfig,
    /// Row sink selection
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: std::env::var("USER").unwrap_or_else(|_| "default".to_string()),
            credential_path: None,
            callback_timeout_secs: 300,
            http_timeout_secs: 30,
            oauth: OAuthConfig::default(),
            fetch: FetchConfig::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path` (or `forcepull.toml` if present) and the
    /// process environment.
    ///
    /// An explicitly given file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(
            path,
            Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR),
        )
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        tracing::debug!(user = %settings.user, "settings loaded");
        Ok(settings)
    }

    /// Checks the OAuth and fetch sections.
    ///
    /// # Errors
    ///
    /// Returns the first unusable value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.user.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration("user is empty".to_string()).into());
        }
        self.oauth.validate()?;
        self.fetch.validate()?;
        Ok(())
    }

    /// The configured credential file, or the platform default.
    ///
    /// # Errors
    ///
    /// Returns `NoCredentialPath` if neither is available.
    pub fn credential_path(&self) -> Result<PathBuf, SettingsError> {
        match &self.credential_path {
            Some(path) => Ok(path.clone()),
            None => default_credential_path().ok_or(SettingsError::NoCredentialPath),
        }
    }

    /// Callback listener timeout.
    #[must_use]
    pub const fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// `<config dir>/forcepull/credentials.json`.
#[must_use]
pub fn default_credential_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("forcepull").join("credentials.json"))
}
