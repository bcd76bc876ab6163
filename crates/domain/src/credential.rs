//! Stored credential triple and its on-disk layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::auth::token_preview;

/// One of the three persisted credential values.
///
/// Each field maps to a fixed property name that is unique across every
/// consumer of the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialField {
    /// Per-account API host returned at token issue time.
    InstanceUrl,
    /// Short-lived bearer token.
    AccessToken,
    /// Long-lived token used to obtain new access tokens.
    RefreshToken,
}

impl CredentialField {
    /// All fields, in storage order.
    pub const ALL: [Self; 3] = [Self::InstanceUrl, Self::AccessToken, Self::RefreshToken];

    /// The persisted property name for this field.
    #[must_use]
    pub const fn property_name(self) -> &'static str {
        match self {
            Self::InstanceUrl => "SALESFORCE_INSTANCE_URL",
            Self::AccessToken => "SALESFORCE_OAUTH_TOKEN",
            Self::RefreshToken => "SALESFORCE_REFRESH_TOKEN",
        }
    }
}

impl std::fmt::Display for CredentialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.property_name())
    }
}

/// The credential triple used to call the data API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Instance base URL, e.g. `https://na9.salesforce.com`
    pub instance_url: String,
    /// Current access token
    pub access_token: String,
    /// Refresh token, absent when the provider never issued one
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Creates a credential.
    #[must_use]
    pub fn new(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            refresh_token,
        }
    }

    /// Returns the Authorization header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Check if the credential can be refreshed.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("instance_url", &self.instance_url)
            .field("access_token", &token_preview(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(token_preview),
            )
            .finish()
    }
}

/// Local credential file, one entry per user.
///
/// ```json
/// {
///   "schema_version": 1,
///   "users": {
///     "alice": {
///       "SALESFORCE_INSTANCE_URL": "https://na9.salesforce.com",
///       "SALESFORCE_OAUTH_TOKEN": "00D...",
///       "SALESFORCE_REFRESH_TOKEN": "5Aep..."
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFile {
    /// Schema version for migration support.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Properties keyed by user, then by property name.
    #[serde(default)]
    pub users: BTreeMap<String, BTreeMap<String, String>>,
}

const fn default_schema_version() -> u32 {
    1
}

impl CredentialFile {
    /// Creates an empty credential file.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schema_version: 1,
            users: BTreeMap::new(),
        }
    }

    /// Gets one field for a user.
    #[must_use]
    pub fn get(&self, user: &str, field: CredentialField) -> Option<&str> {
        self.users
            .get(user)
            .and_then(|props| props.get(field.property_name()))
            .map(String::as_str)
    }

    /// Sets one field for a user.
    pub fn set(&mut self, user: &str, field: CredentialField, value: impl Into<String>) {
        self.users
            .entry(user.to_string())
            .or_default()
            .insert(field.property_name().to_string(), value.into());
    }

    /// Replaces every field of a user's entry with `credential`.
    ///
    /// A credential without refresh token removes the stored one.
    pub fn put(&mut self, user: &str, credential: &Credential) {
        self.set(user, CredentialField::InstanceUrl, &credential.instance_url);
        self.set(user, CredentialField::AccessToken, &credential.access_token);
        match &credential.refresh_token {
            Some(token) => self.set(user, CredentialField::RefreshToken, token),
            None => {
                self.remove(user, CredentialField::RefreshToken);
            }
        }
    }

    /// Removes one field for a user, dropping the user entry once empty.
    pub fn remove(&mut self, user: &str, field: CredentialField) -> Option<String> {
        let props = self.users.get_mut(user)?;
        let removed = props.remove(field.property_name());
        if props.is_empty() {
            self.users.remove(user);
        }
        removed
    }
}

impl Default for CredentialFile {
    fn default() -> Self {
        Self::new()
    }
}
