//! Credential store port
//!
//! Defines the interface for per-user credential persistence.

use async_trait::async_trait;

use forcepull_domain::{Credential, CredentialField};

use super::FileSystemError;

/// Errors that can occur during credential store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] FileSystemError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence of the three credential values for one user.
///
/// A store instance is bound to the invoking user; nothing outside that
/// user's entry is visible through it. Values are not validated.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The user this store is scoped to.
    fn user(&self) -> &str;

    /// Gets a single value.
    async fn get(&self, field: CredentialField) -> Result<Option<String>, StoreError>;

    /// Sets a single value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be persisted.
    async fn set(&self, field: CredentialField, value: &str) -> Result<(), StoreError>;

    /// Writes the whole credential in one update.
    ///
    /// Either every field changes or none does. A credential without
    /// refresh token removes the stored one.
    ///
    /// # Errors
    /// Returns an error if the credential cannot be persisted.
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Removes a single value, returning the previous one.
    async fn remove(&self, field: CredentialField) -> Result<Option<String>, StoreError>;

    /// Loads the credential triple.
    ///
    /// # Returns
    /// `None` unless both the instance URL and the access token are present.
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        let instance_url = self.get(CredentialField::InstanceUrl).await?;
        let access_token = self.get(CredentialField::AccessToken).await?;
        let refresh_token = self.get(CredentialField::RefreshToken).await?;

        Ok(match (instance_url, access_token) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
                Some(Credential::new(url, token, refresh_token))
            }
            _ => None,
        })
    }

    /// Removes all three values.
    async fn clear(&self) -> Result<(), StoreError> {
        for field in CredentialField::ALL {
            self.remove(field).await?;
        }
        Ok(())
    }
}
