//! In-memory credential storage.
//!
//! Holds credentials for any number of users in one shared map; each store
//! handle only sees the entry of the user it was created for.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use forcepull_domain::{Credential, CredentialField};
use tokio::sync::RwLock;

use crate::ports::{CredentialStore, StoreError};

type UserMap = HashMap<String, BTreeMap<CredentialField, String>>;

/// Thread-safe in-memory credential store.
#[derive(Debug, Clone)]
pub struct InMemoryCredentialStore {
    users: Arc<RwLock<UserMap>>,
    user: String,
    writes: Arc<AtomicUsize>,
}

impl InMemoryCredentialStore {
    /// Create an empty store scoped to `user`.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            user: user.into(),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A handle on the same map scoped to another user.
    #[must_use]
    pub fn for_user(&self, user: impl Into<String>) -> Self {
        Self {
            users: Arc::clone(&self.users),
            user: user.into(),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Stores a credential without counting it as a write.
    pub async fn seed(&self, credential: &Credential) {
        let mut users = self.users.write().await;
        let entry = users.entry(self.user.clone()).or_default();
        entry.insert(CredentialField::InstanceUrl, credential.instance_url.clone());
        entry.insert(CredentialField::AccessToken, credential.access_token.clone());
        match &credential.refresh_token {
            Some(token) => {
                entry.insert(CredentialField::RefreshToken, token.clone());
            }
            None => {
                entry.remove(&CredentialField::RefreshToken);
            }
        }
    }

    /// Number of `set`/`save`/`remove` calls made through this handle.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    fn user(&self) -> &str {
        &self.user
    }

    async fn get(&self, field: CredentialField) -> Result<Option<String>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .get(&self.user)
            .and_then(|fields| fields.get(&field))
            .cloned())
    }

    async fn set(&self, field: CredentialField, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        users
            .entry(self.user.clone())
            .or_default()
            .insert(field, value.to_string());
        Ok(())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed(credential).await;
        Ok(())
    }

    async fn remove(&self, field: CredentialField) -> Result<Option<String>, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.write().await;
        let Some(fields) = users.get_mut(&self.user) else {
            return Ok(None);
        };
        let removed = fields.remove(&field);
        if fields.is_empty() {
            users.remove(&self.user);
        }
        Ok(removed)
    }
}
