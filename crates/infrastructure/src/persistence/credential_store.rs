//! File-based credential store implementation.
//!
//! All users share one JSON file; each store handle reads and writes only
//! the entry of its own user. The file holds live tokens and must not be
//! committed or shared.
//!
//! Writes are read-modify-write cycles on the whole file. Every handle on
//! the same path within a process shares one lock, so handles for different
//! users do not overwrite each other. Separate processes are not
//! coordinated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError};

use async_trait::async_trait;
use forcepull_application::ports::{CredentialStore, FileSystem, StoreError};
use forcepull_domain::{Credential, CredentialField, CredentialFile};
use tokio::sync::Mutex;

type PathLocks = std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>;

static PATH_LOCKS: LazyLock<PathLocks> = LazyLock::new(PathLocks::default);

/// The write lock shared by every store on `path` in this process.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

use crate::serialization::{from_json, to_json_stable_bytes};

/// File-based credential store.
///
/// Stores credentials in a single file:
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
#[derive(Debug)]
pub struct FileCredentialStore<F> {
    fs: F,
    path: PathBuf,
    user: String,
    write_lock: Arc<Mutex<()>>,
}

impl<F: FileSystem> FileCredentialStore<F> {
    /// Creates a store for `user` backed by the file at `path`.
    pub fn new(fs: F, path: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            fs,
            write_lock: path_lock(&path),
            path,
            user: user.into(),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_file(&self) -> Result<CredentialFile, StoreError> {
        if !self.fs.exists(&self.path).await {
            return Ok(CredentialFile::new());
        }
        let content = self.fs.read_file_string(&self.path).await?;
        from_json(&content).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn save_file(&self, file: &CredentialFile) -> Result<(), StoreError> {
        let content =
            to_json_stable_bytes(file).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.fs.write_file(&self.path, &content).await?;
        Ok(())
    }
}

#[async_trait]
impl<F: FileSystem> CredentialStore for FileCredentialStore<F> {
    fn user(&self) -> &str {
        &self.user
    }

    async fn get(&self, field: CredentialField) -> Result<Option<String>, StoreError> {
        // Writes truncate before filling the file
        let _guard = self.write_lock.lock().await;
        let file = self.load_file().await?;
        Ok(file.get(&self.user, field).map(String::from))
    }

    async fn set(&self, field: CredentialField, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load_file().await?;
        file.set(&self.user, field, value);
        self.save_file(&file).await?;
        tracing::debug!(user = %self.user, %field, "credential field written");
        Ok(())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load_file().await?;
        file.put(&self.user, credential);
        self.save_file(&file).await?;
        tracing::debug!(user = %self.user, "credential written");
        Ok(())
    }

    async fn remove(&self, field: CredentialField) -> Result<Option<String>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load_file().await?;
        let removed = file.remove(&self.user, field);
        if removed.is_some() {
            self.save_file(&file).await?;
            tracing::debug!(user = %self.user, %field, "credential field removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::TokioFileSystem;
    use forcepull_domain::Credential;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir, user: &str) -> FileCredentialStore<TokioFileSystem> {
        FileCredentialStore::new(
            TokioFileSystem::new(),
            dir.path().join("forcepull").join("credentials.json"),
            user,
        )
    }

    #[tokio::test]
    async fn test_missing_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "alice");
        assert_eq!(store.load().await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_values_persist_across_handles() {
        let dir = TempDir::new().unwrap();
        let writer = store(&dir, "alice");
        writer
            .set(CredentialField::InstanceUrl, "https://na9.salesforce.com")
            .await
            .unwrap();
        writer.set(CredentialField::AccessToken, "acc").await.unwrap();
        writer.set(CredentialField::RefreshToken, "ref").await.unwrap();

        let reader = store(&dir, "alice");
        assert_eq!(
            reader.load().await.unwrap(),
            Some(Credential::new(
                "https://na9.salesforce.com",
                "acc",
                Some("ref".to_string())
            ))
        );
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let dir = TempDir::new().unwrap();
        let alice = store(&dir, "alice");
        let bob = store(&dir, "bob");

        alice.set(CredentialField::AccessToken, "a").await.unwrap();
        bob.set(CredentialField::AccessToken, "b").await.unwrap();
        alice.clear().await.unwrap();

        assert_eq!(alice.get(CredentialField::AccessToken).await.unwrap(), None);
        assert_eq!(
            bob.get(CredentialField::AccessToken).await.unwrap().as_deref(),
            Some("b")
        );
    }

    #[tokio::test]
    async fn test_save_replaces_entry_in_one_write() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "alice");
        store
            .save(&Credential::new("https://old", "old", Some("old-ref".to_string())))
            .await
            .unwrap();

        let fresh = Credential::new("https://na9.salesforce.com", "acc", None);
        store.save(&fresh).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(fresh));
        assert_eq!(store.get(CredentialField::RefreshToken).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_handles_for_different_users_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let alice = Arc::new(store(&dir, "alice"));
        let bob = Arc::new(store(&dir, "bob"));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let alice = Arc::clone(&alice);
            let bob = Arc::clone(&bob);
            tasks.push(tokio::spawn(async move {
                alice
                    .set(CredentialField::AccessToken, &format!("a-{i}"))
                    .await
                    .unwrap();
            }));
            let reader = Arc::clone(&bob);
            tasks.push(tokio::spawn(async move {
                bob.set(CredentialField::InstanceUrl, &format!("https://b-{i}"))
                    .await
                    .unwrap();
            }));
            tasks.push(tokio::spawn(async move {
                reader.get(CredentialField::InstanceUrl).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(alice.get(CredentialField::AccessToken).await.unwrap().is_some());
        assert!(bob.get(CredentialField::InstanceUrl).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "alice");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(
            store.get(CredentialField::AccessToken).await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_file_uses_fixed_property_names() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir, "alice");
        store.set(CredentialField::AccessToken, "acc").await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"SALESFORCE_OAUTH_TOKEN\": \"acc\""));
        assert!(content.ends_with('\n'));
    }
}
