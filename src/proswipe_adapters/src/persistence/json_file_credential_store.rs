use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use proswipe_core::{CredentialStore, CredentialStoreError, Identity, Role};

use super::role_key;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreFile {
    last_identity: Option<Identity>,
    active_roles: BTreeMap<String, Role>,
}

/// Credential store backed by a single JSON document on disk.
///
/// Every write rewrites the whole file through a sibling temp file and a rename, so a
/// crash mid-write leaves the previous document intact. A missing file reads as empty.
pub struct JsonFileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoreFile, CredentialStoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(e) => return Err(CredentialStoreError::Unavailable(e.to_string())),
        };
        serde_json::from_slice(&raw).map_err(|e| CredentialStoreError::Corrupt(e.to_string()))
    }

    async fn write(&self, file: &StoreFile) -> Result<(), CredentialStoreError> {
        let raw = serde_json::to_vec_pretty(file)
            .map_err(|e| CredentialStoreError::Unavailable(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialStoreError::Unavailable(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| CredentialStoreError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CredentialStoreError::Unavailable(e.to_string()))
    }

    async fn update<F>(&self, change: F) -> Result<(), CredentialStoreError>
    where
        F: FnOnce(&mut StoreFile),
    {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await?;
        change(&mut file);
        self.write(&file).await
    }
}

#[async_trait::async_trait]
impl CredentialStore for JsonFileCredentialStore {
    async fn last_identity(&self) -> Result<Option<Identity>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.last_identity)
    }

    #[tracing::instrument(name = "JsonFileCredentialStore::remember_identity", skip_all)]
    async fn remember_identity(&self, identity: Identity) -> Result<(), CredentialStoreError> {
        self.update(|file| file.last_identity = Some(identity)).await
    }

    async fn active_role(&self, email: &str) -> Result<Option<Role>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.active_roles.get(&role_key(email)).copied())
    }

    #[tracing::instrument(name = "JsonFileCredentialStore::remember_active_role", skip(self, email))]
    async fn remember_active_role(
        &self,
        email: &str,
        role: Role,
    ) -> Result<(), CredentialStoreError> {
        let key = role_key(email);
        self.update(|file| {
            file.active_roles.insert(key, role);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileCredentialStore {
        JsonFileCredentialStore::new(dir.path().join("credentials.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.last_identity().await.unwrap().is_none());
        assert_eq!(store.active_role("a@b.co").await.unwrap(), None);
    }

    #[tokio::test]
    async fn state_survives_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .remember_identity(Identity::new("dual@example.com"))
            .await
            .unwrap();
        store
            .remember_active_role("dual@example.com", Role::Contractor)
            .await
            .unwrap();

        let reopened = store_in(&dir);
        let identity = reopened.last_identity().await.unwrap().unwrap();
        assert_eq!(identity.email, "dual@example.com");
        assert_eq!(
            reopened.active_role("DUAL@example.com").await.unwrap(),
            Some(Role::Contractor)
        );
    }

    #[tokio::test]
    async fn roles_for_other_emails_are_kept() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .remember_active_role("a@example.com", Role::Homeowner)
            .await
            .unwrap();
        store
            .remember_active_role("b@example.com", Role::Contractor)
            .await
            .unwrap();

        assert_eq!(
            store.active_role("a@example.com").await.unwrap(),
            Some(Role::Homeowner)
        );
        assert!(!dir.path().join("credentials.json.tmp").exists());
    }

    #[tokio::test]
    async fn garbage_file_is_reported_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), b"{ not json").unwrap();

        let result = store.last_identity().await;

        assert!(matches!(result, Err(CredentialStoreError::Corrupt(_))));
    }

    #[tokio::test]
    async fn nested_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileCredentialStore::new(dir.path().join("app").join("state.json"));

        store
            .remember_identity(Identity::new("a@example.com"))
            .await
            .unwrap();

        assert!(dir.path().join("app").join("state.json").exists());
    }
}
