use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use proswipe_core::{CredentialStore, CredentialStoreError, Identity, Role};

use super::role_key;

/// Process-local credential store. Nothing survives a restart.
#[derive(Default, Clone)]
pub struct InMemoryCredentialStore {
    last_identity: Arc<RwLock<Option<Identity>>>,
    active_roles: Arc<DashMap<String, Role>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn last_identity(&self) -> Result<Option<Identity>, CredentialStoreError> {
        Ok(self.last_identity.read().await.clone())
    }

    async fn remember_identity(&self, identity: Identity) -> Result<(), CredentialStoreError> {
        *self.last_identity.write().await = Some(identity);
        Ok(())
    }

    async fn active_role(&self, email: &str) -> Result<Option<Role>, CredentialStoreError> {
        Ok(self.active_roles.get(&role_key(email)).map(|role| *role))
    }

    async fn remember_active_role(
        &self,
        email: &str,
        role: Role,
    ) -> Result<(), CredentialStoreError> {
        self.active_roles.insert(role_key(email), role);
        Ok(())
    }
}
