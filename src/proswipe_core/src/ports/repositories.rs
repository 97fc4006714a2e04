use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{identity::Identity, role::Role};

// CredentialStore port trait and errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialStoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Device-local persistence of the last-used identity and the per-email active role.
///
/// Survives app restarts. Nothing secret goes through this port; biometric unlock
/// material is held by the platform's [`BiometricService`](crate::BiometricService).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn last_identity(&self) -> Result<Option<Identity>, CredentialStoreError>;
    async fn remember_identity(&self, identity: Identity) -> Result<(), CredentialStoreError>;
    async fn active_role(&self, email: &str) -> Result<Option<Role>, CredentialStoreError>;
    async fn remember_active_role(
        &self,
        email: &str,
        role: Role,
    ) -> Result<(), CredentialStoreError>;
}
