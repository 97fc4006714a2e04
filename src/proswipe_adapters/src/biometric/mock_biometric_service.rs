use std::sync::Arc;

use dashmap::DashMap;
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;

use proswipe_core::{
    AccessToken, BiometricAvailability, BiometricError, BiometricService, Email, Password,
    StoredCredential, UserProfile,
};

/// In-process stand-in for the platform biometric prompt and its secure storage.
///
/// Used by tests and by hosts without a biometric sensor. The prompt always passes
/// unless a failure has been scripted with [`MockBiometricService::fail_next_prompt`].
#[derive(Clone)]
pub struct MockBiometricService {
    availability: Arc<RwLock<BiometricAvailability>>,
    credentials: Arc<DashMap<String, StoredCredential>>,
    next_prompt_failure: Arc<RwLock<Option<BiometricError>>>,
}

impl Default for MockBiometricService {
    fn default() -> Self {
        Self::new(BiometricAvailability::Available)
    }
}

impl MockBiometricService {
    pub fn new(availability: BiometricAvailability) -> Self {
        Self {
            availability: Arc::new(RwLock::new(availability)),
            credentials: Arc::new(DashMap::new()),
            next_prompt_failure: Arc::new(RwLock::new(None)),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(BiometricAvailability::Unavailable {
            reason: reason.into(),
        })
    }

    pub async fn set_availability(&self, availability: BiometricAvailability) {
        *self.availability.write().await = availability;
    }

    /// The next prompt fails with `error` instead of releasing the credential.
    pub async fn fail_next_prompt(&self, error: BiometricError) {
        *self.next_prompt_failure.write().await = Some(error);
    }

    /// The access token that was current when the credential for `email` was stored.
    pub fn enrollment_token(&self, email: &Email) -> Option<AccessToken> {
        self.credentials
            .get(&key(email))
            .map(|stored| stored.enrollment_token.clone())
    }
}

fn key(email: &Email) -> String {
    email.as_ref().expose_secret().trim().to_lowercase()
}

#[async_trait::async_trait]
impl BiometricService for MockBiometricService {
    async fn is_available(&self) -> Result<BiometricAvailability, BiometricError> {
        Ok(self.availability.read().await.clone())
    }

    async fn check_user_biometric_setting(&self, email: &Email) -> Result<bool, BiometricError> {
        Ok(self.credentials.contains_key(&key(email)))
    }

    async fn get_stored_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, BiometricError> {
        Ok(self
            .credentials
            .get(&key(email))
            .map(|stored| stored.clone()))
    }

    async fn store_credentials(
        &self,
        email: &Email,
        user: &UserProfile,
        token: &AccessToken,
        password: &Password,
    ) -> Result<(), BiometricError> {
        let availability = self.availability.read().await.clone();
        if let BiometricAvailability::Unavailable { reason } = availability {
            return Err(BiometricError::Unavailable(reason));
        }
        self.credentials.insert(
            key(email),
            StoredCredential {
                email: email.clone(),
                user: user.clone(),
                enrollment_token: token.clone(),
                unlock_secret: Secret::new(password.as_ref().expose_secret().clone()),
            },
        );
        Ok(())
    }

    async fn clear_stored_credentials(&self, email: &Email) -> Result<(), BiometricError> {
        self.credentials.remove(&key(email));
        Ok(())
    }

    async fn unlock_stored_credentials(
        &self,
        email: &Email,
        _prompt: &str,
    ) -> Result<StoredCredential, BiometricError> {
        let availability = self.availability.read().await.clone();
        if let BiometricAvailability::Unavailable { reason } = availability {
            return Err(BiometricError::Unavailable(reason));
        }
        if let Some(error) = self.next_prompt_failure.write().await.take() {
            return Err(error);
        }
        self.credentials
            .get(&key(email))
            .map(|stored| stored.clone())
            .ok_or(BiometricError::NotEnrolled)
    }
}
