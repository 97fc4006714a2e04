use secrecy::Secret;

use super::{email::Email, session::AccessToken, session::UserProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricAvailability {
    Available,
    Unavailable { reason: String },
}

impl BiometricAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, BiometricAvailability::Available)
    }
}

/// Whether a device holds biometric unlock material for an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricEnrollment {
    pub email: String,
    pub has_stored_credential: bool,
}

/// Device-bound unlock material written after a successful password login.
///
/// `enrollment_token` is the access token that was current when the material was
/// stored. It is kept for bookkeeping only and must never be handed out as a session
/// token: biometric unlock always re-authenticates against the backend.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub email: Email,
    pub user: UserProfile,
    pub enrollment_token: AccessToken,
    pub unlock_secret: Secret<String>,
}
