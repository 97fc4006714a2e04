use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    biometric::{BiometricAvailability, StoredCredential},
    capabilities::{AccountId, Capabilities},
    email::Email,
    password::Password,
    pending::PendingSessionId,
    profile::ProfileData,
    role::Role,
    session::{AccessToken, RefreshToken, UserProfile},
    two_fa_code::TwoFaCode,
};

/// Failures reported by the backend ports, already classified by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("Account locked")]
    AccountLocked,
    #[error("Verification window expired")]
    Expired,
    #[error("Not found")]
    NotFound,
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Outcome of a credential exchange that did not fail.
#[derive(Debug, Clone)]
pub enum LoginReply {
    Authenticated {
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        user: UserProfile,
    },
    SecondFactorRequired {
        pending_session_id: PendingSessionId,
        expires_within: Option<Duration>,
    },
}

#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub user: UserProfile,
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: Email,
    pub password: Password,
    pub role: Role,
    pub full_name: String,
    pub phone: String,
    pub enable_both_roles: bool,
}

/// Port for the backend's authentication endpoints.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(
        &self,
        email: &Email,
        password: &Password,
        biometric_hint: bool,
        role: Option<Role>,
    ) -> Result<LoginReply, ApiError>;

    async fn verify_2fa(
        &self,
        email: &Email,
        code: &TwoFaCode,
        pending_session_id: &PendingSessionId,
    ) -> Result<VerifiedSession, ApiError>;

    /// Exchanges unlock material released by the biometric prompt for a fresh session.
    async fn biometric_login(
        &self,
        email: &Email,
        credential: &StoredCredential,
        role: Option<Role>,
    ) -> Result<LoginReply, ApiError>;

    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ApiError>;
}

/// Port for the capability and role endpoints.
#[async_trait]
pub trait CapabilityApi: Send + Sync {
    /// `Ok(None)` when no account exists for the email.
    async fn user_capabilities(&self, email: &str) -> Result<Option<Capabilities>, ApiError>;

    async fn switch_user_type(&self, account_id: &AccountId, role: Role) -> Result<(), ApiError>;

    async fn enable_user_type(
        &self,
        account_id: &AccountId,
        role: Role,
        verified: bool,
    ) -> Result<(), ApiError>;

    async fn add_account_type(
        &self,
        account_id: &AccountId,
        role: Role,
        profile: &ProfileData,
    ) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BiometricError {
    #[error("Biometric authentication is not available: {0}")]
    Unavailable(String),
    #[error("No biometric credentials stored for this account")]
    NotEnrolled,
    #[error("Biometric prompt cancelled")]
    Cancelled,
    #[error("Biometric authentication failed: {0}")]
    Failed(String),
    #[error("Secure storage error: {0}")]
    Storage(String),
}

/// Port for the platform biometric capability and its secure credential storage.
#[async_trait]
pub trait BiometricService: Send + Sync {
    /// An `Err` means the platform could not be asked at all.
    async fn is_available(&self) -> Result<BiometricAvailability, BiometricError>;

    async fn check_user_biometric_setting(&self, email: &Email) -> Result<bool, BiometricError>;

    async fn get_stored_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, BiometricError>;

    async fn store_credentials(
        &self,
        email: &Email,
        user: &UserProfile,
        token: &AccessToken,
        password: &Password,
    ) -> Result<(), BiometricError>;

    async fn clear_stored_credentials(&self, email: &Email) -> Result<(), BiometricError>;

    /// Shows the OS prompt and, once the user passes it, releases the stored material.
    ///
    /// May wait indefinitely on the user; callers cancel by dropping the future.
    async fn unlock_stored_credentials(
        &self,
        email: &Email,
        prompt: &str,
    ) -> Result<StoredCredential, BiometricError>;
}

/// Receives the established session. Called exactly once per successful login.
pub trait LoginHandler: Send + Sync {
    fn on_login(&self, user: &UserProfile, access_token: &AccessToken);
}
