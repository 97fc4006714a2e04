use proswipe_core::{ApiError, BiometricError, ProfileError, Role, TwoFaCodeError, ValidationError};

/// Everything that can go wrong while establishing a session.
///
/// The `Display` text is the single user-facing message for the failing step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid verification code. Please try again.")]
    InvalidCode,
    #[error("Please enter a 6-digit verification code")]
    MalformedCode,
    #[error("Your verification code has expired. Please sign in again.")]
    SecondFactorExpired,
    #[error("This account is locked. Please try again later.")]
    AccountLocked,
    #[error("Sign in with your password to enable biometric authentication for next time")]
    NoStoredCredential,
    #[error("Biometric authentication is not available: {0}")]
    BiometricUnavailable(String),
    #[error("Biometric sign-in was cancelled")]
    BiometricCancelled,
    #[error("Biometric login failed: {0}")]
    BiometricFailed(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Choose whether to sign in as a homeowner or a professional")]
    RoleNotResolved,
    #[error("This account is not enabled as a {0}")]
    RoleNotEnabled(Role),
    #[error("Could not load account details: {0}")]
    CapabilityLookupFailed(String),
    #[error("Switching roles requires an account with both roles enabled")]
    RoleSwitchNotAllowed,
    #[error("{0}")]
    InvalidInput(String),
    #[error("A sign-in attempt is already in progress")]
    AttemptInProgress,
    #[error("No verification is pending")]
    NotAwaitingSecondFactor,
    #[error("This verification request is no longer active")]
    UnknownPendingSession,
    #[error("Already signed in")]
    AlreadyAuthenticated,
    #[error("Please sign in first")]
    NotAuthenticated,
    #[error("Adding an account type is not available for this account")]
    ProvisioningNotAvailable,
    #[error("Please confirm before enabling a new role")]
    ConfirmationRequired,
    #[error("Your change was saved but your account could not be refreshed: {0}")]
    CapabilityRefreshFailed(String),
    #[error("Operation not allowed right now")]
    InvalidState,
    #[error("{0}")]
    ServiceError(String),
}

impl LoginError {
    /// Failures that can be retried as-is, without counting as a wrong credential.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LoginError::NetworkError(_)
                | LoginError::CapabilityLookupFailed(_)
                | LoginError::CapabilityRefreshFailed(_)
        )
    }

    /// Biometric failures always leave the password path open.
    pub fn offers_password_fallback(&self) -> bool {
        matches!(
            self,
            LoginError::NoStoredCredential
                | LoginError::BiometricUnavailable(_)
                | LoginError::BiometricCancelled
                | LoginError::BiometricFailed(_)
        )
    }

    /// Local precondition violations that the UI shows as a disabled submit button
    /// rather than an error banner.
    pub fn blocks_submission(&self) -> bool {
        matches!(self, LoginError::RoleNotResolved)
    }
}

impl From<ApiError> for LoginError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::InvalidCredentials => LoginError::InvalidCredentials,
            ApiError::InvalidCode => LoginError::InvalidCode,
            ApiError::AccountLocked => LoginError::AccountLocked,
            ApiError::Expired => LoginError::SecondFactorExpired,
            ApiError::Network(message) => LoginError::NetworkError(message),
            ApiError::NotFound => LoginError::ServiceError("Account not found".to_string()),
            ApiError::Rejected(message) | ApiError::Unexpected(message) => {
                LoginError::ServiceError(message)
            }
        }
    }
}

impl From<BiometricError> for LoginError {
    fn from(error: BiometricError) -> Self {
        match error {
            BiometricError::Unavailable(reason) => LoginError::BiometricUnavailable(reason),
            BiometricError::NotEnrolled => LoginError::NoStoredCredential,
            BiometricError::Cancelled => LoginError::BiometricCancelled,
            BiometricError::Failed(message) | BiometricError::Storage(message) => {
                LoginError::BiometricFailed(message)
            }
        }
    }
}

impl From<ValidationError> for LoginError {
    fn from(error: ValidationError) -> Self {
        LoginError::InvalidInput(error.to_string())
    }
}

impl From<ProfileError> for LoginError {
    fn from(error: ProfileError) -> Self {
        LoginError::InvalidInput(error.to_string())
    }
}

impl From<TwoFaCodeError> for LoginError {
    fn from(_: TwoFaCodeError) -> Self {
        LoginError::MalformedCode
    }
}
