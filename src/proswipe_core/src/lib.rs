pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    biometric::{BiometricAvailability, BiometricEnrollment, StoredCredential},
    capabilities::{AccountId, AccountKind, Capabilities},
    email::Email,
    identity::Identity,
    password::Password,
    pending::{LoginPath, PendingSecondFactor, PendingSessionId},
    profile::{AccountTypeProfile, ContractorDetails, ProfileData, ProfileError},
    role::Role,
    session::{AccessToken, RefreshToken, Session, UserProfile},
    two_fa_code::{TwoFaCode, TwoFaCodeError},
    validation::ValidationError,
};

pub use ports::{
    repositories::{CredentialStore, CredentialStoreError},
    services::{
        ApiError, AuthService, BiometricError, BiometricService, CapabilityApi, LoginHandler,
        LoginReply, SignUpRequest, VerifiedSession,
    },
};
