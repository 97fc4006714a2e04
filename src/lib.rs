//! # ProSwipe - sign-in and session establishment
//!
//! Facade crate re-exporting the public API of the login flow components.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `Role`, `Capabilities`, `Session`, etc.
//! - **Ports**: `AuthService`, `CapabilityApi`, `BiometricService`, `CredentialStore`, `LoginHandler`
//! - **Use cases**: `CapabilityResolver`, `AuthenticationChallenge`, `SessionEstablisher`, `SignUpUseCase`
//! - **Adapters**: `HttpBackendClient`, `InMemoryCredentialStore`, `JsonFileCredentialStore`,
//!   `MockBiometricService`, `ClientSettings`

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use proswipe_core::*;
}

pub use proswipe_core::{
    AccessToken, AccountId, AccountKind, AccountTypeProfile, BiometricAvailability, Capabilities,
    Email, Identity, LoginPath, Password, PendingSecondFactor, PendingSessionId, ProfileData,
    RefreshToken, Role, Session, StoredCredential, TwoFaCode, UserProfile, ValidationError,
};

// ============================================================================
// Ports
// ============================================================================

pub use proswipe_core::{
    ApiError, AuthService, BiometricError, BiometricService, CapabilityApi, CredentialStore,
    CredentialStoreError, LoginHandler, LoginReply,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use proswipe_application::*;
}

pub use proswipe_application::{
    AuthenticationChallenge, BiometricOffer, CapabilityResolver, ChallengeOutcome, Credentials,
    LoginError, LoginPolicy, LoginProgress, LoginState, ResolutionOutcome, SessionEstablisher,
    SignUpForm, SignUpRole, SignUpUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    pub use proswipe_adapters::{biometric, config, http, persistence, telemetry};
}

pub use proswipe_adapters::{
    ClientSettings, HttpBackendClient, InMemoryCredentialStore, JsonFileCredentialStore,
    MockBiometricService, init_tracing,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the ports
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};
