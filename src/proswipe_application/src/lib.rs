pub mod error;
pub mod policy;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use error::LoginError;
pub use policy::LoginPolicy;
pub use use_cases::{
    authentication_challenge::{
        AuthenticationChallenge, ChallengeOutcome, Credentials, effective_role,
    },
    capability_resolver::{
        CapabilityResolver, LookupRequest, Resolution, ResolutionOutcome, UnknownReason,
    },
    login_state::{Attempt, LoginEvent, LoginState, ResolvedAccount},
    session_establisher::{BiometricOffer, LoginProgress, SessionEstablisher},
    sign_up::{SignUpForm, SignUpRole, SignUpUseCase},
};
