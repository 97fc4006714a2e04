pub mod authentication_challenge;
pub mod capability_resolver;
pub mod login_state;
pub mod session_establisher;
pub mod sign_up;
