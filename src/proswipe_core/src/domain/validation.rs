use thiserror::Error;

/// Local form validation failures, raised before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("Full name is required")]
    FullNameRequired,
    #[error("Phone number is required")]
    PhoneRequired,
}
