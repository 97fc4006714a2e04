use std::time::Duration;

pub const DEFAULT_CAPABILITY_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_SECOND_FACTOR_WINDOW: Duration = Duration::from_secs(300);
pub const DEFAULT_BIOMETRIC_PROMPT: &str = "Sign in to ProSwipe";

/// Tunables of the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPolicy {
    /// Quiet period on the email field before a capability lookup is sent.
    pub capability_debounce: Duration,
    /// Assumed lifetime of a pending second factor when the backend does not say.
    pub second_factor_window: Duration,
    /// Text shown by the OS biometric prompt.
    pub biometric_prompt: String,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            capability_debounce: DEFAULT_CAPABILITY_DEBOUNCE,
            second_factor_window: DEFAULT_SECOND_FACTOR_WINDOW,
            biometric_prompt: DEFAULT_BIOMETRIC_PROMPT.to_string(),
        }
    }
}
