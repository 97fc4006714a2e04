pub mod env {
    pub const CONFIG_PATH_ENV_VAR: &str = "PROSWIPE_CONFIG";
    pub const ENV_PREFIX: &str = "PROSWIPE";
    pub const ENV_SEPARATOR: &str = "__";
}

pub const DEFAULT_CONFIG_FILE: &str = "proswipe.json";
pub const BIOMETRIC_PROMPT: &str = "Sign in to ProSwipe";

pub mod defaults {
    pub const API_BASE_URL: &str = "http://localhost:3000";
    pub const API_TIMEOUT_IN_MILLIS: u64 = 10_000;
    pub const CAPABILITY_DEBOUNCE_IN_MILLIS: u64 = 500;
    pub const SECOND_FACTOR_WINDOW_IN_SECONDS: u64 = 300;
}
