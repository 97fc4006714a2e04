use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use proswipe_application::LoginPolicy;
use serde::Deserialize;
use thiserror::Error;

use super::constants::{self, defaults, env};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_in_millis: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            timeout_in_millis: defaults::API_TIMEOUT_IN_MILLIS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginSettings {
    pub capability_debounce_in_millis: u64,
    pub second_factor_window_in_seconds: u64,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            capability_debounce_in_millis: defaults::CAPABILITY_DEBOUNCE_IN_MILLIS,
            second_factor_window_in_seconds: defaults::SECOND_FACTOR_WINDOW_IN_SECONDS,
        }
    }
}

/// Client configuration: built-in defaults, then an optional JSON file, then
/// `PROSWIPE__*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api: ApiSettings,
    pub login: LoginSettings,
}

impl ClientSettings {
    /// Loads `.env` if present, then reads the file named by `PROSWIPE_CONFIG`
    /// (or `proswipe.json` in the working directory).
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        let path = std::env::var(env::CONFIG_PATH_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(constants::DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        Self::build(path, environment())
    }

    fn build(path: &Path, environment: Environment) -> Result<Self, SettingsError> {
        let settings: Self = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Json).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        tracing::debug!(?settings, "Loaded client settings");
        Ok(settings)
    }

    pub fn login_policy(&self) -> LoginPolicy {
        LoginPolicy {
            capability_debounce: Duration::from_millis(self.login.capability_debounce_in_millis),
            second_factor_window: Duration::from_secs(self.login.second_factor_window_in_seconds),
            biometric_prompt: constants::BIOMETRIC_PROMPT.to_string(),
        }
    }

    pub fn http_client(&self) -> Result<reqwest::Client, SettingsError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_millis(self.api.timeout_in_millis))
            .build()?)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(env::ENV_PREFIX)
        .prefix_separator(env::ENV_SEPARATOR)
        .separator(env::ENV_SEPARATOR)
        .try_parsing(true)
}
