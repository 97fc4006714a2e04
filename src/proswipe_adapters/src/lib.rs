pub mod biometric;
pub mod config;
pub mod http;
pub mod persistence;
pub mod telemetry;

pub use biometric::MockBiometricService;
pub use config::{ClientSettings, SettingsError};
pub use http::HttpBackendClient;
pub use persistence::{InMemoryCredentialStore, JsonFileCredentialStore};
pub use telemetry::init_tracing;
