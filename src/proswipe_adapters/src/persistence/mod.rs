pub mod in_memory_credential_store;
pub mod json_file_credential_store;

pub use in_memory_credential_store::InMemoryCredentialStore;
pub use json_file_credential_store::JsonFileCredentialStore;

/// Stored emails are keyed case-insensitively.
pub(crate) fn role_key(email: &str) -> String {
    email.trim().to_lowercase()
}
