use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{email::Email, password::Password, role::Role};

/// Server-issued identifier of a login awaiting its second factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingSessionId(String);

impl PendingSessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PendingSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which credential started a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPath {
    Password,
    Biometric,
}

/// A login parked between "second factor required" and its verification.
///
/// Lives only in memory: an app restart forces the user back to credential entry.
#[derive(Debug, Clone)]
pub struct PendingSecondFactor {
    pending_session_id: PendingSessionId,
    email: Email,
    role: Option<Role>,
    path: LoginPath,
    password: Option<Password>,
    issued_at: DateTime<Utc>,
    expires_within: Duration,
}

impl PendingSecondFactor {
    pub fn new(
        pending_session_id: PendingSessionId,
        email: Email,
        role: Option<Role>,
        path: LoginPath,
        expires_within: Duration,
    ) -> Self {
        Self {
            pending_session_id,
            email,
            role,
            path,
            password: None,
            issued_at: Utc::now(),
            expires_within,
        }
    }

    /// Keeps the password of a password-path login so biometric unlock material can
    /// be enrolled once the second factor succeeds.
    pub fn with_password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }

    pub fn pending_session_id(&self) -> &PendingSessionId {
        &self.pending_session_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn path(&self) -> LoginPath {
        self.path
    }

    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_within(&self) -> Duration {
        self.expires_within
    }
}
