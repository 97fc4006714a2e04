use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{capabilities::AccountId, role::Role};

#[derive(Debug, Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }
}

impl AsRef<Secret<String>> for AccessToken {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

#[derive(Debug, Clone)]
pub struct RefreshToken(Secret<String>);

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }
}

impl AsRef<Secret<String>> for RefreshToken {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// The user record returned alongside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: AccountId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user_type: Option<Role>,
}

/// The terminal artifact of a successful login.
///
/// Sessions are never mutated once created; a new login replaces them wholesale.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    user: UserProfile,
    resolved_role: Role,
}

impl Session {
    pub fn new(
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        user: UserProfile,
        resolved_role: Role,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            user,
            resolved_role,
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn resolved_role(&self) -> Role {
        self.resolved_role
    }
}
