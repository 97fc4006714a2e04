//! JSON bodies exchanged with the backend.

use std::time::Duration;

use proswipe_core::{
    AccessToken, AccountId, ApiError, Capabilities, LoginReply, PendingSessionId, ProfileData,
    RefreshToken, Role, UserProfile, VerifiedSession,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub biometric_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<Role>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BiometricLoginRequest<'a> {
    pub email: &'a str,
    pub unlock_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<Role>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyTwoFaRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
    pub pending_session_id: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignUpBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub user_type: Role,
    pub full_name: &'a str,
    pub phone: &'a str,
    pub enable_both_types: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SwitchUserTypeRequest<'a> {
    pub user_id: &'a str,
    pub new_active_type: Role,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnableUserTypeRequest<'a> {
    pub user_id: &'a str,
    pub type_to_enable: Role,
    pub verified: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddAccountTypeRequest<'a> {
    pub user_id: &'a str,
    pub account_type: Role,
    pub profile_data: &'a ProfileData,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SessionTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Reply of the login, biometric login and 2FA endpoints.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SessionResponse {
    pub success: Option<bool>,
    pub requires_two_factor: bool,
    pub pending_session_id: Option<String>,
    /// Seconds left to submit the second factor.
    pub expires_in: Option<u64>,
    pub session: Option<SessionTokens>,
    pub user: Option<UserProfile>,
    pub error: Option<String>,
}

impl SessionResponse {
    pub fn into_login_reply(self) -> Result<LoginReply, ApiError> {
        if self.requires_two_factor {
            let pending_session_id = self.pending_session_id.ok_or_else(|| {
                ApiError::Unexpected("second factor required without a pending session".into())
            })?;
            return Ok(LoginReply::SecondFactorRequired {
                pending_session_id: PendingSessionId::new(pending_session_id),
                expires_within: self.expires_in.map(Duration::from_secs),
            });
        }

        let verified = self.into_verified_session()?;
        Ok(LoginReply::Authenticated {
            access_token: verified.access_token,
            refresh_token: verified.refresh_token,
            user: verified.user,
        })
    }

    pub fn into_verified_session(self) -> Result<VerifiedSession, ApiError> {
        if self.success == Some(false) {
            return Err(ApiError::Rejected(
                self.error.unwrap_or_else(|| "Login failed".to_string()),
            ));
        }
        match (self.session, self.user) {
            (Some(session), Some(user)) => Ok(VerifiedSession {
                access_token: AccessToken::new(session.access_token),
                refresh_token: session.refresh_token.map(RefreshToken::new),
                user,
            }),
            _ => Err(ApiError::Unexpected(
                "response carried no session".to_string(),
            )),
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct CapabilityRecord {
    pub id: String,
    #[serde(default)]
    pub is_homeowner: bool,
    #[serde(default)]
    pub is_contractor: bool,
    #[serde(default)]
    pub active_user_type: Option<Role>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct CapabilitiesResponse {
    #[serde(default)]
    pub capabilities: Option<CapabilityRecord>,
}

impl From<CapabilityRecord> for Capabilities {
    fn from(record: CapabilityRecord) -> Self {
        Capabilities::new(
            AccountId::new(record.id),
            record.is_homeowner,
            record.is_contractor,
            record.active_user_type,
        )
    }
}

/// Body of endpoints that only acknowledge.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct Ack {
    pub success: Option<bool>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl Ack {
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.success == Some(false) {
            return Err(ApiError::Rejected(
                self.error
                    .or(self.message)
                    .unwrap_or_else(|| "Request rejected".to_string()),
            ));
        }
        Ok(())
    }
}

/// Error body of a non-2xx reply.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
