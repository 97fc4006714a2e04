use async_trait::async_trait;
use proswipe_core::{
    AccountId, ApiError, AuthService, Capabilities, CapabilityApi, Email, LoginReply, Password,
    PendingSessionId, ProfileData, Role, SignUpRequest, StoredCredential, TwoFaCode,
    VerifiedSession,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::wire::{
    Ack, AddAccountTypeRequest, BiometricLoginRequest, CapabilitiesResponse,
    EnableUserTypeRequest, ErrorBody, LoginRequest, SessionResponse, SignUpBody,
    SwitchUserTypeRequest, VerifyTwoFaRequest,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const LOGIN_PATH: &str = "/auth/login";
const BIOMETRIC_LOGIN_PATH: &str = "/auth/biometric-login";
const VERIFY_TWO_FA_PATH: &str = "/auth/verify-2fa";
const SIGN_UP_PATH: &str = "/auth/signup";
const USER_CAPABILITIES_PATH: &str = "/auth/user-capabilities";
const SWITCH_USER_TYPE_PATH: &str = "/auth/switch-user-type";
const ENABLE_USER_TYPE_PATH: &str = "/auth/enable-user-type";
const ADD_ACCOUNT_TYPE_PATH: &str = "/auth/add-account-type";

/// How an endpoint's 400/401 replies should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Credentials,
    SecondFactor,
    Other,
}

/// Client for the marketplace backend's auth and capability endpoints.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpBackendClient {
    http_client: Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(base_url: String, http_client: Client) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = Url::parse(&self.base_url).map_err(|e| ApiError::Unexpected(e.to_string()))?;
        base.join(path)
            .map_err(|e| ApiError::Unexpected(e.to_string()))
    }

    async fn send<T>(&self, request: RequestBuilder, endpoint: Endpoint) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, ?endpoint, "Sending backend request");

        let response = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(%request_id, %status, "Backend rejected request");
            return Err(classify(status, &body, endpoint));
        }
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Unexpected(e.to_string()))
    }
}

fn classify(status: StatusCode, body: &str, endpoint: Endpoint) -> ApiError {
    let message = || {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| status.to_string())
    };

    match (status, endpoint) {
        (StatusCode::UNAUTHORIZED, Endpoint::Credentials) => ApiError::InvalidCredentials,
        (StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED, Endpoint::SecondFactor) => {
            ApiError::InvalidCode
        }
        (StatusCode::LOCKED, _) => ApiError::AccountLocked,
        (StatusCode::GONE, _) => ApiError::Expired,
        (StatusCode::NOT_FOUND, _) => ApiError::NotFound,
        (status, _) if status.is_client_error() => ApiError::Rejected(message()),
        _ => ApiError::Unexpected(message()),
    }
}

#[async_trait]
impl AuthService for HttpBackendClient {
    #[tracing::instrument(name = "HttpBackendClient::login", skip_all)]
    async fn login(
        &self,
        email: &Email,
        password: &Password,
        biometric_hint: bool,
        role: Option<Role>,
    ) -> Result<LoginReply, ApiError> {
        let body = LoginRequest {
            email: email.as_ref().expose_secret(),
            password: password.as_ref().expose_secret(),
            biometric_available: biometric_hint,
            user_type: role,
        };
        let request = self.http_client.post(self.url(LOGIN_PATH)?).json(&body);

        self.send::<SessionResponse>(request, Endpoint::Credentials)
            .await?
            .into_login_reply()
    }

    #[tracing::instrument(name = "HttpBackendClient::verify_2fa", skip_all)]
    async fn verify_2fa(
        &self,
        email: &Email,
        code: &TwoFaCode,
        pending_session_id: &PendingSessionId,
    ) -> Result<VerifiedSession, ApiError> {
        let body = VerifyTwoFaRequest {
            email: email.as_ref().expose_secret(),
            code: code.as_str(),
            pending_session_id: pending_session_id.as_str(),
        };
        let request = self
            .http_client
            .post(self.url(VERIFY_TWO_FA_PATH)?)
            .json(&body);

        self.send::<SessionResponse>(request, Endpoint::SecondFactor)
            .await?
            .into_verified_session()
    }

    #[tracing::instrument(name = "HttpBackendClient::biometric_login", skip_all)]
    async fn biometric_login(
        &self,
        email: &Email,
        credential: &StoredCredential,
        role: Option<Role>,
    ) -> Result<LoginReply, ApiError> {
        let body = BiometricLoginRequest {
            email: email.as_ref().expose_secret(),
            unlock_secret: credential.unlock_secret.expose_secret(),
            user_type: role,
        };
        let request = self
            .http_client
            .post(self.url(BIOMETRIC_LOGIN_PATH)?)
            .json(&body);

        self.send::<SessionResponse>(request, Endpoint::Credentials)
            .await?
            .into_login_reply()
    }

    #[tracing::instrument(name = "HttpBackendClient::sign_up", skip_all)]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ApiError> {
        let body = SignUpBody {
            email: request.email.as_ref().expose_secret(),
            password: request.password.as_ref().expose_secret(),
            user_type: request.role,
            full_name: &request.full_name,
            phone: &request.phone,
            enable_both_types: request.enable_both_roles,
        };
        let request = self.http_client.post(self.url(SIGN_UP_PATH)?).json(&body);

        self.send::<Ack>(request, Endpoint::Other)
            .await?
            .into_result()
    }
}

#[async_trait]
impl CapabilityApi for HttpBackendClient {
    #[tracing::instrument(name = "HttpBackendClient::user_capabilities", skip_all)]
    async fn user_capabilities(&self, email: &str) -> Result<Option<Capabilities>, ApiError> {
        let request = self
            .http_client
            .get(self.url(USER_CAPABILITIES_PATH)?)
            .query(&[("email", email)]);

        match self.send::<CapabilitiesResponse>(request, Endpoint::Other).await {
            Ok(response) => Ok(response.capabilities.map(Capabilities::from)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(name = "HttpBackendClient::switch_user_type", skip(self))]
    async fn switch_user_type(&self, account_id: &AccountId, role: Role) -> Result<(), ApiError> {
        let body = SwitchUserTypeRequest {
            user_id: account_id.as_str(),
            new_active_type: role,
        };
        let request = self
            .http_client
            .post(self.url(SWITCH_USER_TYPE_PATH)?)
            .json(&body);

        self.send::<Ack>(request, Endpoint::Other)
            .await?
            .into_result()
    }

    #[tracing::instrument(name = "HttpBackendClient::enable_user_type", skip(self))]
    async fn enable_user_type(
        &self,
        account_id: &AccountId,
        role: Role,
        verified: bool,
    ) -> Result<(), ApiError> {
        let body = EnableUserTypeRequest {
            user_id: account_id.as_str(),
            type_to_enable: role,
            verified,
        };
        let request = self
            .http_client
            .post(self.url(ENABLE_USER_TYPE_PATH)?)
            .json(&body);

        self.send::<Ack>(request, Endpoint::Other)
            .await?
            .into_result()
    }

    #[tracing::instrument(name = "HttpBackendClient::add_account_type", skip(self, profile))]
    async fn add_account_type(
        &self,
        account_id: &AccountId,
        role: Role,
        profile: &ProfileData,
    ) -> Result<(), ApiError> {
        let body = AddAccountTypeRequest {
            user_id: account_id.as_str(),
            account_type: role,
            profile_data: profile,
        };
        let request = self
            .http_client
            .post(self.url(ADD_ACCOUNT_TYPE_PATH)?)
            .json(&body);

        self.send::<Ack>(request, Endpoint::Other)
            .await?
            .into_result()
    }
}
