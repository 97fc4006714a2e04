use proswipe_core::{
    AccessToken, AccountKind, ApiError, AuthService, BiometricAvailability, BiometricEnrollment,
    BiometricError, BiometricService, Capabilities, Email, LoginPath, LoginReply, Password,
    PendingSecondFactor, RefreshToken, Role, Session, TwoFaCode, UserProfile,
};
use secrecy::ExposeSecret;

use crate::{error::LoginError, policy::LoginPolicy};

pub const AVAILABILITY_CHECK_FAILED: &str = "Failed to check biometric availability";

/// What the user presented to start an attempt.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password { email: Email, password: Password },
    /// The stored unlock material is released by the OS prompt during the attempt.
    Biometric { email: Email },
}

impl Credentials {
    pub fn email(&self) -> &Email {
        match self {
            Credentials::Password { email, .. } | Credentials::Biometric { email } => email,
        }
    }

    pub fn path(&self) -> LoginPath {
        match self {
            Credentials::Password { .. } => LoginPath::Password,
            Credentials::Biometric { .. } => LoginPath::Biometric,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChallengeOutcome {
    Established(Session),
    SecondFactorRequired(PendingSecondFactor),
}

/// The role an attempt is made under.
///
/// Dual accounts must choose; single-role accounts use their only role and reject any
/// other; unknown accounts pass the choice through for the backend to judge.
pub fn effective_role(
    capabilities: Option<&Capabilities>,
    selected: Option<Role>,
) -> Result<Option<Role>, LoginError> {
    let Some(capabilities) = capabilities else {
        return Ok(selected);
    };
    match capabilities.kind() {
        Some(AccountKind::Dual) => selected.map(Some).ok_or(LoginError::RoleNotResolved),
        Some(_) => {
            let sole = capabilities.sole_role();
            match selected {
                Some(role) if Some(role) != sole => Err(LoginError::RoleNotEnabled(role)),
                _ => Ok(sole),
            }
        }
        None => Ok(selected),
    }
}

/// Runs one credential exchange (password or biometric) and, when needed, its second
/// factor.
pub struct AuthenticationChallenge<A, B>
where
    A: AuthService,
    B: BiometricService,
{
    auth: A,
    biometric: B,
    policy: LoginPolicy,
    availability: Option<BiometricAvailability>,
}

impl<A, B> AuthenticationChallenge<A, B>
where
    A: AuthService,
    B: BiometricService,
{
    pub fn new(auth: A, biometric: B, policy: LoginPolicy) -> Self {
        Self {
            auth,
            biometric,
            policy,
            availability: None,
        }
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    pub fn biometric(&self) -> &B {
        &self.biometric
    }

    pub fn policy(&self) -> &LoginPolicy {
        &self.policy
    }

    /// The last availability reported by the platform, if it was checked.
    pub fn cached_availability(&self) -> Option<&BiometricAvailability> {
        self.availability.as_ref()
    }

    /// Asks the platform whether biometrics can be used and caches the answer.
    #[tracing::instrument(name = "AuthenticationChallenge::check_biometric_availability", skip(self))]
    pub async fn check_biometric_availability(&mut self) -> BiometricAvailability {
        let availability = self.query_availability().await;
        if let BiometricAvailability::Unavailable { reason } = &availability {
            tracing::info!(%reason, "Biometric authentication unavailable");
        }
        self.availability = Some(availability.clone());
        availability
    }

    async fn availability(&self) -> BiometricAvailability {
        match &self.availability {
            Some(availability) => availability.clone(),
            None => self.query_availability().await,
        }
    }

    /// Whether `email` has usable unlock material: the user setting is on and the
    /// platform store holds a credential.
    pub async fn enrollment(&self, email: &Email) -> Result<BiometricEnrollment, BiometricError> {
        let enabled = self.biometric.check_user_biometric_setting(email).await?;
        let stored = self.biometric.get_stored_credentials(email).await?;
        Ok(BiometricEnrollment {
            email: email.as_ref().expose_secret().clone(),
            has_stored_credential: enabled && stored.is_some(),
        })
    }

    /// A failed platform check counts as unavailable.
    async fn query_availability(&self) -> BiometricAvailability {
        match self.biometric.is_available().await {
            Ok(availability) => availability,
            Err(e) => {
                tracing::warn!(error = %e, "Biometric availability check failed");
                BiometricAvailability::Unavailable {
                    reason: AVAILABILITY_CHECK_FAILED.to_string(),
                }
            }
        }
    }

    #[tracing::instrument(
        name = "AuthenticationChallenge::attempt",
        skip(self, credentials, capabilities),
        fields(path = ?credentials.path())
    )]
    pub async fn attempt(
        &self,
        credentials: Credentials,
        capabilities: Option<&Capabilities>,
        role: Option<Role>,
    ) -> Result<ChallengeOutcome, LoginError> {
        let role = effective_role(capabilities, role)?;
        let availability = self.availability().await;

        match credentials {
            Credentials::Password { email, password } => {
                self.password_attempt(email, password, role, availability.is_available())
                    .await
            }
            Credentials::Biometric { email } => {
                self.biometric_attempt(email, role, availability).await
            }
        }
    }

    async fn password_attempt(
        &self,
        email: Email,
        password: Password,
        role: Option<Role>,
        biometric_available: bool,
    ) -> Result<ChallengeOutcome, LoginError> {
        let reply = self
            .auth
            .login(&email, &password, biometric_available, role)
            .await?;

        match reply {
            LoginReply::Authenticated {
                access_token,
                refresh_token,
                user,
            } => {
                if biometric_available {
                    self.enroll(&email, &user, &access_token, &password).await;
                }
                Ok(ChallengeOutcome::Established(build_session(
                    access_token,
                    refresh_token,
                    user,
                    role,
                )))
            }
            LoginReply::SecondFactorRequired {
                pending_session_id,
                expires_within,
            } => {
                let pending = PendingSecondFactor::new(
                    pending_session_id,
                    email,
                    role,
                    LoginPath::Password,
                    expires_within.unwrap_or(self.policy.second_factor_window),
                )
                .with_password(password);
                Ok(ChallengeOutcome::SecondFactorRequired(pending))
            }
        }
    }

    async fn biometric_attempt(
        &self,
        email: Email,
        role: Option<Role>,
        availability: BiometricAvailability,
    ) -> Result<ChallengeOutcome, LoginError> {
        if let BiometricAvailability::Unavailable { reason } = availability {
            return Err(LoginError::BiometricUnavailable(reason));
        }

        if !self.enrollment(&email).await?.has_stored_credential {
            return Err(LoginError::NoStoredCredential);
        }

        let credential = self
            .biometric
            .unlock_stored_credentials(&email, &self.policy.biometric_prompt)
            .await?;

        // Unlock material is only a key for a fresh exchange; its enrollment token is
        // never reused as the session token.
        let reply = self.auth.biometric_login(&email, &credential, role).await?;

        match reply {
            LoginReply::Authenticated {
                access_token,
                refresh_token,
                user,
            } => Ok(ChallengeOutcome::Established(build_session(
                access_token,
                refresh_token,
                user,
                role,
            ))),
            LoginReply::SecondFactorRequired {
                pending_session_id,
                expires_within,
            } => Ok(ChallengeOutcome::SecondFactorRequired(
                PendingSecondFactor::new(
                    pending_session_id,
                    email,
                    role,
                    LoginPath::Biometric,
                    expires_within.unwrap_or(self.policy.second_factor_window),
                ),
            )),
        }
    }

    /// Submits the second factor for `pending`.
    ///
    /// A code that is not six digits is rejected without contacting the backend.
    #[tracing::instrument(
        name = "AuthenticationChallenge::verify_second_factor",
        skip(self, pending, code),
        fields(pending_session_id = %pending.pending_session_id())
    )]
    pub async fn verify_second_factor(
        &self,
        pending: &PendingSecondFactor,
        code: &str,
    ) -> Result<Session, LoginError> {
        let code = TwoFaCode::parse(code)?;

        let verified = self
            .auth
            .verify_2fa(pending.email(), &code, pending.pending_session_id())
            .await
            .map_err(|e| match e {
                ApiError::InvalidCredentials => LoginError::InvalidCode,
                other => LoginError::from(other),
            })?;

        if let (LoginPath::Password, Some(password)) = (pending.path(), pending.password()) {
            if self.availability().await.is_available() {
                self.enroll(pending.email(), &verified.user, &verified.access_token, password)
                    .await;
            }
        }

        Ok(build_session(
            verified.access_token,
            verified.refresh_token,
            verified.user,
            pending.role(),
        ))
    }

    /// Stores biometric unlock material. Never fails the login it follows.
    async fn enroll(&self, email: &Email, user: &UserProfile, token: &AccessToken, password: &Password) {
        if let Err(e) = self
            .biometric
            .store_credentials(email, user, token, password)
            .await
        {
            tracing::warn!(error = %e, "Failed to store biometric credentials");
        }
    }
}

fn build_session(
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    user: UserProfile,
    role: Option<Role>,
) -> Session {
    let resolved_role = user.user_type.or(role).unwrap_or(Role::Homeowner);
    Session::new(access_token, refresh_token, user, resolved_role)
}
