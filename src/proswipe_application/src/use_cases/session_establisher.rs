use proswipe_core::{
    AccountId, AccountTypeProfile, AuthService, BiometricAvailability, BiometricService,
    Capabilities, CapabilityApi, CredentialStore, Email, Identity, LoginHandler, LoginPath,
    Password, PendingSessionId, Role, Session, TwoFaCode,
};
use tokio::sync::watch;

use crate::{
    error::LoginError,
    policy::LoginPolicy,
    use_cases::{
        authentication_challenge::{AuthenticationChallenge, ChallengeOutcome, Credentials},
        capability_resolver::{CapabilityResolver, Resolution, ResolutionOutcome, UnknownReason},
        login_state::{Attempt, LoginEvent, LoginState, ResolvedAccount},
        sign_up::{SignUpForm, SignUpUseCase},
    },
};

pub const SESSION_EXPIRED_NOTICE: &str =
    "Your session expired. Sign in with biometrics or password.";
pub const BIOMETRIC_SECOND_FACTOR_NOTICE: &str =
    "Biometric authentication successful. Please complete 2FA verification.";
pub const BIOMETRIC_CLEARED_NOTICE: &str =
    "Biometric data cleared. Please sign in with your password.";
pub const SIGNED_UP_NOTICE: &str =
    "Your account has been created successfully! Please sign in to continue.";

#[derive(Debug, Clone)]
pub enum LoginProgress {
    Authenticated(Session),
    SecondFactorRequired(PendingSessionId),
}

/// Whether the form should offer biometric sign-in for the current email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricOffer {
    /// No usable email in the field yet.
    Hidden,
    Available,
    /// Biometrics work on this device but nothing is enrolled for the email.
    NotEnrolled,
    Unavailable(String),
}

/// Drives one login form from email entry to an established session.
///
/// Owns the flow state; every change goes through [`LoginState::apply`]. Capability
/// updates are also published on a watch channel for observers that do not hold the
/// establisher.
pub struct SessionEstablisher<A, C, B, S, H>
where
    A: AuthService,
    C: CapabilityApi,
    B: BiometricService,
    S: CredentialStore,
    H: LoginHandler,
{
    resolver: CapabilityResolver<C>,
    challenge: AuthenticationChallenge<A, B>,
    credential_store: S,
    login_handler: H,
    email: String,
    state: LoginState,
    awaiting_role: Option<Role>,
    notice: Option<String>,
    last_error: Option<LoginError>,
    lookup_error: Option<LoginError>,
    capabilities_tx: watch::Sender<Option<Capabilities>>,
}

impl<A, C, B, S, H> SessionEstablisher<A, C, B, S, H>
where
    A: AuthService,
    C: CapabilityApi,
    B: BiometricService,
    S: CredentialStore,
    H: LoginHandler,
{
    pub fn new(
        auth: A,
        capability_api: C,
        biometric: B,
        credential_store: S,
        login_handler: H,
        policy: LoginPolicy,
    ) -> Self {
        let resolver = CapabilityResolver::new(capability_api, policy.capability_debounce);
        let challenge = AuthenticationChallenge::new(auth, biometric, policy);
        let (capabilities_tx, _) = watch::channel(None);

        Self {
            resolver,
            challenge,
            credential_store,
            login_handler,
            email: String::new(),
            state: LoginState::Idle,
            awaiting_role: None,
            notice: None,
            last_error: None,
            lookup_error: None,
            capabilities_tx,
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.state.capabilities()
    }

    pub fn selected_role(&self) -> Option<Role> {
        self.state.selected_role()
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn can_submit(&self) -> bool {
        self.state.can_submit()
    }

    pub fn last_error(&self) -> Option<&LoginError> {
        self.last_error.as_ref()
    }

    /// Why the last capability lookup came back unknown, if it failed.
    ///
    /// Soft: the form carries on as for an unknown account and this never becomes
    /// [`last_error`](Self::last_error).
    pub fn capability_lookup_error(&self) -> Option<&LoginError> {
        self.lookup_error.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// A handle for issuing debounced lookups from outside, e.g. one task per keystroke.
    /// Feed the results back through [`Self::apply_resolution`].
    pub fn resolver(&self) -> CapabilityResolver<C> {
        self.resolver.clone()
    }

    pub fn subscribe_capabilities(&self) -> watch::Receiver<Option<Capabilities>> {
        self.capabilities_tx.subscribe()
    }

    fn fail(&mut self, error: LoginError) -> LoginError {
        if !error.blocks_submission() {
            tracing::debug!(error = %error, "Login step failed");
        }
        self.last_error = Some(error.clone());
        error
    }

    fn settle(&mut self, event: LoginEvent) {
        if let Err(e) = self.state.apply(event) {
            tracing::error!(error = %e, state = ?self.state, "Unexpected login state transition");
        }
    }

    fn publish_capabilities(&self) {
        let current = self.state.capabilities().cloned();
        self.capabilities_tx.send_if_modified(|published| {
            if *published == current {
                return false;
            }
            *published = current;
            true
        });
    }

    fn ensure_editable(&mut self) -> Result<(), LoginError> {
        match self.state {
            LoginState::Idle | LoginState::CapabilitiesKnown(_) => Ok(()),
            LoginState::Authenticated { .. } => Err(self.fail(LoginError::AlreadyAuthenticated)),
            _ => Err(self.fail(LoginError::AttemptInProgress)),
        }
    }

    // ---------------------------------------------------------------------
    // Email field and capabilities
    // ---------------------------------------------------------------------

    /// Records a new value of the email field.
    ///
    /// Lookups issued for earlier values become stale and capabilities of a different
    /// email are dropped. An empty field never reaches the backend.
    pub fn set_email(&mut self, email: &str) -> Result<(), LoginError> {
        self.ensure_editable()?;

        let changed = self.email.trim() != email.trim();
        self.email = email.to_string();
        let request = self.resolver.begin(email);

        if request.email().is_empty() {
            self.apply_resolution(Resolution {
                request,
                outcome: ResolutionOutcome::Cleared,
            });
        } else if changed {
            self.awaiting_role = None;
            self.lookup_error = None;
            self.settle(LoginEvent::CapabilitiesResolved(None));
            self.publish_capabilities();
        }
        Ok(())
    }

    /// Sets the email and resolves its capabilities after the debounce window.
    ///
    /// Returns whether the resolution was applied.
    #[tracing::instrument(name = "SessionEstablisher::update_email", skip(self))]
    pub async fn update_email(&mut self, email: &str) -> Result<bool, LoginError> {
        self.set_email(email)?;
        if self.email.trim().is_empty() {
            return Ok(false);
        }
        let resolution = self.resolver.resolve_debounced(email).await;
        Ok(self.apply_resolution(resolution))
    }

    /// Applies a finished lookup unless a newer one was issued or the field no longer
    /// holds the email it was made for. Returns whether it was applied.
    pub fn apply_resolution(&mut self, resolution: Resolution) -> bool {
        let Resolution { request, outcome } = resolution;
        if !self.resolver.is_current(&request) || request.email() != self.email.trim() {
            tracing::debug!(
                generation = request.generation(),
                "Discarding capability resolution for a stale email"
            );
            return false;
        }

        let (account, lookup_error) = match outcome {
            ResolutionOutcome::Superseded => return false,
            ResolutionOutcome::Found(capabilities) => (Some(self.account_for(capabilities)), None),
            ResolutionOutcome::Unknown(UnknownReason::LookupFailed(message)) => {
                tracing::debug!(%message, "Capability lookup failed, treating account as unknown");
                (None, Some(LoginError::CapabilityLookupFailed(message)))
            }
            ResolutionOutcome::Cleared | ResolutionOutcome::Unknown(_) => (None, None),
        };
        self.lookup_error = lookup_error;
        self.settle(LoginEvent::CapabilitiesResolved(account));
        self.publish_capabilities();
        true
    }

    fn account_for(&mut self, capabilities: Capabilities) -> ResolvedAccount {
        let mut account = ResolvedAccount::new(capabilities);

        if let Some(role) = self.awaiting_role {
            if account.select(role).is_ok() {
                self.awaiting_role = None;
            }
            return account;
        }

        // Keep the user's pick across refreshes of the same account.
        if let LoginState::CapabilitiesKnown(previous) = &self.state {
            if previous.capabilities().account_id() == account.capabilities().account_id() {
                if let Some(role) = previous.selected_role() {
                    let _ = account.select(role);
                }
            }
        }
        account
    }

    /// Re-fetches capabilities for the current email right away.
    ///
    /// A failed fetch keeps what was known before.
    #[tracing::instrument(name = "SessionEstablisher::refresh_capabilities", skip(self))]
    pub async fn refresh_capabilities(&mut self) -> Result<Option<Capabilities>, LoginError> {
        let request = self.resolver.begin(&self.email);
        let resolution = self.resolver.resolve(request).await;

        if let ResolutionOutcome::Unknown(UnknownReason::LookupFailed(message)) =
            &resolution.outcome
        {
            return Err(self.fail(LoginError::CapabilityRefreshFailed(message.clone())));
        }
        self.apply_resolution(resolution);
        Ok(self.capabilities().cloned())
    }

    pub fn select_role(&mut self, role: Role) -> Result<(), LoginError> {
        self.state
            .apply(LoginEvent::RoleSelected(role))
            .map_err(|e| self.fail(e))
    }

    pub fn clear_role_selection(&mut self) -> Result<(), LoginError> {
        self.state
            .apply(LoginEvent::RoleCleared)
            .map_err(|e| self.fail(e))
    }

    // ---------------------------------------------------------------------
    // Credential exchange
    // ---------------------------------------------------------------------

    #[tracing::instrument(name = "SessionEstablisher::submit_password", skip(self, password))]
    pub async fn submit_password(&mut self, password: &str) -> Result<LoginProgress, LoginError> {
        let credentials = match (Email::parse(&self.email), Password::parse(password)) {
            (Ok(email), Ok(password)) => Credentials::Password { email, password },
            (Err(e), _) | (_, Err(e)) => return Err(self.fail(e.into())),
        };
        self.run_attempt(credentials).await
    }

    #[tracing::instrument(name = "SessionEstablisher::submit_biometric", skip(self))]
    pub async fn submit_biometric(&mut self) -> Result<LoginProgress, LoginError> {
        let email = Email::parse(&self.email).map_err(|e| self.fail(e.into()))?;
        self.run_attempt(Credentials::Biometric { email }).await
    }

    async fn run_attempt(&mut self, credentials: Credentials) -> Result<LoginProgress, LoginError> {
        self.state
            .apply(LoginEvent::AttemptStarted(credentials.path()))
            .map_err(|e| self.fail(e))?;
        self.last_error = None;
        self.notice = None;

        let capabilities = self.state.capabilities().cloned();
        let role = self.state.selected_role();
        let outcome = self
            .challenge
            .attempt(credentials, capabilities.as_ref(), role)
            .await;

        match outcome {
            Ok(ChallengeOutcome::Established(session)) => {
                self.complete(session.clone()).await;
                Ok(LoginProgress::Authenticated(session))
            }
            Ok(ChallengeOutcome::SecondFactorRequired(pending)) => {
                let pending_session_id = pending.pending_session_id().clone();
                if pending.path() == LoginPath::Biometric {
                    self.notice = Some(BIOMETRIC_SECOND_FACTOR_NOTICE.to_string());
                }
                self.settle(LoginEvent::SecondFactorRequired(pending));
                tracing::info!(%pending_session_id, "Second factor required");
                Ok(LoginProgress::SecondFactorRequired(pending_session_id))
            }
            Err(e) => {
                self.settle(LoginEvent::AttemptEnded);
                Err(self.fail(e))
            }
        }
    }

    /// Gives up on an attempt whose future was dropped, e.g. a biometric prompt the
    /// user walked away from. A second factor under verification goes back to waiting
    /// for its code.
    pub fn abandon_attempt(&mut self) {
        let verifying = matches!(
            self.state,
            LoginState::Authenticating {
                attempt: Attempt::SecondFactor(_),
                ..
            }
        );
        if verifying {
            self.settle(LoginEvent::VerificationRejected);
        } else if matches!(self.state, LoginState::Authenticating { .. }) {
            self.settle(LoginEvent::AttemptEnded);
        }
    }

    // ---------------------------------------------------------------------
    // Second factor
    // ---------------------------------------------------------------------

    #[tracing::instrument(name = "SessionEstablisher::verify_second_factor", skip(self, code))]
    pub async fn verify_second_factor(
        &mut self,
        pending_session_id: &PendingSessionId,
        code: &str,
    ) -> Result<Session, LoginError> {
        let pending = match &self.state {
            LoginState::SecondFactorPending { pending, .. } => Some(pending.clone()),
            _ => None,
        };
        let Some(pending) = pending else {
            return Err(self.fail(LoginError::NotAwaitingSecondFactor));
        };
        if pending.pending_session_id() != pending_session_id {
            return Err(self.fail(LoginError::UnknownPendingSession));
        }
        if let Err(e) = TwoFaCode::parse(code) {
            return Err(self.fail(e.into()));
        }

        self.settle(LoginEvent::VerificationStarted);
        match self.challenge.verify_second_factor(&pending, code).await {
            Ok(session) => {
                self.complete(session.clone()).await;
                Ok(session)
            }
            Err(LoginError::SecondFactorExpired) => {
                self.settle(LoginEvent::AttemptEnded);
                Err(self.fail(LoginError::SecondFactorExpired))
            }
            Err(e) => {
                self.settle(LoginEvent::VerificationRejected);
                Err(self.fail(e))
            }
        }
    }

    /// Discards the pending second factor and unlocks the form.
    pub fn cancel_second_factor(&mut self) -> Result<(), LoginError> {
        if !matches!(self.state, LoginState::SecondFactorPending { .. }) {
            return Err(self.fail(LoginError::NotAwaitingSecondFactor));
        }
        self.settle(LoginEvent::AttemptEnded);
        self.last_error = None;
        self.notice = None;
        Ok(())
    }

    async fn complete(&mut self, session: Session) {
        self.settle(LoginEvent::Established(session.clone()));

        let email = self.email.trim().to_string();
        if let Err(e) = self
            .credential_store
            .remember_identity(Identity::new(email.clone()))
            .await
        {
            tracing::warn!(error = %e, "Failed to remember last identity");
        }
        if let Err(e) = self
            .credential_store
            .remember_active_role(&email, session.resolved_role())
            .await
        {
            tracing::warn!(error = %e, "Failed to remember active role");
        }

        self.last_error = None;
        self.login_handler
            .on_login(session.user(), session.access_token());
        tracing::info!(role = %session.resolved_role(), "Session established");
    }

    // ---------------------------------------------------------------------
    // Roles
    // ---------------------------------------------------------------------

    /// Switches the backend's active role of a signed-in dual account.
    ///
    /// The session itself is left as is.
    #[tracing::instrument(name = "SessionEstablisher::switch_active_role", skip(self))]
    pub async fn switch_active_role(&mut self, role: Role) -> Result<(), LoginError> {
        let target = match &self.state {
            LoginState::Authenticated {
                account: Some(account),
                ..
            } if account.capabilities().is_dual() => {
                Ok(account.capabilities().account_id().clone())
            }
            LoginState::Authenticated { .. } => Err(LoginError::RoleSwitchNotAllowed),
            _ => Err(LoginError::NotAuthenticated),
        };
        let account_id = target.map_err(|e| self.fail(e))?;

        let switched = self
            .resolver
            .api()
            .switch_user_type(&account_id, role)
            .await;
        switched.map_err(|e| self.fail(e.into()))?;

        let capabilities = self.refresh_capabilities().await?;
        if capabilities.and_then(|c| c.active_role()) != Some(role) {
            return Err(self.fail(LoginError::CapabilityRefreshFailed(
                "the active role did not change".to_string(),
            )));
        }

        if let Err(e) = self
            .credential_store
            .remember_active_role(self.email.trim(), role)
            .await
        {
            tracing::warn!(error = %e, "Failed to remember active role");
        }
        Ok(())
    }

    /// Adds the missing role to a single-role account, then confirms it with a fresh
    /// capability lookup before selecting it.
    #[tracing::instrument(
        name = "SessionEstablisher::add_account_type",
        skip(self, profile),
        fields(role = %profile.role)
    )]
    pub async fn add_account_type(&mut self, profile: AccountTypeProfile) -> Result<Role, LoginError> {
        let account_id = self.provisioning_target(profile.role)?;
        let data = profile.validate().map_err(|e| self.fail(e.into()))?;

        let added = self
            .resolver
            .api()
            .add_account_type(&account_id, profile.role, &data)
            .await;
        added.map_err(|e| self.fail(e.into()))?;

        self.confirm_new_role(profile.role).await
    }

    /// Enables the missing role without a profile. Requires explicit confirmation.
    #[tracing::instrument(name = "SessionEstablisher::enable_role", skip(self))]
    pub async fn enable_role(&mut self, role: Role, verified: bool) -> Result<Role, LoginError> {
        if !verified {
            return Err(self.fail(LoginError::ConfirmationRequired));
        }
        let account_id = self.provisioning_target(role)?;

        let enabled = self
            .resolver
            .api()
            .enable_user_type(&account_id, role, verified)
            .await;
        enabled.map_err(|e| self.fail(e.into()))?;

        self.confirm_new_role(role).await
    }

    fn provisioning_target(&mut self, role: Role) -> Result<AccountId, LoginError> {
        let target = match &self.state {
            LoginState::CapabilitiesKnown(account)
                if account.capabilities().missing_role() == Some(role) =>
            {
                Some(account.capabilities().account_id().clone())
            }
            _ => None,
        };
        target.ok_or_else(|| self.fail(LoginError::ProvisioningNotAvailable))
    }

    /// A new role only becomes selectable once a capability lookup reports it.
    async fn confirm_new_role(&mut self, role: Role) -> Result<Role, LoginError> {
        self.awaiting_role = Some(role);
        self.refresh_capabilities().await?;

        if self.awaiting_role.is_none() && self.selected_role() == Some(role) {
            Ok(role)
        } else {
            Err(self.fail(LoginError::CapabilityRefreshFailed(format!(
                "the {role} role is not available yet"
            ))))
        }
    }

    // ---------------------------------------------------------------------
    // Device state
    // ---------------------------------------------------------------------

    /// Pre-fills an empty email field with the last identity that signed in here and
    /// restores its remembered role. Returns the restored email.
    #[tracing::instrument(name = "SessionEstablisher::restore_last_identity", skip(self))]
    pub async fn restore_last_identity(&mut self) -> Option<String> {
        if !self.email.trim().is_empty() {
            return None;
        }
        let identity = match self.credential_store.last_identity().await {
            Ok(identity) => identity?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load last identity");
                return None;
            }
        };

        if let Err(e) = self.update_email(&identity.email).await {
            tracing::warn!(error = %e, "Could not restore last identity");
            return None;
        }

        let remembered = self.credential_store.active_role(&identity.email).await;
        if let Ok(Some(role)) = remembered {
            if self.state.capabilities().is_some_and(Capabilities::is_dual) {
                let _ = self.state.apply(LoginEvent::RoleSelected(role));
            }
        }
        Some(identity.email)
    }

    /// Re-enters the form after the app's session token expired.
    #[tracing::instrument(name = "SessionEstablisher::resume_expired_session", skip(self))]
    pub async fn resume_expired_session(&mut self, email: &str) -> Result<(), LoginError> {
        self.update_email(email).await?;
        self.notice = Some(SESSION_EXPIRED_NOTICE.to_string());
        Ok(())
    }

    pub async fn check_biometric_availability(&mut self) -> BiometricAvailability {
        self.challenge.check_biometric_availability().await
    }

    /// `Hidden` until the field holds a valid email, whatever the platform reports.
    #[tracing::instrument(name = "SessionEstablisher::biometric_offer", skip(self))]
    pub async fn biometric_offer(&mut self) -> BiometricOffer {
        let Ok(email) = Email::parse(&self.email) else {
            return BiometricOffer::Hidden;
        };
        let availability = match self.challenge.cached_availability() {
            Some(availability) => availability.clone(),
            None => self.challenge.check_biometric_availability().await,
        };
        if let BiometricAvailability::Unavailable { reason } = availability {
            return BiometricOffer::Unavailable(reason);
        }

        match self.challenge.enrollment(&email).await {
            Ok(enrollment) if enrollment.has_stored_credential => BiometricOffer::Available,
            Ok(_) => BiometricOffer::NotEnrolled,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read biometric enrollment");
                BiometricOffer::NotEnrolled
            }
        }
    }

    /// Removes the biometric unlock material for the current email.
    #[tracing::instrument(name = "SessionEstablisher::clear_biometric_data", skip(self))]
    pub async fn clear_biometric_data(&mut self) -> Result<(), LoginError> {
        let email = Email::parse(&self.email).map_err(|e| self.fail(e.into()))?;
        let cleared = self
            .challenge
            .biometric()
            .clear_stored_credentials(&email)
            .await;
        cleared.map_err(|e| self.fail(e.into()))?;
        self.notice = Some(BIOMETRIC_CLEARED_NOTICE.to_string());
        Ok(())
    }

    /// Registers a new account. The user still has to sign in afterwards.
    #[tracing::instrument(name = "SessionEstablisher::sign_up", skip(self, form))]
    pub async fn sign_up(&mut self, form: &SignUpForm) -> Result<(), LoginError> {
        self.ensure_editable()?;
        let result = SignUpUseCase::new(self.challenge.auth()).execute(form).await;
        result.map_err(|e| self.fail(e))?;
        self.notice = Some(SIGNED_UP_NOTICE.to_string());
        Ok(())
    }
}
