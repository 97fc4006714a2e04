//! Hand-rolled doubles for the ports, shared by the use case tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use proswipe_core::{
    AccessToken, AccountId, ApiError, AuthService, BiometricAvailability, BiometricError,
    BiometricService, Capabilities, CapabilityApi, CredentialStore, CredentialStoreError, Email,
    Identity, LoginHandler, LoginReply, Password, PendingSessionId, ProfileData, RefreshToken,
    Role, SignUpRequest, StoredCredential, TwoFaCode, UserProfile, VerifiedSession,
};

pub fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

pub fn password(raw: &str) -> Password {
    Password::parse(raw).unwrap()
}

pub fn caps(id: &str, homeowner: bool, contractor: bool, active: Option<Role>) -> Capabilities {
    Capabilities::new(AccountId::new(id), homeowner, contractor, active)
}

fn with_role(capabilities: &Capabilities, role: Role) -> Capabilities {
    Capabilities::new(
        capabilities.account_id().clone(),
        capabilities.is_homeowner() || role == Role::Homeowner,
        capabilities.is_contractor() || role == Role::Contractor,
        capabilities.active_role(),
    )
}

// ---------------------------------------------------------------------------
// CapabilityApi
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CapabilityState {
    accounts: HashMap<String, Capabilities>,
    delays: HashMap<String, Duration>,
    failing_lookups: usize,
    lookups: Vec<String>,
    switches: Vec<Role>,
    enables: Vec<(Role, bool)>,
    additions: Vec<(Role, ProfileData)>,
}

#[derive(Clone, Default)]
pub struct MockCapabilityApi {
    state: Arc<Mutex<CapabilityState>>,
}

impl MockCapabilityApi {
    pub fn with_account(self, email: &str, capabilities: Capabilities) -> Self {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(email.to_string(), capabilities);
        self
    }

    pub fn delay_for(&self, email: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert(email.to_string(), delay);
    }

    pub fn fail_next_lookups(&self, count: usize) {
        self.state.lock().unwrap().failing_lookups = count;
    }

    pub fn lookups(&self) -> Vec<String> {
        self.state.lock().unwrap().lookups.clone()
    }

    pub fn switches(&self) -> Vec<Role> {
        self.state.lock().unwrap().switches.clone()
    }

    pub fn enables(&self) -> Vec<(Role, bool)> {
        self.state.lock().unwrap().enables.clone()
    }

    pub fn additions(&self) -> Vec<(Role, ProfileData)> {
        self.state.lock().unwrap().additions.clone()
    }

    fn update_account(&self, account_id: &AccountId, update: impl Fn(&Capabilities) -> Capabilities) {
        let mut state = self.state.lock().unwrap();
        for capabilities in state.accounts.values_mut() {
            if capabilities.account_id() == account_id {
                *capabilities = update(capabilities);
            }
        }
    }
}

#[async_trait]
impl CapabilityApi for MockCapabilityApi {
    async fn user_capabilities(&self, email: &str) -> Result<Option<Capabilities>, ApiError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.lookups.push(email.to_string());
            state.delays.get(email).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.failing_lookups > 0 {
            state.failing_lookups -= 1;
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(state.accounts.get(email).cloned())
    }

    async fn switch_user_type(&self, account_id: &AccountId, role: Role) -> Result<(), ApiError> {
        self.state.lock().unwrap().switches.push(role);
        self.update_account(account_id, |c| {
            Capabilities::new(
                c.account_id().clone(),
                c.is_homeowner(),
                c.is_contractor(),
                Some(role),
            )
        });
        Ok(())
    }

    async fn enable_user_type(
        &self,
        account_id: &AccountId,
        role: Role,
        verified: bool,
    ) -> Result<(), ApiError> {
        self.state.lock().unwrap().enables.push((role, verified));
        self.update_account(account_id, |c| with_role(c, role));
        Ok(())
    }

    async fn add_account_type(
        &self,
        account_id: &AccountId,
        role: Role,
        profile: &ProfileData,
    ) -> Result<(), ApiError> {
        self.state
            .lock()
            .unwrap()
            .additions
            .push((role, profile.clone()));
        self.update_account(account_id, |c| with_role(c, role));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockAccount {
    pub password: String,
    pub two_factor_code: Option<String>,
    pub locked: bool,
    pub user_type: Option<Role>,
}

impl MockAccount {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_string(),
            two_factor_code: None,
            locked: false,
            user_type: None,
        }
    }

    pub fn with_two_factor(mut self, code: &str) -> Self {
        self.two_factor_code = Some(code.to_string());
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, MockAccount>,
    offline: bool,
    issued: u32,
    pending: HashMap<String, String>,
    expired_pending: bool,
    login_calls: Vec<(String, Option<Role>)>,
    verify_calls: usize,
    biometric_calls: Vec<Option<Role>>,
    sign_ups: Vec<SignUpRequest>,
}

#[derive(Clone, Default)]
pub struct MockAuthService {
    state: Arc<Mutex<AuthState>>,
}

impl MockAuthService {
    pub fn with_account(self, email: &str, account: MockAccount) -> Self {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(email.to_string(), account);
        self
    }

    pub fn go_offline(&self) {
        self.state.lock().unwrap().offline = true;
    }

    pub fn expire_pending_sessions(&self) {
        self.state.lock().unwrap().expired_pending = true;
    }

    pub fn login_calls(&self) -> Vec<(String, Option<Role>)> {
        self.state.lock().unwrap().login_calls.clone()
    }

    pub fn verify_calls(&self) -> usize {
        self.state.lock().unwrap().verify_calls
    }

    pub fn biometric_calls(&self) -> Vec<Option<Role>> {
        self.state.lock().unwrap().biometric_calls.clone()
    }

    pub fn sign_ups(&self) -> Vec<SignUpRequest> {
        self.state.lock().unwrap().sign_ups.clone()
    }

    fn authenticate(state: &mut AuthState, email: &str, secret: &str) -> Result<LoginReply, ApiError> {
        if state.offline {
            return Err(ApiError::Network("unreachable".to_string()));
        }
        let account = state
            .accounts
            .get(email)
            .filter(|a| a.password == secret)
            .cloned()
            .ok_or(ApiError::InvalidCredentials)?;
        if account.locked {
            return Err(ApiError::AccountLocked);
        }

        state.issued += 1;
        if account.two_factor_code.is_some() {
            let id = format!("p{}", state.issued);
            state.pending.insert(id.clone(), email.to_string());
            return Ok(LoginReply::SecondFactorRequired {
                pending_session_id: PendingSessionId::new(id),
                expires_within: None,
            });
        }
        Ok(LoginReply::Authenticated {
            access_token: AccessToken::new(format!("access-{}", state.issued)),
            refresh_token: Some(RefreshToken::new(format!("refresh-{}", state.issued))),
            user: user_profile(email, account.user_type),
        })
    }
}

fn user_profile(email: &str, user_type: Option<Role>) -> UserProfile {
    UserProfile {
        id: AccountId::new(format!("user-{email}")),
        email: email.to_string(),
        full_name: None,
        user_type,
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(
        &self,
        email: &Email,
        password: &Password,
        _biometric_hint: bool,
        role: Option<Role>,
    ) -> Result<LoginReply, ApiError> {
        let mut state = self.state.lock().unwrap();
        let email = email.as_ref().expose_secret().clone();
        state.login_calls.push((email.clone(), role));
        Self::authenticate(&mut state, &email, password.as_ref().expose_secret())
    }

    async fn verify_2fa(
        &self,
        email: &Email,
        code: &TwoFaCode,
        pending_session_id: &PendingSessionId,
    ) -> Result<VerifiedSession, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.verify_calls += 1;
        if state.offline {
            return Err(ApiError::Network("unreachable".to_string()));
        }
        if state.expired_pending {
            return Err(ApiError::Expired);
        }
        let email = email.as_ref().expose_secret().clone();
        if state.pending.get(pending_session_id.as_str()) != Some(&email) {
            return Err(ApiError::Expired);
        }
        let account = state.accounts.get(&email).cloned().ok_or(ApiError::NotFound)?;
        if account.two_factor_code.as_deref() != Some(code.as_str()) {
            return Err(ApiError::InvalidCode);
        }

        state.pending.remove(pending_session_id.as_str());
        state.issued += 1;
        Ok(VerifiedSession {
            access_token: AccessToken::new(format!("access-{}", state.issued)),
            refresh_token: None,
            user: user_profile(&email, account.user_type),
        })
    }

    async fn biometric_login(
        &self,
        email: &Email,
        credential: &StoredCredential,
        role: Option<Role>,
    ) -> Result<LoginReply, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.biometric_calls.push(role);
        let email = email.as_ref().expose_secret().clone();
        Self::authenticate(&mut state, &email, credential.unlock_secret.expose_secret())
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ApiError> {
        self.state.lock().unwrap().sign_ups.push(request.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BiometricService
// ---------------------------------------------------------------------------

struct BiometricState {
    availability: BiometricAvailability,
    check_fails: bool,
    setting_enabled: bool,
    prompt_failure: Option<BiometricError>,
    store_fails: bool,
    credentials: HashMap<String, StoredCredential>,
    availability_checks: usize,
}

#[derive(Clone)]
pub struct MockBiometricService {
    state: Arc<Mutex<BiometricState>>,
}

impl MockBiometricService {
    pub fn available() -> Self {
        Self::with_availability(BiometricAvailability::Available)
    }

    pub fn unavailable(reason: &str) -> Self {
        Self::with_availability(BiometricAvailability::Unavailable {
            reason: reason.to_string(),
        })
    }

    fn with_availability(availability: BiometricAvailability) -> Self {
        Self {
            state: Arc::new(Mutex::new(BiometricState {
                availability,
                check_fails: false,
                setting_enabled: true,
                prompt_failure: None,
                store_fails: false,
                credentials: HashMap::new(),
                availability_checks: 0,
            })),
        }
    }

    pub fn fail_prompt_with(&self, error: BiometricError) {
        self.state.lock().unwrap().prompt_failure = Some(error);
    }

    pub fn fail_availability_check(&self) {
        self.state.lock().unwrap().check_fails = true;
    }

    pub fn fail_storage(&self) {
        self.state.lock().unwrap().store_fails = true;
    }

    pub fn disable_setting(&self) {
        self.state.lock().unwrap().setting_enabled = false;
    }

    pub fn stored(&self, email: &str) -> Option<StoredCredential> {
        self.state.lock().unwrap().credentials.get(email).cloned()
    }

    pub fn availability_checks(&self) -> usize {
        self.state.lock().unwrap().availability_checks
    }
}

#[async_trait]
impl BiometricService for MockBiometricService {
    async fn is_available(&self) -> Result<BiometricAvailability, BiometricError> {
        let mut state = self.state.lock().unwrap();
        state.availability_checks += 1;
        if state.check_fails {
            return Err(BiometricError::Failed("sensor did not respond".to_string()));
        }
        Ok(state.availability.clone())
    }

    async fn check_user_biometric_setting(&self, _email: &Email) -> Result<bool, BiometricError> {
        Ok(self.state.lock().unwrap().setting_enabled)
    }

    async fn get_stored_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredential>, BiometricError> {
        let state = self.state.lock().unwrap();
        Ok(state.credentials.get(email.as_ref().expose_secret()).cloned())
    }

    async fn store_credentials(
        &self,
        email: &Email,
        user: &UserProfile,
        token: &AccessToken,
        password: &Password,
    ) -> Result<(), BiometricError> {
        let mut state = self.state.lock().unwrap();
        if state.store_fails {
            return Err(BiometricError::Storage("keychain locked".to_string()));
        }
        state.credentials.insert(
            email.as_ref().expose_secret().clone(),
            StoredCredential {
                email: email.clone(),
                user: user.clone(),
                enrollment_token: token.clone(),
                unlock_secret: Secret::new(password.as_ref().expose_secret().clone()),
            },
        );
        Ok(())
    }

    async fn clear_stored_credentials(&self, email: &Email) -> Result<(), BiometricError> {
        self.state
            .lock()
            .unwrap()
            .credentials
            .remove(email.as_ref().expose_secret());
        Ok(())
    }

    async fn unlock_stored_credentials(
        &self,
        email: &Email,
        _prompt: &str,
    ) -> Result<StoredCredential, BiometricError> {
        let state = self.state.lock().unwrap();
        if let Some(error) = state.prompt_failure.clone() {
            return Err(error);
        }
        state
            .credentials
            .get(email.as_ref().expose_secret())
            .cloned()
            .ok_or(BiometricError::NotEnrolled)
    }
}

// ---------------------------------------------------------------------------
// CredentialStore and LoginHandler
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    identity: Option<Identity>,
    roles: HashMap<String, Role>,
    broken: bool,
}

#[derive(Clone, Default)]
pub struct MockCredentialStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockCredentialStore {
    pub fn with_identity(self, email: &str) -> Self {
        self.state.lock().unwrap().identity = Some(Identity::new(email));
        self
    }

    pub fn broken() -> Self {
        let store = Self::default();
        store.state.lock().unwrap().broken = true;
        store
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.lock().unwrap().identity.clone()
    }

    pub fn role_for(&self, email: &str) -> Option<Role> {
        self.state.lock().unwrap().roles.get(email).copied()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn last_identity(&self) -> Result<Option<Identity>, CredentialStoreError> {
        let state = self.state.lock().unwrap();
        if state.broken {
            return Err(CredentialStoreError::Unavailable("disk full".to_string()));
        }
        Ok(state.identity.clone())
    }

    async fn remember_identity(&self, identity: Identity) -> Result<(), CredentialStoreError> {
        let mut state = self.state.lock().unwrap();
        if state.broken {
            return Err(CredentialStoreError::Unavailable("disk full".to_string()));
        }
        state.identity = Some(identity);
        Ok(())
    }

    async fn active_role(&self, email: &str) -> Result<Option<Role>, CredentialStoreError> {
        Ok(self.state.lock().unwrap().roles.get(email).copied())
    }

    async fn remember_active_role(
        &self,
        email: &str,
        role: Role,
    ) -> Result<(), CredentialStoreError> {
        let mut state = self.state.lock().unwrap();
        if state.broken {
            return Err(CredentialStoreError::Unavailable("disk full".to_string()));
        }
        state.roles.insert(email.to_string(), role);
        Ok(())
    }
}

/// Records every `on_login` call.
#[derive(Clone, Default)]
pub struct RecordingLoginHandler {
    logins: Arc<Mutex<Vec<(UserProfile, String)>>>,
}

impl RecordingLoginHandler {
    pub fn logins(&self) -> Vec<(UserProfile, String)> {
        self.logins.lock().unwrap().clone()
    }
}

impl LoginHandler for RecordingLoginHandler {
    fn on_login(&self, user: &UserProfile, access_token: &AccessToken) {
        self.logins
            .lock()
            .unwrap()
            .push((user.clone(), access_token.as_ref().expose_secret().clone()));
    }
}
