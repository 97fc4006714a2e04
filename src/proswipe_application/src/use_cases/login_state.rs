use proswipe_core::{Capabilities, LoginPath, PendingSecondFactor, Role, Session};

use crate::error::LoginError;

/// Capabilities of the account behind the email field, plus the role picked for it.
///
/// `selected_role` is always a role the account has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    capabilities: Capabilities,
    selected_role: Option<Role>,
}

impl ResolvedAccount {
    /// Pre-selects the role the form should start with.
    pub fn new(capabilities: Capabilities) -> Self {
        let selected_role = capabilities.auto_selected_role();
        Self {
            capabilities,
            selected_role,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn selected_role(&self) -> Option<Role> {
        self.selected_role
    }

    pub fn select(&mut self, role: Role) -> Result<(), LoginError> {
        if !self.capabilities.has_role(role) {
            return Err(LoginError::RoleNotEnabled(role));
        }
        self.selected_role = Some(role);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_role = None;
    }

    /// Dual accounts cannot submit until a role is chosen.
    pub fn is_ready(&self) -> bool {
        !(self.capabilities.is_dual() && self.selected_role.is_none())
    }
}

/// What is in flight while the form is busy.
#[derive(Debug, Clone)]
pub enum Attempt {
    Credentials(LoginPath),
    /// Verification of a second factor; the pending record is kept for a retry.
    SecondFactor(PendingSecondFactor),
}

#[derive(Debug, Clone, Default)]
pub enum LoginState {
    #[default]
    Idle,
    CapabilitiesKnown(ResolvedAccount),
    Authenticating {
        account: Option<ResolvedAccount>,
        attempt: Attempt,
    },
    SecondFactorPending {
        account: Option<ResolvedAccount>,
        pending: PendingSecondFactor,
    },
    Authenticated {
        account: Option<ResolvedAccount>,
        session: Session,
    },
}

#[derive(Debug, Clone)]
pub enum LoginEvent {
    /// `None` clears what was known about the email.
    CapabilitiesResolved(Option<ResolvedAccount>),
    RoleSelected(Role),
    RoleCleared,
    AttemptStarted(LoginPath),
    SecondFactorRequired(PendingSecondFactor),
    VerificationStarted,
    VerificationRejected,
    Established(Session),
    /// Failure, cancellation or abandonment of whatever was in flight.
    AttemptEnded,
}

impl LoginState {
    fn at_rest(account: Option<ResolvedAccount>) -> Self {
        match account {
            Some(account) => LoginState::CapabilitiesKnown(account),
            None => LoginState::Idle,
        }
    }

    pub fn account(&self) -> Option<&ResolvedAccount> {
        match self {
            LoginState::Idle => None,
            LoginState::CapabilitiesKnown(account) => Some(account),
            LoginState::Authenticating { account, .. }
            | LoginState::SecondFactorPending { account, .. }
            | LoginState::Authenticated { account, .. } => account.as_ref(),
        }
    }

    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.account().map(ResolvedAccount::capabilities)
    }

    pub fn selected_role(&self) -> Option<Role> {
        self.account().and_then(ResolvedAccount::selected_role)
    }

    pub fn pending(&self) -> Option<&PendingSecondFactor> {
        match self {
            LoginState::SecondFactorPending { pending, .. }
            | LoginState::Authenticating {
                attempt: Attempt::SecondFactor(pending),
                ..
            } => Some(pending),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            LoginState::Authenticated { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Stays true across the second factor hop.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            LoginState::Authenticating { .. } | LoginState::SecondFactorPending { .. }
        )
    }

    pub fn can_submit(&self) -> bool {
        match self {
            LoginState::Idle => true,
            LoginState::CapabilitiesKnown(account) => account.is_ready(),
            _ => false,
        }
    }

    /// Applies `event`, leaving the state untouched when the transition is illegal.
    pub fn apply(&mut self, event: LoginEvent) -> Result<(), LoginError> {
        let current = std::mem::take(self);
        match current.transition(event) {
            Ok(next) => {
                *self = next;
                Ok(())
            }
            Err((unchanged, error)) => {
                *self = unchanged;
                Err(error)
            }
        }
    }

    fn transition(self, event: LoginEvent) -> Result<LoginState, (LoginState, LoginError)> {
        use LoginEvent as E;
        use LoginState as S;

        match (self, event) {
            // Capability updates are advisory in every phase.
            (S::Idle | S::CapabilitiesKnown(_), E::CapabilitiesResolved(account)) => {
                Ok(S::at_rest(account))
            }
            (S::Authenticating { attempt, .. }, E::CapabilitiesResolved(account)) => {
                Ok(S::Authenticating { account, attempt })
            }
            (S::SecondFactorPending { pending, .. }, E::CapabilitiesResolved(account)) => {
                Ok(S::SecondFactorPending { account, pending })
            }
            (S::Authenticated { session, .. }, E::CapabilitiesResolved(account)) => {
                Ok(S::Authenticated { account, session })
            }

            (S::CapabilitiesKnown(mut account), E::RoleSelected(role)) => {
                match account.select(role) {
                    Ok(()) => Ok(S::CapabilitiesKnown(account)),
                    Err(e) => Err((S::CapabilitiesKnown(account), e)),
                }
            }
            (S::Idle, E::RoleSelected(role)) => Err((S::Idle, LoginError::RoleNotEnabled(role))),
            (S::CapabilitiesKnown(mut account), E::RoleCleared) => {
                account.clear_selection();
                Ok(S::CapabilitiesKnown(account))
            }
            (S::Idle, E::RoleCleared) => Ok(S::Idle),

            (S::Idle, E::AttemptStarted(path)) => Ok(S::Authenticating {
                account: None,
                attempt: Attempt::Credentials(path),
            }),
            (S::CapabilitiesKnown(account), E::AttemptStarted(path)) => {
                if account.is_ready() {
                    Ok(S::Authenticating {
                        account: Some(account),
                        attempt: Attempt::Credentials(path),
                    })
                } else {
                    Err((S::CapabilitiesKnown(account), LoginError::RoleNotResolved))
                }
            }

            (
                S::Authenticating {
                    account,
                    attempt: Attempt::Credentials(_),
                },
                E::SecondFactorRequired(pending),
            ) => Ok(S::SecondFactorPending { account, pending }),

            (S::SecondFactorPending { account, pending }, E::VerificationStarted) => {
                Ok(S::Authenticating {
                    account,
                    attempt: Attempt::SecondFactor(pending),
                })
            }
            (
                S::Authenticating {
                    account,
                    attempt: Attempt::SecondFactor(pending),
                },
                E::VerificationRejected,
            ) => Ok(S::SecondFactorPending { account, pending }),

            (S::Authenticating { account, .. }, E::Established(session)) => {
                Ok(S::Authenticated { account, session })
            }

            (
                S::Authenticating { account, .. } | S::SecondFactorPending { account, .. },
                E::AttemptEnded,
            ) => Ok(S::at_rest(account)),
            (state @ (S::Idle | S::CapabilitiesKnown(_)), E::AttemptEnded) => Ok(state),

            (state @ S::Authenticated { .. }, _) => Err((state, LoginError::AlreadyAuthenticated)),
            (
                state @ (S::Authenticating { .. } | S::SecondFactorPending { .. }),
                E::AttemptStarted(_) | E::RoleSelected(_) | E::RoleCleared,
            ) => Err((state, LoginError::AttemptInProgress)),
            (state, E::VerificationStarted) => Err((state, LoginError::NotAwaitingSecondFactor)),
            (state, _) => Err((state, LoginError::InvalidState)),
        }
    }
}
