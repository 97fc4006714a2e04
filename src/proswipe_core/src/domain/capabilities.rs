use std::fmt;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Backend identifier of an account, opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    HomeownerOnly,
    ContractorOnly,
    Dual,
}

/// Which roles an account is enabled for, as reported by the capability endpoint.
///
/// An account with neither role enabled does not exist yet from the client's point
/// of view (`kind()` returns `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    account_id: AccountId,
    is_homeowner: bool,
    is_contractor: bool,
    active_role: Option<Role>,
}

impl Capabilities {
    pub fn new(
        account_id: AccountId,
        is_homeowner: bool,
        is_contractor: bool,
        active_role: Option<Role>,
    ) -> Self {
        Self {
            account_id,
            is_homeowner,
            is_contractor,
            active_role,
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn is_homeowner(&self) -> bool {
        self.is_homeowner
    }

    pub fn is_contractor(&self) -> bool {
        self.is_contractor
    }

    pub fn active_role(&self) -> Option<Role> {
        self.active_role
    }

    pub fn kind(&self) -> Option<AccountKind> {
        match (self.is_homeowner, self.is_contractor) {
            (true, true) => Some(AccountKind::Dual),
            (true, false) => Some(AccountKind::HomeownerOnly),
            (false, true) => Some(AccountKind::ContractorOnly),
            (false, false) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.kind().is_some()
    }

    pub fn is_dual(&self) -> bool {
        self.kind() == Some(AccountKind::Dual)
    }

    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Homeowner => self.is_homeowner,
            Role::Contractor => self.is_contractor,
        }
    }

    /// The only enabled role of a single-capability account.
    pub fn sole_role(&self) -> Option<Role> {
        match self.kind()? {
            AccountKind::HomeownerOnly => Some(Role::Homeowner),
            AccountKind::ContractorOnly => Some(Role::Contractor),
            AccountKind::Dual => None,
        }
    }

    /// The role a single-capability account could still add.
    pub fn missing_role(&self) -> Option<Role> {
        self.sole_role().map(Role::other)
    }

    /// Role pre-selected on the login form.
    ///
    /// Dual accounts default to their active role, falling back to homeowner when the
    /// backend reports none; single accounts select their only role; unknown accounts
    /// select nothing.
    pub fn auto_selected_role(&self) -> Option<Role> {
        match self.kind()? {
            AccountKind::Dual => Some(self.active_role.unwrap_or(Role::Homeowner)),
            AccountKind::HomeownerOnly => Some(Role::Homeowner),
            AccountKind::ContractorOnly => Some(Role::Contractor),
        }
    }
}
