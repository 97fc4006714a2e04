use std::fmt;

use serde::{Deserialize, Serialize};

/// The two marketplace roles an account can be enabled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Homeowner,
    Contractor,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Homeowner, Role::Contractor];

    /// The role an account would gain by adding the missing capability.
    pub fn other(self) -> Role {
        match self {
            Role::Homeowner => Role::Contractor,
            Role::Contractor => Role::Homeowner,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Homeowner => "homeowner",
            Role::Contractor => "contractor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
