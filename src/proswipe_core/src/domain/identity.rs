use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The last identity that completed a login on this device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub last_used_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            last_used_at: Utc::now(),
        }
    }
}
