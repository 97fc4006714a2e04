use thiserror::Error;

pub const TWO_FA_CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TwoFaCodeError {
    #[error("Please enter a 6-digit verification code")]
    Malformed,
}

/// A six-digit TOTP code as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoFaCode(String);

impl TwoFaCode {
    /// Accepts exactly six ASCII digits. Surrounding whitespace is not tolerated;
    /// anything else is rejected without ever reaching the backend.
    pub fn parse(raw: &str) -> Result<Self, TwoFaCodeError> {
        if raw.len() == TWO_FA_CODE_LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(TwoFaCodeError::Malformed)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TwoFaCode {
    type Error = TwoFaCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
