pub mod biometric;
pub mod capabilities;
pub mod email;
pub mod identity;
pub mod password;
pub mod pending;
pub mod profile;
pub mod role;
pub mod session;
pub mod two_fa_code;
pub mod validation;
