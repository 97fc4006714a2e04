use proswipe_core::{AuthService, Email, Password, Role, SignUpRequest, ValidationError};

use crate::error::LoginError;

/// Roles a new account can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpRole {
    Homeowner,
    Contractor,
    /// Created as a homeowner with the contractor role enabled as well.
    Both,
}

/// The raw registration form.
#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub role: SignUpRole,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<SignUpRequest, ValidationError> {
        let email = Email::parse(&self.email)?;
        let password = Password::parse(&self.password)?;
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::FullNameRequired);
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::PhoneRequired);
        }

        let (role, enable_both_roles) = match self.role {
            SignUpRole::Homeowner => (Role::Homeowner, false),
            SignUpRole::Contractor => (Role::Contractor, false),
            SignUpRole::Both => (Role::Homeowner, true),
        };

        Ok(SignUpRequest {
            email,
            password,
            role,
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            enable_both_roles,
        })
    }
}

/// Registers a new account. Does not sign the user in.
pub struct SignUpUseCase<'a, A>
where
    A: AuthService,
{
    auth: &'a A,
}

impl<'a, A> SignUpUseCase<'a, A>
where
    A: AuthService,
{
    pub fn new(auth: &'a A) -> Self {
        Self { auth }
    }

    #[tracing::instrument(name = "SignUpUseCase::execute", skip(self, form), fields(role = ?form.role))]
    pub async fn execute(&self, form: &SignUpForm) -> Result<(), LoginError> {
        let request = form.validate()?;
        self.auth.sign_up(&request).await?;
        Ok(())
    }
}
