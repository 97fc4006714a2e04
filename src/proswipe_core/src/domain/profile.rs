use serde::Serialize;
use thiserror::Error;

use super::role::Role;

const MIN_LICENSE_NUMBER_LENGTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Full name is required")]
    FullNameRequired,
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Company name is required")]
    CompanyNameRequired,
    #[error("License number must be at least 3 characters")]
    LicenseNumberTooShort,
}

/// Profile fields collected when an existing account adds its missing role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTypeProfile {
    pub role: Role,
    pub full_name: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
}

impl AccountTypeProfile {
    pub fn homeowner(full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            role: Role::Homeowner,
            full_name: full_name.into(),
            phone: phone.into(),
            company_name: None,
            license_number: None,
        }
    }

    pub fn contractor(
        full_name: impl Into<String>,
        phone: impl Into<String>,
        company_name: impl Into<String>,
        license_number: Option<String>,
    ) -> Self {
        Self {
            role: Role::Contractor,
            full_name: full_name.into(),
            phone: phone.into(),
            company_name: Some(company_name.into()),
            license_number,
        }
    }

    /// Trims and checks the form, producing the payload sent to the backend.
    pub fn validate(&self) -> Result<ProfileData, ProfileError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(ProfileError::FullNameRequired);
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ProfileError::PhoneRequired);
        }

        let contractor = match self.role {
            Role::Homeowner => None,
            Role::Contractor => {
                let company_name = non_blank(self.company_name.as_deref())
                    .ok_or(ProfileError::CompanyNameRequired)?;
                let license_number = non_blank(self.license_number.as_deref());
                if license_number.is_some_and(|l| l.chars().count() < MIN_LICENSE_NUMBER_LENGTH) {
                    return Err(ProfileError::LicenseNumberTooShort);
                }
                Some(ContractorDetails {
                    company_name: company_name.to_string(),
                    license_number: license_number.map(str::to_string),
                })
            }
        };

        Ok(ProfileData {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            contractor,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub full_name: String,
    pub phone: String,
    #[serde(flatten)]
    pub contractor: Option<ContractorDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorDetails {
    pub company_name: String,
    pub license_number: Option<String>,
}
