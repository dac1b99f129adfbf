use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::form::FormFields;
use crate::pricing::format_rut;

use super::{ModelValidationError, ValidationResult};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    pub rut: String,
    pub check_digit: char,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// RUT rendered as `12.345.678-5`.
    pub fn display_rut(&self) -> String {
        format_rut(&self.rut, self.check_digit)
            .unwrap_or_else(|| format!("{}-{}", self.rut, self.check_digit))
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: Option<String>,
    pub rut: String,
    pub check_digit: char,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

impl NewUser {
    /// Builds a user from a registration form that already passed validation.
    pub fn from_form(fields: &FormFields, password_hash: String) -> ValidationResult<Self> {
        if !fields.validate().is_empty() {
            return Err(ModelValidationError::InvalidRegistration);
        }

        let check_digit = fields
            .check_digit
            .chars()
            .next()
            .ok_or(ModelValidationError::InvalidRegistration)?
            .to_ascii_uppercase();
        let surname = fields.surname.trim();

        let mut new_user = NewUser {
            name: fields.name.trim().to_string(),
            surname: (!surname.is_empty()).then(|| surname.to_string()),
            rut: fields.rut.clone(),
            check_digit,
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            password_hash,
        };
        new_user.validate()?;
        Ok(new_user)
    }

    pub fn validate(&mut self) -> ValidationResult<()> {
        self.email = self.email.trim().to_lowercase();
        ensure_hash_present(&self.password_hash)
    }

    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name,
            surname: self.surname,
            rut: self.rut,
            check_digit: self.check_digit,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

fn ensure_hash_present(password_hash: &str) -> ValidationResult<()> {
    if password_hash.is_empty() {
        tracing::error!("Password hash is empty during validation");
        Err(ModelValidationError::MissingPasswordHash)
    } else {
        Ok(())
    }
}
