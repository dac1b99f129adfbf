use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{validate_email, validate_name_letters_only};

use super::{ModelValidationError, ValidationResult};

const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContactMessage {
    pub fn validate(&mut self) -> ValidationResult<()> {
        self.name = self.name.trim().to_string();
        if let Some(error) = validate_name_letters_only(&self.name) {
            return Err(ModelValidationError::InvalidContactName(error));
        }

        self.email = self.email.trim().to_lowercase();
        if let Some(error) = validate_email(&self.email) {
            return Err(ModelValidationError::InvalidContactEmail(error));
        }

        self.message = self.message.trim().to_string();
        let len = self.message.chars().count();
        if len == 0 || len > MAX_MESSAGE_CHARS {
            tracing::debug!(length = len, "Contact message validation failed");
            return Err(ModelValidationError::InvalidContactMessage);
        }

        Ok(())
    }

    pub fn into_message(self) -> ContactMessage {
        ContactMessage {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            message: self.message,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    fn message(name: &str, email: &str, body: &str) -> NewContactMessage {
        NewContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            message: body.to_string(),
        }
    }

    #[test]
    fn test_valid_message_is_normalized() {
        let mut msg = message(" Ana ", "ANA@DUOC.CL", " ¿Hacen marcos a medida? ");
        msg.validate().unwrap();
        assert_eq!(msg.name, "Ana");
        assert_eq!(msg.email, "ana@duoc.cl");
        assert_eq!(msg.message, "¿Hacen marcos a medida?");
    }

    #[test]
    fn test_field_errors_are_wrapped() {
        assert_eq!(
            message("", "ana@duoc.cl", "hola").validate(),
            Err(ModelValidationError::InvalidContactName(FieldError::Required))
        );
        assert_eq!(
            message("Ana", "ana", "hola").validate(),
            Err(ModelValidationError::InvalidContactEmail(
                FieldError::EmailTooShort
            ))
        );
    }

    #[test]
    fn test_message_length_bounds() {
        assert_eq!(
            message("Ana", "ana@duoc.cl", "   ").validate(),
            Err(ModelValidationError::InvalidContactMessage)
        );
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            message("Ana", "ana@duoc.cl", &long).validate(),
            Err(ModelValidationError::InvalidContactMessage)
        );
    }
}
