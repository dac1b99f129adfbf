//! Field-level validation for the registration form.
//!
//! Every validator is a pure, total function returning `None` when the value
//! is acceptable and the first failing rule otherwise.

pub mod check_digit;
mod fields;

use serde::{Serialize, Serializer};
use thiserror::Error;

pub use check_digit::compute_check_digit;
pub use fields::{
    validate_check_digit, validate_confirmation, validate_email, validate_name_letters_only,
    validate_phone_digits_only, validate_rut, validate_strong_password, validate_surname,
};

/// User-correctable problem with a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("this field is required")]
    Required,
    #[error("email is too short")]
    EmailTooShort,
    #[error("email has an invalid format")]
    EmailInvalidFormat,
    #[error("only letters and spaces are allowed")]
    LettersOnly,
    #[error("only digits are allowed")]
    DigitsOnly,
    #[error("phone must have 9 digits")]
    PhoneLength,
    #[error("RUT must have 7 or 8 digits")]
    RutLength,
    #[error("check digit must be a single character")]
    CheckDigitLength,
    #[error("check digit must be a digit or K")]
    CheckDigitCharacter,
    #[error("check digit does not match the RUT")]
    CheckDigitMismatch,
    #[error("password must have at least 8 characters")]
    PasswordTooShort,
    #[error("password must include an uppercase letter")]
    PasswordMissingUppercase,
    #[error("password must include a digit")]
    PasswordMissingDigit,
    #[error("password must include a symbol")]
    PasswordMissingSymbol,
    #[error("password must not contain spaces")]
    PasswordContainsSpace,
    #[error("confirm your password")]
    ConfirmationRequired,
    #[error("passwords do not match")]
    PasswordMismatch,
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of a single field validator.
pub type ValidationResult = Option<FieldError>;

/// Empty or whitespace only.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
