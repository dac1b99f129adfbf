//! Registration form state and its reducer.
//!
//! The form is a plain value owned by whoever drives the screen. Each
//! [`FormEvent`] produces the next state; nothing is shared or mutated behind
//! the owner's back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validation::{
    FieldError, ValidationResult, is_blank, validate_check_digit, validate_confirmation,
    validate_email, validate_name_letters_only, validate_phone_digits_only, validate_rut,
    validate_strong_password, validate_surname,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Surname,
    Rut,
    CheckDigit,
    Email,
    Phone,
    Password,
    Confirmation,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::Surname,
        FormField::Rut,
        FormField::CheckDigit,
        FormField::Email,
        FormField::Phone,
        FormField::Password,
        FormField::Confirmation,
    ];

    pub fn is_mandatory(self) -> bool {
        !matches!(self, FormField::Surname)
    }

    /// Fields whose validity depends on this one.
    fn dependents(self) -> &'static [FormField] {
        match self {
            FormField::Rut => &[FormField::CheckDigit],
            FormField::Password => &[FormField::Confirmation],
            _ => &[],
        }
    }
}

/// Raw text of every registration field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub rut: String,
    pub check_digit: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirmation: String,
}

impl FormFields {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Surname => &self.surname,
            FormField::Rut => &self.rut,
            FormField::CheckDigit => &self.check_digit,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Password => &self.password,
            FormField::Confirmation => &self.confirmation,
        }
    }

    fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Surname => &mut self.surname,
            FormField::Rut => &mut self.rut,
            FormField::CheckDigit => &mut self.check_digit,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::Password => &mut self.password,
            FormField::Confirmation => &mut self.confirmation,
        };
        *slot = value;
    }

    /// Runs the validator for a single field against the current values.
    pub fn validate_field(&self, field: FormField) -> ValidationResult {
        match field {
            FormField::Name => validate_name_letters_only(&self.name),
            FormField::Surname => validate_surname(&self.surname),
            FormField::Rut => validate_rut(&self.rut),
            FormField::CheckDigit => validate_check_digit(&self.check_digit, &self.rut),
            FormField::Email => validate_email(&self.email),
            FormField::Phone => validate_phone_digits_only(&self.phone),
            FormField::Password => validate_strong_password(&self.password),
            FormField::Confirmation => validate_confirmation(&self.password, &self.confirmation),
        }
    }

    /// Validates every field. The RUT is checked first and the check digit
    /// is only compared once the RUT itself is valid.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        errors.set(FormField::Name, self.validate_field(FormField::Name));
        errors.set(FormField::Surname, self.validate_field(FormField::Surname));

        let rut_error = validate_rut(&self.rut);
        errors.set(FormField::Rut, rut_error);
        let check_digit_error = match rut_error {
            None => validate_check_digit(&self.check_digit, &self.rut),
            // Deferred: report only format problems with the check digit.
            Some(_) => validate_check_digit(&self.check_digit, ""),
        };
        errors.set(FormField::CheckDigit, check_digit_error);

        for field in [
            FormField::Email,
            FormField::Phone,
            FormField::Password,
            FormField::Confirmation,
        ] {
            errors.set(field, self.validate_field(field));
        }

        errors
    }

    pub fn mandatory_filled(&self) -> bool {
        FormField::ALL
            .iter()
            .filter(|field| field.is_mandatory())
            .all(|field| !is_blank(self.get(*field)))
    }
}

/// One optional error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    slots: BTreeMap<FormField, FieldError>,
}

impl FieldErrors {
    pub fn get(&self, field: FormField) -> ValidationResult {
        self.slots.get(&field).copied()
    }

    pub fn set(&mut self, field: FormField, error: ValidationResult) {
        match error {
            Some(error) => {
                self.slots.insert(field, error);
            }
            None => {
                self.slots.remove(&field);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, FieldError)> + '_ {
        self.slots.iter().map(|(field, error)| (*field, *error))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Changed { field: FormField, value: String },
    SubmitAttempted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    fields: FormFields,
    errors: FieldErrors,
    can_submit: bool,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> ValidationResult {
        self.errors.get(field)
    }

    pub fn can_submit(&self) -> bool {
        self.can_submit
    }

    pub fn reduce(mut self, event: FormEvent) -> Self {
        match event {
            FormEvent::Changed { field, value } => {
                self.fields.set(field, value);
                self.errors.set(field, self.fields.validate_field(field));

                for dependent in field.dependents() {
                    if !self.fields.get(*dependent).is_empty() {
                        self.errors
                            .set(*dependent, self.fields.validate_field(*dependent));
                    }
                }
            }
            FormEvent::SubmitAttempted if !self.can_submit => {
                for field in FormField::ALL {
                    if field.is_mandatory()
                        && self.errors.get(field).is_none()
                        && is_blank(self.fields.get(field))
                    {
                        self.errors.set(field, Some(FieldError::Required));
                    }
                }
                tracing::debug!(
                    error_count = self.errors.len(),
                    "Registration submit blocked by field errors"
                );
            }
            FormEvent::SubmitAttempted => {}
        }

        self.can_submit = self.errors.is_empty() && self.fields.mandatory_filled();
        self
    }

    /// Convenience for a single field change.
    pub fn change(self, field: FormField, value: impl Into<String>) -> Self {
        self.reduce(FormEvent::Changed {
            field,
            value: value.into(),
        })
    }

    /// Attempts to submit. Returns the field values when the form is ready,
    /// otherwise the form with required-field errors filled in.
    pub fn submit(self) -> Result<FormFields, Self> {
        let form = self.reduce(FormEvent::SubmitAttempted);
        if form.can_submit {
            Ok(form.fields)
        } else {
            Err(form)
        }
    }
}
