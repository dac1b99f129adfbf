pub mod contact;
pub mod order;
pub mod user;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelValidationError {
    #[error("registration form has invalid fields")]
    InvalidRegistration,
    #[error("password hash must be present")]
    MissingPasswordHash,
    #[error("contact name: {0}")]
    InvalidContactName(crate::validation::FieldError),
    #[error("contact email: {0}")]
    InvalidContactEmail(crate::validation::FieldError),
    #[error("contact message must be between 1 and 1000 characters")]
    InvalidContactMessage,
    #[error("an order must contain at least one item")]
    EmptyOrder,
    #[error("item quantity must be at least 1")]
    InvalidQuantity,
    #[error("product {0} appears more than once with a different price or name")]
    ConflictingItem(u64),
    #[error("item name must be between 1 and 120 visible characters")]
    InvalidItemName,
    #[error("user identifier must be a valid UUID")]
    InvalidUserId,
}

pub type ValidationResult<T> = Result<T, ModelValidationError>;
