//! Legacy Frames storefront: registration validation, cart and pricing
//! logic, and the HTTP service that accepts registrations, logins, orders and
//! contact messages.

pub mod cart;
pub mod config;
pub mod errors;
pub mod form;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod security;
pub mod store;
pub mod validation;

pub use form::{FieldErrors, FormEvent, FormField, FormFields, RegistrationForm};
pub use validation::{FieldError, compute_check_digit};
