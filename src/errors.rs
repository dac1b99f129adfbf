use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::form::FieldErrors;
use crate::logging::StoreEvent;
use crate::models::ModelValidationError;

/// Centralized application error type that encompasses all error variants
/// across different modules and provides consistent error responses.
#[derive(Debug, Error)]
pub enum AppError {
    // Validation errors
    #[error("validation error: {0}")]
    Validation(String),

    #[error("registration form has {} invalid field(s)", .0.len())]
    InvalidForm(FieldErrors),

    // Authentication and authorization errors
    #[error("authorization header is missing")]
    MissingAuthHeader,

    #[error("authorization header is malformed")]
    InvalidAuthHeader,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("authenticated identity not found in request context")]
    MissingIdentity,

    // Resource errors
    #[error("resource conflict: {0}")]
    Conflict(String),

    // Security and configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("JWT_SECRET environment variable is not set")]
    MissingJwtSecret,

    #[error("JWT_SECRET value is too weak; provide at least 32 random characters")]
    WeakJwtSecret,

    #[error("failed to encode authentication token: {0}")]
    TokenEncoding(String),

    #[error("failed to hash password: {0}")]
    PasswordHashing(String),

    #[error("background task failed: {0}")]
    Task(String),

    // Rate limiting
    #[error("rate limit exceeded; please try again later")]
    RateLimitExceeded { retry_after: Option<Duration> },

    // Request parsing errors
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("unsupported media type: expected application/json")]
    UnsupportedMediaType,

    #[error("request body too large")]
    PayloadTooLarge,
}

/// Standard JSON error response structure
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl AppError {
    /// Determines the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client errors
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingAuthHeader => StatusCode::UNAUTHORIZED,
            AppError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 5xx Server errors
            AppError::MissingIdentity => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingJwtSecret => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WeakJwtSecret => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TokenEncoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PasswordHashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Determines if error details should be exposed to the client
    /// In production (release builds), we hide internal error details
    fn should_expose_details(&self) -> bool {
        cfg!(debug_assertions) || self.status_code().is_client_error()
    }

    /// Gets the user-facing error message
    fn user_message(&self) -> String {
        if self.should_expose_details() {
            return self.to_string();
        }

        match self {
            AppError::MissingIdentity | AppError::TokenEncoding(_) => {
                "authentication error".to_string()
            }
            AppError::Config(_) | AppError::MissingJwtSecret | AppError::WeakJwtSecret => {
                "server configuration error".to_string()
            }
            AppError::PasswordHashing(_) => "password processing error".to_string(),
            _ => "internal server error".to_string(),
        }
    }

    /// Gets optional detailed error information
    /// Only included in debug builds or for client errors
    fn error_details(&self) -> Option<String> {
        if !self.should_expose_details() {
            return None;
        }

        match self {
            AppError::TokenEncoding(err) => Some(format!("token encoding: {err}")),
            AppError::PasswordHashing(err) => Some(format!("password hashing: {err}")),
            AppError::Task(err) => Some(format!("task: {err}")),
            AppError::RateLimitExceeded {
                retry_after: Some(retry_after),
            } => Some(format!("retry after {} seconds", retry_after.as_secs())),
            _ => None,
        }
    }

    /// Logs the error with appropriate context
    /// This allows internal errors to be logged even when not exposed to clients
    fn log_error(&self) {
        match self.status_code() {
            code if code.is_client_error() => match self {
                AppError::InvalidToken | AppError::InvalidAuthHeader | AppError::MissingAuthHeader => {
                    crate::log_store_event!(
                        StoreEvent::UnauthorizedAccess,
                        error = %self,
                        status_code = %code,
                        "Unauthorized access attempt"
                    );
                }
                _ => {
                    tracing::warn!(
                        error = %self,
                        status_code = %code,
                        "Client error"
                    );
                }
            },
            code if code.is_server_error() => {
                tracing::error!(
                    error = %self,
                    status_code = %code,
                    source = ?self.source(),
                    "Server error"
                );
            }
            _ => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before converting to response
        self.log_error();

        let status = self.status_code();
        let retry_after = match &self {
            AppError::RateLimitExceeded {
                retry_after: Some(retry_after),
            } => HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()).ok(),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: self.user_message(),
            details: self.error_details(),
            fields: match self {
                AppError::InvalidForm(fields) => Some(fields),
                _ => None,
            },
        });

        let mut response = (status, body).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(RETRY_AFTER, value);
        }
        response
    }
}

// Conversion implementations for common error types

impl From<ModelValidationError> for AppError {
    fn from(error: ModelValidationError) -> Self {
        AppError::Validation(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        AppError::TokenEncoding(error.to_string())
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(error: argon2::password_hash::Error) -> Self {
        AppError::PasswordHashing(error.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        AppError::Task(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use crate::validation::FieldError;

    #[test]
    fn test_validation_error_status() {
        let error = AppError::Validation("invalid input".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_form_status() {
        let error = AppError::InvalidForm(FieldErrors::default());
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_conflict_error_status() {
        let error = AppError::Conflict("email already registered".to_string());
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_rate_limit_error_status() {
        let error = AppError::RateLimitExceeded { retry_after: None };
        assert_eq!(error.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_client_errors_have_detailed_messages() {
        let error = AppError::Validation("field 'email' is required".to_string());
        assert!(error.should_expose_details());
        assert!(error.user_message().contains("field 'email' is required"));
    }

    #[test]
    fn test_model_error_converts_to_validation() {
        let error = AppError::from(ModelValidationError::EmptyOrder);
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[test]
    fn test_rate_limit_response_sets_retry_after() {
        let response = AppError::RateLimitExceeded {
            retry_after: Some(Duration::from_secs(30)),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn test_invalid_form_message_counts_fields() {
        let mut fields = FieldErrors::default();
        fields.set(FormField::Email, Some(FieldError::Required));
        fields.set(FormField::Rut, Some(FieldError::RutLength));
        assert_eq!(
            AppError::InvalidForm(fields).to_string(),
            "registration form has 2 invalid field(s)"
        );
    }

    #[test]
    fn test_request_parsing_statuses() {
        assert_eq!(
            AppError::InvalidJson("expected value".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_internal_errors_hidden_in_production() {
        let error = AppError::PasswordHashing("sensitive internal detail".to_string());
        assert!(!error.should_expose_details());
        assert!(!error.user_message().contains("sensitive internal detail"));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_internal_errors_exposed_in_debug() {
        let error = AppError::Task("worker panicked".to_string());
        assert!(error.should_expose_details());
        assert_eq!(error.error_details().as_deref(), Some("task: worker panicked"));
    }
}
