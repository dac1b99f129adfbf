use std::{num::NonZeroU32, time::Duration};

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::http::StatusCode;
use axum::{Extension, Json, Router, middleware, response::IntoResponse, routing::post};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::form::FormFields;
use crate::logging::{LoggableUuid, SanitizedEmail, SanitizedRut, StoreEvent};
use crate::models::user::{NewUser, User};
use crate::routes::AppState;
use crate::security::json::ValidatedJson;
use crate::security::rate_limit::{RateLimiter, RateQuota, enforce_rate_limit};
use crate::validation::validate_email;

const MAX_PASSWORD_CHARS: usize = 256;

const REGISTER_QUOTA: RateQuota =
    RateQuota::new(NonZeroU32::new(5).unwrap(), Duration::from_secs(5 * 60));
const LOGIN_QUOTA: RateQuota = RateQuota::new(NonZeroU32::new(10).unwrap(), Duration::from_secs(60));

pub fn router(trust_proxy_headers: bool) -> Router {
    Router::new()
        .route(
            "/auth/register",
            post(register).layer(middleware::from_fn_with_state(
                RateLimiter::new(REGISTER_QUOTA, trust_proxy_headers),
                enforce_rate_limit,
            )),
        )
        .route(
            "/auth/login",
            post(login).layer(middleware::from_fn_with_state(
                RateLimiter::new(LOGIN_QUOTA, trust_proxy_headers),
                enforce_rate_limit,
            )),
        )
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    name: String,
    #[serde(default)]
    surname: String,
    rut: String,
    check_digit: String,
    email: String,
    phone: String,
    password: String,
    confirmation: String,
}

impl From<RegisterRequest> for FormFields {
    fn from(request: RegisterRequest) -> Self {
        FormFields {
            name: request.name,
            surname: request.surname,
            rut: request.rut,
            check_digit: request.check_digit,
            email: request.email,
            phone: request.phone,
            password: request.password,
            confirmation: request.confirmation,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl LoginRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.email = self.email.trim().to_lowercase();
        if let Some(error) = validate_email(&self.email) {
            return Err(format!("email: {error}"));
        }

        if self.password.trim().is_empty() {
            return Err("password must not be empty".to_string());
        }

        if self.password.chars().count() > MAX_PASSWORD_CHARS {
            return Err("password must not exceed 256 characters".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: User,
}

#[tracing::instrument(name = "register_user", skip(state, payload), fields(rut, email, user_id))]
pub async fn register(
    Extension(state): Extension<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fields = FormFields::from(payload);

    tracing::Span::current().record("rut", tracing::field::display(SanitizedRut::new(&fields.rut)));
    tracing::Span::current().record(
        "email",
        tracing::field::display(SanitizedEmail::new(&fields.email)),
    );

    let errors = fields.validate();
    if !errors.is_empty() {
        crate::log_store_event!(
            StoreEvent::RegistrationRejected,
            invalid_fields = errors.len(),
            "Registration rejected by field validation"
        );
        return Err(AppError::InvalidForm(errors));
    }

    let password_hash = {
        let password = fields.password.clone();
        tokio::task::spawn_blocking(move || -> Result<String, AppError> {
            let salt = SaltString::generate(&mut OsRng);
            let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
            Ok(hash.to_string())
        })
        .await??
    };

    let new_user = NewUser::from_form(&fields, password_hash)?;
    let email = new_user.email.clone();

    let user = state.users.insert(new_user).inspect_err(|err| {
        crate::log_store_event!(
            StoreEvent::RegistrationConflict,
            rut = %SanitizedRut::new(&fields.rut),
            email = %SanitizedEmail::new(&email),
            error = %err,
            "User registration failed"
        );
    })?;

    tracing::Span::current().record("user_id", tracing::field::display(LoggableUuid(user.id)));

    let token = state.tokens.issue(user.id)?;

    crate::log_store_event!(
        StoreEvent::RegistrationSuccess,
        user_id = %LoggableUuid(user.id),
        rut = %SanitizedRut::new(&user.rut),
        email = %SanitizedEmail::new(&user.email),
        "User registered successfully"
    );

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[tracing::instrument(name = "login_user", skip(state, payload), fields(email, user_id))]
pub async fn login(
    Extension(state): Extension<AppState>,
    ValidatedJson(mut payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::Validation)?;

    let normalized_email = payload.email.clone();

    tracing::Span::current().record(
        "email",
        tracing::field::display(SanitizedEmail::new(&normalized_email)),
    );

    let user = state.users.find_by_email(&normalized_email).ok_or_else(|| {
        crate::log_store_event!(
            StoreEvent::LoginFailure,
            email = %SanitizedEmail::new(&normalized_email),
            reason = "user_not_found",
            "Login failed: user not found"
        );
        AppError::InvalidCredentials
    })?;

    tracing::Span::current().record("user_id", tracing::field::display(LoggableUuid(user.id)));

    let verified = {
        let password = payload.password;
        let stored_hash = user.password_hash.clone();
        tokio::task::spawn_blocking(move || {
            PasswordHash::new(&stored_hash)
                .map(|hash| {
                    Argon2::default()
                        .verify_password(password.as_bytes(), &hash)
                        .is_ok()
                })
                .unwrap_or(false)
        })
        .await?
    };

    if !verified {
        crate::log_store_event!(
            StoreEvent::LoginFailure,
            user_id = %LoggableUuid(user.id),
            email = %SanitizedEmail::new(&normalized_email),
            reason = "incorrect_password",
            "Login failed: incorrect password"
        );
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id)?;

    crate::log_store_event!(
        StoreEvent::LoginSuccess,
        user_id = %LoggableUuid(user.id),
        email = %SanitizedEmail::new(&normalized_email),
        "User logged in successfully"
    );

    Ok((StatusCode::OK, Json(AuthResponse { token, user })))
}
