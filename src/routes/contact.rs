use std::{num::NonZeroU32, time::Duration};

use axum::{Extension, Json, Router, http::StatusCode, middleware, routing::post};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::logging::{LoggableUuid, SanitizedEmail, StoreEvent};
use crate::models::contact::NewContactMessage;
use crate::routes::AppState;
use crate::security::json::ValidatedJson;
use crate::security::rate_limit::{RateLimiter, RateQuota, enforce_rate_limit};

const CONTACT_QUOTA: RateQuota = RateQuota::new(NonZeroU32::new(3).unwrap(), Duration::from_secs(60));

pub fn router(trust_proxy_headers: bool) -> Router {
    Router::new().route(
        "/contact",
        post(send_message).layer(middleware::from_fn_with_state(
            RateLimiter::new(CONTACT_QUOTA, trust_proxy_headers),
            enforce_rate_limit,
        )),
    )
}

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub id: Uuid,
}

pub async fn send_message(
    Extension(state): Extension<AppState>,
    ValidatedJson(mut payload): ValidatedJson<NewContactMessage>,
) -> Result<(StatusCode, Json<ContactReceipt>), AppError> {
    payload.validate()?;

    let message = payload.into_message();
    let email = SanitizedEmail::new(&message.email);
    let id = state.inbox.push(message);

    crate::log_store_event!(
        StoreEvent::ContactReceived,
        message_id = %LoggableUuid(id),
        email = %email,
        "Contact message received"
    );

    Ok((StatusCode::ACCEPTED, Json(ContactReceipt { id })))
}
