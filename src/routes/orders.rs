use axum::{
    Extension, Json, Router,
    http::StatusCode,
    middleware,
    routing::get,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::logging::{LoggableUuid, StoreEvent};
use crate::models::order::{NewOrder, Order, OrderItem};
use crate::routes::AppState;
use crate::security::auth::{AuthenticatedUser, TokenIssuer, authenticate};
use crate::security::json::ValidatedJson;

pub fn router(tokens: TokenIssuer) -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route_layer(middleware::from_fn_with_state(tokens, authenticate))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPayload {
    pub items: Vec<OrderItem>,
}

pub async fn list_orders(
    Extension(state): Extension<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Json<Vec<Order>> {
    Json(state.orders.list_for(user_id))
}

#[tracing::instrument(name = "create_order", skip(state, payload))]
pub async fn create_order(
    Extension(state): Extension<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<OrderPayload>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = NewOrder {
        user_id,
        items: payload.items,
    }
    .place()?;

    let order = state.orders.insert(order);

    crate::log_store_event!(
        StoreEvent::OrderPlaced,
        order_id = %LoggableUuid(order.id),
        lines = order.lines.len(),
        total = order.total,
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}
