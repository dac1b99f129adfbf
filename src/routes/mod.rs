use axum::{Extension, Router, extract::DefaultBodyLimit, middleware};

use crate::config::AppConfig;
use crate::security::{self, auth::TokenIssuer};
use crate::store::{ContactInbox, OrderStore, UserStore};

pub mod auth;
pub mod contact;
pub mod orders;

/// Shared handles every handler can reach through a request extension.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub orders: OrderStore,
    pub inbox: ContactInbox,
    pub tokens: TokenIssuer,
    /// Count rate limits against `X-Forwarded-For` / `X-Real-IP` instead of
    /// the socket peer.
    pub trust_proxy_headers: bool,
}

impl AppState {
    pub fn new(tokens: TokenIssuer) -> Self {
        Self {
            users: UserStore::new(),
            orders: OrderStore::new(),
            inbox: ContactInbox::new(),
            tokens,
            trust_proxy_headers: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            trust_proxy_headers: config.trust_proxy_headers,
            ..Self::new(TokenIssuer::from_config(config))
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    tracing::debug!("Creating application router");
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router(state.trust_proxy_headers))
                .merge(contact::router(state.trust_proxy_headers))
                .merge(orders::router(state.tokens.clone())),
        )
        .layer(middleware::from_fn(security::headers::set_security_headers))
        .layer(DefaultBodyLimit::max(security::json::MAX_BODY_SIZE_BYTES))
        .layer(Extension(state))
}
