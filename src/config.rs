use std::{collections::HashSet, net::SocketAddr};

use crate::errors::AppError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const MIN_SECRET_LEN: usize = 32;
const MIN_SECRET_UNIQUE_CHARS: usize = 8;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub trust_proxy_headers: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("LEGACY_FRAMES_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| AppError::Config(format!("LEGACY_FRAMES_ADDR: {err}")))?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(AppError::MissingJwtSecret)?;
        ensure_secret_strength(&jwt_secret)?;

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| {
                    AppError::Config("TOKEN_TTL_HOURS must be a positive integer".to_string())
                })?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let trust_proxy_headers = match lookup("TRUST_PROXY_HEADERS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config("TRUST_PROXY_HEADERS must be true or false".to_string())
            })?,
            None => false,
        };

        tracing::debug!(
            %bind_addr,
            token_ttl_hours,
            trust_proxy_headers,
            "Configuration loaded"
        );

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            trust_proxy_headers,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn ensure_secret_strength(secret: &str) -> Result<(), AppError> {
    let trimmed = secret.trim();
    if trimmed.len() < MIN_SECRET_LEN {
        return Err(AppError::WeakJwtSecret);
    }

    let unique_chars = trimmed.chars().collect::<HashSet<_>>();
    if unique_chars.len() < MIN_SECRET_UNIQUE_CHARS {
        return Err(AppError::WeakJwtSecret);
    }

    Ok(())
}
