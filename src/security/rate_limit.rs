use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use dashmap::{DashMap, mapref::entry::Entry};

use crate::errors::AppError;
use crate::logging::{SanitizedIpAddr, StoreEvent};

/// Number of tracked clients above which expired windows are swept.
const SWEEP_THRESHOLD: usize = 1024;

/// Requests a single client may make within one window.
#[derive(Debug, Clone, Copy)]
pub struct RateQuota {
    pub burst: NonZeroU32,
    pub window: Duration,
}

impl RateQuota {
    pub const fn new(burst: NonZeroU32, window: Duration) -> Self {
        Self { burst, window }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    opened_at: Instant,
    used: u32,
}

impl ClientWindow {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.opened_at) >= window
    }
}

/// Per-route limiter keyed by client address. Cloning shares the counters.
#[derive(Clone)]
pub struct RateLimiter {
    quota: RateQuota,
    trust_proxy_headers: bool,
    sweep_threshold: usize,
    clients: Arc<DashMap<IpAddr, ClientWindow>>,
}

impl RateLimiter {
    pub fn new(quota: RateQuota, trust_proxy_headers: bool) -> Self {
        Self {
            quota,
            trust_proxy_headers,
            sweep_threshold: SWEEP_THRESHOLD,
            clients: Arc::new(DashMap::new()),
        }
    }

    /// Counts one request from `ip`. On refusal returns how long until the
    /// client's window reopens.
    fn admit(&self, ip: IpAddr, now: Instant) -> Result<(), Duration> {
        if self.clients.len() >= self.sweep_threshold {
            self.sweep(now);
        }

        let window = self.quota.window;
        let fresh = ClientWindow {
            opened_at: now,
            used: 1,
        };

        match self.clients.entry(ip) {
            Entry::Vacant(slot) => {
                slot.insert(fresh);
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                if current.is_expired(now, window) {
                    *current = fresh;
                    return Ok(());
                }
                if current.used >= self.quota.burst.get() {
                    let open_for = now.saturating_duration_since(current.opened_at);
                    return Err(window.saturating_sub(open_for));
                }
                current.used += 1;
                Ok(())
            }
        }
    }

    /// Drops every client whose window has run out.
    fn sweep(&self, now: Instant) {
        let window = self.quota.window;
        let before = self.clients.len();
        self.clients.retain(|_, client| !client.is_expired(now, window));
        tracing::debug!(
            removed = before.saturating_sub(self.clients.len()),
            remaining = self.clients.len(),
            "Swept expired rate limit windows"
        );
    }

    /// The address requests are counted against. Proxy headers are only
    /// consulted when the deployment says a proxy sits in front.
    fn client_ip(&self, headers: &HeaderMap, peer: IpAddr) -> IpAddr {
        if !self.trust_proxy_headers {
            return peer;
        }
        forwarded_ip(headers).unwrap_or(peer)
    }
}

/// Rightmost `X-Forwarded-For` hop (the one appended by our proxy), then
/// `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());

    header("x-forwarded-for")
        .and_then(|chain| chain.rsplit(',').next())
        .and_then(|hop| hop.trim().parse().ok())
        .or_else(|| header("x-real-ip").and_then(|ip| ip.trim().parse().ok()))
}

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_ip = limiter.client_ip(request.headers(), peer.ip());

    if let Err(wait) = limiter.admit(client_ip, Instant::now()) {
        crate::log_store_event!(
            StoreEvent::RateLimitExceeded,
            client_ip = %SanitizedIpAddr::new(client_ip),
            path = %request.uri().path(),
            retry_after_secs = wait.as_secs(),
            "Rate limit exceeded for client"
        );
        return Err(AppError::RateLimitExceeded {
            retry_after: Some(wait.max(Duration::from_secs(1))),
        });
    }

    Ok(next.run(request).await)
}
