use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed, keyed::DashMapStateStore},
};

use crate::{common::error::AppError, config::AppState};

pub type UnkeyedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;
pub type IpRateLimiter = Arc<RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>>;

fn quota(attempts: u32, window_seconds: u64) -> Quota {
    let attempts = attempts.max(1);
    let period = Duration::from_millis((window_seconds * 1000) / u64::from(attempts));
    Quota::with_period(period)
        .expect("quota period is non-zero")
        .allow_burst(NonZeroU32::new(attempts).expect("attempts is non-zero"))
}

/// The three fixed quotas of the HTTP layer. All of them are skipped in
/// development.
pub struct RateLimits {
    /// 5 login attempts per 15 minutes, per client IP
    pub auth: IpRateLimiter,
    /// 100 requests per minute across the admin API
    pub admin: UnkeyedRateLimiter,
    /// 200 requests per minute across the public API
    pub general: UnkeyedRateLimiter,
}

impl RateLimits {
    pub fn new() -> Self {
        Self {
            auth: Arc::new(RateLimiter::dashmap(quota(5, 15 * 60))),
            admin: Arc::new(RateLimiter::direct(quota(100, 60))),
            general: Arc::new(RateLimiter::direct(quota(200, 60))),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new()
    }
}

fn client_ip(request: &Request) -> Option<IpAddr> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

pub async fn auth_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.is_development() {
        return Ok(next.run(request).await);
    }

    match client_ip(&request) {
        Some(ip) => {
            if state.rate_limits.auth.check_key(&ip).is_err() {
                return Err(AppError::RateLimited);
            }
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("could not determine client IP for auth rate limiting");
            Ok(next.run(request).await)
        }
    }
}

pub async fn admin_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.is_development() && state.rate_limits.admin.check().is_err() {
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}

pub async fn general_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.is_development() && state.rate_limits.general.check().is_err() {
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}
