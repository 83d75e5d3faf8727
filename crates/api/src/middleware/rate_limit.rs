//! Rate limiting middleware.
//!
//! Public form, tool and AI endpoints are limited per client IP with a
//! keyed GCRA limiter.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter as GovRateLimiter,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Per-IP rate limiter shared across all requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    rate_limit_per_minute: u32,
    trust_forwarded_for: bool,
}

impl RateLimiterState {
    /// Returns `None` when the limit is 0, which disables rate limiting.
    pub fn new(rate_limit_per_minute: u32, trust_forwarded_for: bool) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: GovRateLimiter::keyed(Quota::per_minute(per_minute)),
            rate_limit_per_minute,
            trust_forwarded_for,
        })
    }

    /// Check if a request from `ip` should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        match self.limiter.check_key(&ip) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                // Minimum 1 second
                Err(wait_time.as_secs().max(1))
            }
        }
    }

    /// Drops state for clients whose quota has fully replenished.
    pub fn prune(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        self.limiter.len()
    }

    /// Client address: the hop appended by the trusted proxy (rightmost
    /// `X-Forwarded-For` entry) when enabled, otherwise the peer address.
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> IpAddr {
        if self.trust_forwarded_for {
            if let Some(ip) = forwarded_ip(headers) {
                return ip;
            }
        }
        peer.map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

// Entries left of the last one are client-supplied and can be forged.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .last()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .and_then(|v| v.trim().parse().ok())
}

/// Middleware that applies the per-IP limit.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = rate_limiter.client_ip(req.headers(), peer);

    if let Err(retry_after) = rate_limiter.check(ip) {
        tracing::warn!(client_ip = %ip, retry_after, "Rate limit exceeded");
        return rate_limited_response(retry_after);
    }

    next.run(req).await
}

fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = ApiError::RateLimited.into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(203, 0, 113, last))
    }

    #[test]
    fn test_zero_limit_disables() {
        assert!(RateLimiterState::new(0, false).is_none());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        let state = RateLimiterState::new(1, false).unwrap();
        assert!(state.check(ip(1)).is_ok());

        let result = state.check(ip(1));
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_clients_are_independent() {
        let state = RateLimiterState::new(2, false).unwrap();
        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(1)).is_ok());
        assert!(state.check(ip(1)).is_err());

        assert!(state.check(ip(2)).is_ok());
    }

    #[test]
    fn test_client_ip_from_peer() {
        let state = RateLimiterState::new(10, false).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.7"));
        let peer: SocketAddr = "203.0.113.9:5555".parse().unwrap();

        assert_eq!(state.client_ip(&headers, Some(peer)), ip(9));
        assert_eq!(
            state.client_ip(&HeaderMap::new(), None),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_client_ip_from_trusted_proxy() {
        let state = RateLimiterState::new(10, true).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.7"));
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();

        assert_eq!(
            state.client_ip(&headers, Some(peer)),
            "198.51.100.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_client_ip_ignores_client_supplied_hops() {
        let state = RateLimiterState::new(10, true).unwrap();
        let peer: SocketAddr = "10.0.0.1:443".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 198.51.100.7"),
        );
        assert_eq!(
            state.client_ip(&headers, Some(peer)),
            "198.51.100.7".parse::<IpAddr>().unwrap()
        );

        let mut split = HeaderMap::new();
        split.append("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));
        split.append("x-forwarded-for", HeaderValue::from_static("198.51.100.8"));
        assert_eq!(
            state.client_ip(&split, Some(peer)),
            "198.51.100.8".parse::<IpAddr>().unwrap()
        );

        let mut garbage = HeaderMap::new();
        garbage.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.7, junk"));
        assert_eq!(state.client_ip(&garbage, Some(peer)), "10.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_rate_limited_response_has_retry_after() {
        let response = rate_limited_response(7);
        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "7");
    }

    #[test]
    fn test_prune_keeps_working() {
        let state = RateLimiterState::new(5, false).unwrap();
        state.check(ip(1)).unwrap();
        state.prune();
        assert!(state.check(ip(1)).is_ok());
    }
}
