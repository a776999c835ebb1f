//! Per-client-IP rate limiting with governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: login, registration and OAuth (~10/min)
//! - `ai_search_rate_limiter`: AI search, which fans out to paid APIs (~20/min)
//! - `api_rate_limiter`: everything else under `/api` (~100/min)

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Keys requests by client IP: proxy headers first, then the TCP peer.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

/// `CF-Connecting-IP`, then the first `X-Forwarded-For` hop, then
/// `X-Real-IP` and `Fly-Client-IP`.
fn header_ip(headers: &HeaderMap) -> Option<IpAddr> {
    parse_header(headers, "cf-connecting-ip")
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse().ok())
        })
        .or_else(|| parse_header(headers, "x-real-ip"))
        .or_else(|| parse_header(headers, "fly-client-ip"))
}

fn parse_header(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        header_ip(req.headers())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// One token every `replenish_secs`, bursting to `burst`.
///
/// # Panics
///
/// Panics if either argument is zero; callers below only pass constants.
fn limiter(replenish_secs: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()
        .expect("rate limiter periods and bursts are non-zero");
    GovernorLayer::new(Arc::new(config))
}

/// Auth endpoints: one request every 6 seconds, burst of 5.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// AI search: one request every 3 seconds, burst of 5.
#[must_use]
pub fn ai_search_rate_limiter() -> RateLimiterLayer {
    limiter(3, 5)
}

/// General API: one request per second, burst of 50.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    limiter(1, 50)
}
