//! Resolution of the partition key from the caller's network address.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use std::net::{IpAddr, SocketAddr};
use tracing::error;

use crate::core::state::AppState;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the address a request is attributed to.
///
/// With `trust_proxy` the left-most `X-Forwarded-For` entry wins when present;
/// otherwise the peer IP is used. Ports are never part of the key.
pub fn resolve_client_addr(headers: &HeaderMap, peer: SocketAddr, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = forwarded_client(headers) {
            return forwarded;
        }
    }
    canonical_ip(peer.ip()).to_string()
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    // normalize when the proxy sent a parseable IP, keep it verbatim otherwise
    Some(match first.parse::<IpAddr>() {
        Ok(ip) => canonical_ip(ip).to_string(),
        Err(_) => first.to_string(),
    })
}

/// Fold IPv4-mapped IPv6 addresses onto plain IPv4.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

/// Extractor yielding the caller's partition key.
///
/// Requires the router to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(ConnectInfo(peer)) = parts.extensions.get::<ConnectInfo<SocketAddr>>().cloned() else {
            error!("peer address missing from request; serve with connect info");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };
        Ok(ClientAddr(resolve_client_addr(&parts.headers, peer, state.trust_proxy())))
    }
}
