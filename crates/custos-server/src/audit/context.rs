//! Request context capture
//!
//! Network-level facts recorded onto every event: client IP, user agent,
//! and the correlation id for the request that caused the write.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Network context attached to audit events
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub request_id: String,
}

impl RequestMeta {
    /// Capture context from request headers and the peer address
    ///
    /// `x-forwarded-for` may hold a comma-separated chain; the first entry
    /// is the original client. Falls back to the socket peer when no proxy
    /// header is present.
    pub fn from_parts(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> Self {
        let ip_address = client_ip(headers).or_else(|| remote_addr.map(|a| a.ip().to_string()));

        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Self {
            ip_address,
            user_agent,
            request_id,
        }
    }
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = forwarded.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
