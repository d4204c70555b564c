//! Identity extraction
//!
//! The authentication collaborator terminates sessions upstream and injects
//! the caller's identity as headers: `x-user-id`, `x-user-email`,
//! `x-user-role`. These extractors trust those headers; nothing here
//! verifies credentials.

use async_trait::async_trait;
use axum::extract::connect_info::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::audit::{Actor, AuditError, RequestMeta};
use crate::error::AppError;

/// Caller role as reported by the collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }
}

/// Any authenticated caller
///
/// Rejects with 401 when `x-user-id` is missing or not a UUID.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub actor: Actor,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or_else(|| AppError::Unauthorized("Missing or invalid user identity".to_string()))?;

        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let role = Role::from_header(
            parts.headers.get("x-user-role").and_then(|v| v.to_str().ok()),
        );

        Ok(Self {
            actor: Actor::new(user_id, email),
            role,
        })
    }
}

/// An authenticated caller with the admin role
///
/// Rejects with 403 when the caller is authenticated but not an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Audit(AuditError::AuthorizationDenied));
        }
        Ok(Self(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(RequestMeta::from_parts(&parts.headers, remote_addr))
    }
}
