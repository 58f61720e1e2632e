//! Session cookies and the extractors handlers use to read what the gate
//! attached to the request.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde_json::json;

use crate::app::gate::middleware::IMPERSONATION_COOKIE;
use crate::app::gate::TenantContext;
use crate::app::identity::Principal;

pub fn session_cookie(session_id: impl Into<String>) -> Cookie<'static> {
    Cookie::build(("session_id", session_id.into()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(("session_id", ""))
        .path("/")
        .removal()
        .into()
}

pub fn impersonation_cookie(organization_id: impl Into<String>) -> Cookie<'static> {
    Cookie::build((IMPERSONATION_COOKIE, organization_id.into()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub fn clear_impersonation_cookie() -> Cookie<'static> {
    Cookie::build((IMPERSONATION_COOKIE, ""))
        .path("/")
        .removal()
        .into()
}

/// The gate-resolved principal, for page handlers. Missing means the gate
/// was bypassed somehow, so the rejection sends the user to sign in.
pub struct AuthenticatedPrincipal(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedPrincipal {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthenticatedPrincipal)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// The gate-resolved principal, for API handlers. Rejects with 401 JSON.
pub struct ApiAuthenticatedPrincipal(pub Principal);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ApiAuthenticatedPrincipal {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(ApiAuthenticatedPrincipal)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Authentication required" })),
                )
                    .into_response()
            })
    }
}

/// The organization this request operates on, as resolved by the gate.
pub struct TenantScope(pub TenantContext);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for TenantScope {
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(TenantScope)
            .ok_or_else(|| Redirect::to("/setup"))
    }
}
