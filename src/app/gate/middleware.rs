//! The single enforcement entry point, applied to the whole router.
//!
//! Runs the gate once per request, short-circuits redirects and denials, and
//! on Allow forwards the request with tenant context attached both as
//! request extensions (for extractors) and as `x-organization-id`,
//! `x-organization-slug`, and `x-pathname` headers (for downstream handlers
//! and proxies).

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::app::gate::{Decision, RequestGate};
use crate::app::AppState;

/// Cookie holding the organization a super-admin is impersonating.
pub const IMPERSONATION_COOKIE: &str = "impersonated_organization";

pub async fn enforce(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let path = request.uri().path().to_string();

    let session_id = jar.get("session_id").map(|c| c.value().to_string());
    let impersonated = jar.get(IMPERSONATION_COOKIE).map(|c| c.value().to_string());

    let gate = RequestGate::new(&state.db, &state.config, &state.caches);
    let decision = gate
        .decide(&host, &path, session_id.as_deref(), impersonated.as_deref())
        .await;

    match decision {
        Decision::Redirect(target) => Redirect::to(&target).into_response(),
        Decision::Forbidden(reason) => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": reason }))).into_response()
        }
        Decision::Allow(context) => {
            if let Ok(value) = HeaderValue::from_str(&path) {
                request.headers_mut().insert("x-pathname", value);
            }
            if let Some(organization) = &context.organization {
                if let Ok(value) = HeaderValue::from_str(&organization.id.as_str()) {
                    request.headers_mut().insert("x-organization-id", value);
                }
                if let Some(subdomain) = &organization.subdomain {
                    if let Ok(value) = HeaderValue::from_str(subdomain) {
                        request.headers_mut().insert("x-organization-slug", value);
                    }
                }
                request.extensions_mut().insert(organization.clone());
            }
            if let Some(principal) = context.principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
    }
}
