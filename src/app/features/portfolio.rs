//! Business pages behind the permission boundary.
//!
//! The records themselves live elsewhere; what these handlers own is the
//! evaluator call. A denied principal gets the page with an access-denied
//! panel rendered in place, never a 500 and never a redirect.
//!
//! Read access answers "may this principal open the section at all". How a
//! listing is scoped (every record vs only records the principal created)
//! follows the profile's view-all flag and is applied by the data layer
//! that owns the records.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::app::{
    domain::{FeatureKey, ObjectAction, ObjectType},
    permissions::PermissionEvaluator,
    session::{AuthenticatedPrincipal, TenantScope},
    AppState, APP_NAME,
};

/// Shared listing page template for the portfolio sections.
#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub app_name: &'static str,
    pub organization_name: String,
    pub title: &'static str,
    pub allowed: bool,
}

fn render(template: ListingTemplate) -> Response {
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

async fn object_page(
    state: &AppState,
    principal: &crate::app::identity::Principal,
    organization_name: String,
    object_type: ObjectType,
    title: &'static str,
) -> Response {
    let evaluator = PermissionEvaluator::new(&state.db, &state.caches);
    let allowed = match evaluator
        .can_access_object(principal, object_type, ObjectAction::Read)
        .await
    {
        Ok(allowed) => allowed,
        Err(err) => {
            tracing::error!(%err, ?object_type, "permission lookup failed; denying");
            false
        }
    };
    render(ListingTemplate {
        app_name: APP_NAME,
        organization_name,
        title,
        allowed,
    })
}

/// GET /properties
pub async fn properties(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    object_page(&state, &principal, organization.name, ObjectType::Property, "Properties").await
}

/// GET /units
pub async fn units(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    object_page(&state, &principal, organization.name, ObjectType::Unit, "Units").await
}

/// GET /tenants
pub async fn tenants(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    object_page(&state, &principal, organization.name, ObjectType::Tenant, "Tenants").await
}

/// GET /leases
pub async fn leases(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    object_page(&state, &principal, organization.name, ObjectType::Lease, "Leases").await
}

/// GET /payments — Needs the plan feature AND the object permission; the
/// two axes are checked together and independently.
pub async fn payments(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    let evaluator = PermissionEvaluator::new(&state.db, &state.caches);
    let allowed = match evaluator
        .can_access_feature(
            &principal,
            FeatureKey::OnlinePayments,
            Some((ObjectType::Payment, ObjectAction::Read)),
        )
        .await
    {
        Ok(allowed) => allowed,
        Err(err) => {
            tracing::error!(%err, "feature lookup failed; denying");
            false
        }
    };
    render(ListingTemplate {
        app_name: APP_NAME,
        organization_name: organization.name,
        title: "Payments",
        allowed,
    })
}

/// Portfolio routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/properties", get(properties))
        .route("/units", get(units))
        .route("/tenants", get(tenants))
        .route("/leases", get(leases))
        .route("/payments", get(payments))
}
