//! JSON entry points. Same evaluator, same gate, different delivery: denials
//! here are status codes, not redirects.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::app::{
    domain::{ObjectAction, ObjectType},
    error::AppError,
    gate::TenantContext,
    identity::PrincipalClass,
    permissions::PermissionEvaluator,
    session::{ApiAuthenticatedPrincipal, TenantScope},
    AppState,
};

/// Effective capability flags for one object type.
#[derive(Debug, Serialize)]
pub struct GrantView {
    pub object_type: ObjectType,
    pub read: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub view_all: bool,
}

/// Response for GET /api/me/permissions.
#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub email: String,
    pub class: &'static str,
    pub is_super_admin: bool,
    pub organization_id: Option<String>,
    pub grants: Vec<GrantView>,
}

fn class_label(class: PrincipalClass) -> &'static str {
    match class {
        PrincipalClass::SuperAdmin => "super_admin",
        PrincipalClass::SystemAdmin => "system_admin",
        PrincipalClass::Member => "member",
    }
}

/// GET /api/me/permissions — The principal's effective permission table,
/// computed through the one sanctioned evaluator.
pub async fn my_permissions(
    ApiAuthenticatedPrincipal(principal): ApiAuthenticatedPrincipal,
    State(state): State<AppState>,
) -> Result<Json<PermissionsResponse>, AppError> {
    let evaluator = PermissionEvaluator::new(&state.db, &state.caches);
    let grants = if principal.is_super_admin {
        ObjectType::iter()
            .map(|object_type| GrantView {
                object_type,
                read: true,
                create: true,
                edit: true,
                delete: true,
                view_all: true,
            })
            .collect()
    } else {
        let table = evaluator.grants_for_principal(&principal).await?;
        ObjectType::iter()
            .map(|object_type| {
                let grant = table.grant(object_type).copied().unwrap_or_default();
                GrantView {
                    object_type,
                    read: grant.can_read,
                    create: grant.can_create,
                    edit: grant.can_edit,
                    delete: grant.can_delete,
                    view_all: grant.can_view_all,
                }
            })
            .collect()
    };

    Ok(Json(PermissionsResponse {
        email: principal.email.clone(),
        class: class_label(principal.class()),
        is_super_admin: principal.is_super_admin,
        organization_id: principal.organization_id.as_ref().map(|o| o.as_str()),
        grants,
    }))
}

/// Response for GET /api/organization.
#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub subdomain: Option<String>,
}

impl From<TenantContext> for OrganizationResponse {
    fn from(ctx: TenantContext) -> Self {
        Self {
            id: ctx.id.as_str(),
            name: ctx.name,
            subdomain: ctx.subdomain,
        }
    }
}

/// GET /api/organization — The tenant context the gate resolved, withheld
/// from principals who cannot read the Organization object.
pub async fn organization(
    ApiAuthenticatedPrincipal(principal): ApiAuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Result<Json<OrganizationResponse>, AppError> {
    let evaluator = PermissionEvaluator::new(&state.db, &state.caches);
    if !evaluator
        .can_access_object(&principal, ObjectType::Organization, ObjectAction::Read)
        .await?
    {
        return Err(AppError::Forbidden);
    }
    Ok(Json(organization.into()))
}

/// API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/me/permissions", get(my_permissions))
        .route("/api/organization", get(organization))
}
