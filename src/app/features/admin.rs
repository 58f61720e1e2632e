//! The platform admin area. Super-admins operate the platform from here;
//! reaching a tenant's business routes requires explicitly selecting an
//! organization to impersonate.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::app::{
    db,
    domain::OrganizationId,
    session::{self, AuthenticatedPrincipal, TenantScope},
    AppState, APP_NAME,
};

/// Admin home template.
#[derive(Template)]
#[template(path = "admin_home.html")]
pub struct AdminHomeTemplate {
    pub app_name: &'static str,
    pub impersonating: Option<String>,
}

/// One row in the organization selector.
pub struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub subdomain: String,
    pub is_configured: bool,
}

/// Organization selector template.
#[derive(Template)]
#[template(path = "admin_organizations.html")]
pub struct AdminOrganizationsTemplate {
    pub app_name: &'static str,
    pub organizations: Vec<OrganizationRow>,
}

/// Selection form: an empty id clears the impersonation.
#[derive(Debug, Deserialize)]
pub struct SelectOrganizationForm {
    pub organization_id: String,
}

/// GET /admin — Platform home.
pub async fn home(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    impersonated: Option<TenantScope>,
) -> Response {
    // The gate only routes super-admins here; anything else is a bypass.
    if !principal.is_super_admin {
        return (StatusCode::NOT_FOUND, "Not found".to_string()).into_response();
    }
    let template = AdminHomeTemplate {
        app_name: APP_NAME,
        impersonating: impersonated.map(|TenantScope(org)| org.name),
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

/// GET /admin/organizations — Pick an organization to impersonate.
pub async fn organizations(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    State(state): State<AppState>,
) -> Response {
    if !principal.is_super_admin {
        return (StatusCode::NOT_FOUND, "Not found".to_string()).into_response();
    }

    let organizations = match db::organizations::list_all(&state.db).await {
        Ok(rows) => rows
            .into_iter()
            .map(|o| OrganizationRow {
                id: o.id,
                name: o.name,
                subdomain: o.subdomain.unwrap_or_default(),
                is_configured: o.is_configured,
            })
            .collect(),
        Err(err) => {
            tracing::error!(%err, "failed to list organizations");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
                .into_response();
        }
    };

    let template = AdminOrganizationsTemplate {
        app_name: APP_NAME,
        organizations,
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

/// POST /admin/organizations/select — Set or clear the impersonation cookie.
pub async fn select_organization(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SelectOrganizationForm>,
) -> Response {
    if !principal.is_super_admin {
        return (StatusCode::NOT_FOUND, "Not found".to_string()).into_response();
    }

    if form.organization_id.trim().is_empty() {
        let jar = jar.add(session::clear_impersonation_cookie());
        return (jar, Redirect::to("/admin")).into_response();
    }

    let Ok(organization_id) = OrganizationId::from_string(form.organization_id.trim()) else {
        return Redirect::to("/admin/organizations").into_response();
    };

    match db::organizations::find_by_id(&state.db, &organization_id).await {
        Ok(Some(organization)) => {
            tracing::info!(
                user_id = %principal.user_id,
                organization_id = %organization.id,
                "super-admin impersonating organization"
            );
            let jar = jar.add(session::impersonation_cookie(organization.id));
            (jar, Redirect::to("/dashboard")).into_response()
        }
        Ok(None) => Redirect::to("/admin/organizations").into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to load organization for impersonation");
            Redirect::to("/admin").into_response()
        }
    }
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(home))
        .route("/admin/organizations", get(organizations))
        .route("/admin/organizations/select", post(select_organization))
}
