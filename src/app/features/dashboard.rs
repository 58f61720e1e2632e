use askama::Template;
use axum::{routing::get, Router};

use crate::app::{
    session::{AuthenticatedPrincipal, TenantScope},
    AppState, APP_NAME,
};

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub app_name: &'static str,
    pub organization_name: String,
    pub email: String,
}

/// GET /dashboard — Landing page for a signed-in organization member.
pub async fn show(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
) -> DashboardTemplate {
    DashboardTemplate {
        app_name: APP_NAME,
        organization_name: organization.name,
        email: principal.email,
    }
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(show))
}
