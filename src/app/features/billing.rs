//! The billing surface: subscription settings, the inactive notice, and the
//! billing provider's webhook.
//!
//! The gate keeps both pages reachable whatever the subscription status, so
//! an organization locked out by billing always has a way back in.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::app::{
    db,
    domain::{OrganizationId, PlanId, SubscriptionStatus},
    error::AppError,
    permissions::PermissionEvaluator,
    session::{AuthenticatedPrincipal, TenantScope},
    subscription_status::SubscriptionStatusProvider,
    AppState, APP_NAME,
};

/// Subscription settings page template.
#[derive(Template)]
#[template(path = "subscription_settings.html")]
pub struct SubscriptionSettingsTemplate {
    pub app_name: &'static str,
    pub organization_name: String,
    pub can_manage: bool,
    pub status: String,
    pub plan_name: String,
}

/// Inactive-subscription notice template.
#[derive(Template)]
#[template(path = "subscription_inactive.html")]
pub struct SubscriptionInactiveTemplate {
    pub app_name: &'static str,
    pub organization_name: String,
    pub can_manage: bool,
}

/// GET /settings/subscription — Current plan and status. Principals without
/// organization-edit capability see an in-page denied panel.
pub async fn settings(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    let evaluator = PermissionEvaluator::new(&state.db, &state.caches);
    let can_manage = evaluator
        .is_organization_admin(&principal)
        .await
        .unwrap_or(false);

    let provider = SubscriptionStatusProvider::new(&state.db, &state.caches);
    let (status, plan_name) = match provider.current(&organization.id).await {
        Ok(Some(subscription)) => {
            let status = subscription
                .parsed_status()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let plan_name = match PlanId::from_string(&subscription.plan_id) {
                Ok(plan_id) => db::plans::find_by_id(&state.db, &plan_id)
                    .await
                    .ok()
                    .flatten()
                    .map(|p| p.name)
                    .unwrap_or_else(|| "Unknown plan".to_string()),
                Err(_) => "Unknown plan".to_string(),
            };
            (status, plan_name)
        }
        Ok(None) => ("none".to_string(), "No plan".to_string()),
        Err(err) => {
            tracing::error!(%err, "failed to load subscription for settings page");
            ("unavailable".to_string(), "Unavailable".to_string())
        }
    };

    let template = SubscriptionSettingsTemplate {
        app_name: APP_NAME,
        organization_name: organization.name,
        can_manage,
        status,
        plan_name,
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

/// GET /subscription-inactive — The notice members land on when billing
/// lapses and they cannot fix it themselves.
pub async fn inactive(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    TenantScope(organization): TenantScope,
    State(state): State<AppState>,
) -> Response {
    let evaluator = PermissionEvaluator::new(&state.db, &state.caches);
    let can_manage = evaluator
        .is_organization_admin(&principal)
        .await
        .unwrap_or(false);

    let template = SubscriptionInactiveTemplate {
        app_name: APP_NAME,
        organization_name: organization.name,
        can_manage,
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

/// Billing webhook payload: a status transition for one organization's
/// subscription. The provider's wire format is normalized upstream.
#[derive(Debug, Deserialize)]
pub struct BillingEvent {
    pub organization_id: String,
    pub status: String,
}

/// POST /webhooks/billing — Apply a provider status transition and drop the
/// cached subscription so the very next request sees it.
pub async fn webhook(
    State(state): State<AppState>,
    Json(event): Json<BillingEvent>,
) -> Result<Json<serde_json::Value>, AppError> {
    let organization_id = OrganizationId::from_string(&event.organization_id)
        .map_err(|_| AppError::Validation("Unknown organization id".to_string()))?;
    let status = event
        .status
        .parse::<SubscriptionStatus>()
        .map_err(|_| AppError::Validation("Unknown subscription status".to_string()))?;

    let updated =
        db::subscriptions::update_current_status(&state.db, &organization_id, status).await?;
    if updated {
        state.caches.invalidate_subscription(&organization_id.as_str());
        tracing::info!(
            organization_id = %organization_id,
            status = %status,
            "applied billing status transition"
        );
    } else {
        tracing::warn!(
            organization_id = %organization_id,
            "billing event for organization without a subscription"
        );
    }

    Ok(Json(json!({ "received": true, "updated": updated })))
}

/// Billing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings/subscription", get(settings))
        .route("/subscription-inactive", get(inactive))
        .route("/webhooks/billing", post(webhook))
}
