use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::app::{db, domain::PlanId, AppState, APP_NAME};

/// The home page template.
#[derive(Template)]
#[template(path = "site/home.html")]
pub struct HomeTemplate {
    pub app_name: &'static str,
}

/// One plan card on the pricing page.
pub struct PlanCard {
    pub name: String,
    pub lots: String,
    pub users: String,
    pub features: Vec<String>,
}

/// The pricing page template.
#[derive(Template)]
#[template(path = "site/pricing.html")]
pub struct PricingTemplate {
    pub app_name: &'static str,
    pub plans: Vec<PlanCard>,
}

fn limit_label(raw: i64) -> String {
    if raw < 0 {
        "Unlimited".to_string()
    } else {
        raw.to_string()
    }
}

/// GET /
pub async fn index() -> HomeTemplate {
    HomeTemplate { app_name: APP_NAME }
}

/// GET /pricing — Plan cards built from the live plan catalog.
pub async fn pricing(State(state): State<AppState>) -> Response {
    let plans = match db::plans::list_all(&state.db).await {
        Ok(plans) => plans,
        Err(err) => {
            tracing::error!(%err, "failed to load plans for pricing page");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
                .into_response();
        }
    };

    let mut cards = Vec::with_capacity(plans.len());
    for plan in plans {
        let features = match PlanId::from_string(&plan.id) {
            Ok(plan_id) => db::plans::list_features(&state.db, &plan_id)
                .await
                .unwrap_or_default()
                .into_iter()
                .filter(|f| f.is_enabled)
                .map(|f| f.feature_key.replace('_', " "))
                .collect(),
            Err(_) => Vec::new(),
        };
        cards.push(PlanCard {
            name: plan.name,
            lots: limit_label(plan.max_lots),
            users: limit_label(plan.max_users),
            features,
        });
    }

    let template = PricingTemplate {
        app_name: APP_NAME,
        plans: cards,
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

/// Routes for the public site pages.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/pricing", get(pricing))
}
