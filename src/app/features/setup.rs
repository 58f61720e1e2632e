//! The onboarding wizard.
//!
//! Step 1 creates the organization and links the creating user to it with
//! the System Administrator profile. Step 2 picks a plan, opens a trial
//! subscription, and flips `is_configured` exactly once. The gate keeps
//! configured organizations out of here and half-onboarded ones in.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use validator::Validate;

use crate::app::{
    db,
    domain::{OrganizationId, PlanId, ProfileId, Subdomain, SubscriptionStatus},
    session::AuthenticatedPrincipal,
    AppState, APP_NAME,
};

const TRIAL_DAYS: i64 = 14;

/// One selectable plan on the wizard's second step.
pub struct PlanOption {
    pub code: String,
    pub name: String,
}

/// Setup wizard template, both steps.
#[derive(Template)]
#[template(path = "setup.html")]
pub struct SetupTemplate {
    pub app_name: &'static str,
    pub organization_name: String,
    pub plans: Vec<PlanOption>,
    pub step: u8,
    pub error: String,
}

/// Organization form data for step 1.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(length(min = 1, max = 63))]
    pub subdomain: String,

    #[validate(length(min = 2, max = 2))]
    pub country: String,
}

/// Plan choice form data for step 2.
#[derive(Debug, Deserialize, Validate)]
pub struct ChoosePlanForm {
    #[validate(length(min = 1, max = 40))]
    pub plan_code: String,
}

fn step_one(error: impl Into<String>) -> SetupTemplate {
    SetupTemplate {
        app_name: APP_NAME,
        organization_name: String::new(),
        plans: Vec::new(),
        step: 1,
        error: error.into(),
    }
}

async fn step_two(
    state: &AppState,
    organization_name: String,
    error: impl Into<String>,
) -> Result<SetupTemplate, sqlx::Error> {
    let plans = db::plans::list_all(&state.db)
        .await?
        .into_iter()
        .map(|p| PlanOption {
            code: p.code,
            name: p.name,
        })
        .collect();
    Ok(SetupTemplate {
        app_name: APP_NAME,
        organization_name,
        plans,
        step: 2,
        error: error.into(),
    })
}

fn render(template: SetupTemplate) -> Response {
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

/// GET /setup — Show whichever wizard step the principal is on.
pub async fn show(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    State(state): State<AppState>,
) -> Response {
    let Some(organization_id) = &principal.organization_id else {
        return render(step_one(""));
    };

    let organization = match db::organizations::find_by_id(&state.db, organization_id).await {
        Ok(Some(org)) => org,
        // Dangling reference: restart from step 1.
        Ok(None) => return render(step_one("")),
        Err(err) => {
            tracing::error!(%err, "failed to load organization for setup");
            return render(step_one("Something went wrong. Please try again."));
        }
    };

    match step_two(&state, organization.name, "").await {
        Ok(template) => render(template),
        Err(err) => {
            tracing::error!(%err, "failed to load plans for setup");
            render(step_one("Something went wrong. Please try again."))
        }
    }
}

/// POST /setup — Create the organization (step 1).
pub async fn create_organization(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    State(state): State<AppState>,
    Form(form): Form<CreateOrganizationForm>,
) -> Response {
    // One organization per principal; re-submits fall through to step 2.
    if principal.organization_id.is_some() {
        return Redirect::to("/setup").into_response();
    }

    if form.validate().is_err() {
        return render(step_one("Please fill in every field."));
    }

    let subdomain = match Subdomain::new(form.subdomain) {
        Ok(s) => s,
        Err(e) => {
            let msg = e
                .message
                .map(|m| m.into_owned())
                .unwrap_or_else(|| "Invalid subdomain".to_string());
            return render(step_one(msg));
        }
    };

    match db::organizations::find_by_subdomain(&state.db, subdomain.as_str()).await {
        Ok(Some(_)) => return render(step_one("That subdomain is already taken.")),
        Ok(None) => {}
        Err(err) => {
            tracing::error!(%err, "subdomain availability check failed");
            return render(step_one("Something went wrong. Please try again."));
        }
    }

    let admin_profile = match db::profiles::find_system_by_name(
        &state.db,
        db::profiles::SYSTEM_ADMINISTRATOR,
    )
    .await
    {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            tracing::error!("system administrator profile is not seeded");
            return render(step_one("Something went wrong. Please try again."));
        }
        Err(err) => {
            tracing::error!(%err, "failed to load system administrator profile");
            return render(step_one("Something went wrong. Please try again."));
        }
    };
    let Ok(profile_id) = ProfileId::from_string(&admin_profile.id) else {
        tracing::error!(profile_id = %admin_profile.id, "seeded profile has malformed id");
        return render(step_one("Something went wrong. Please try again."));
    };

    let organization = db::organizations::NewOrganization {
        id: OrganizationId::new(),
        name: form.name.trim().to_string(),
        subdomain: Some(subdomain),
        country: form.country.trim().to_uppercase(),
    };

    let outcome: Result<(), sqlx::Error> = async {
        let mut tx = state.db.begin().await?;
        db::organizations::insert(&mut *tx, &organization).await?;
        db::users::assign_organization(&mut *tx, &principal.user_id, &organization.id, &profile_id)
            .await?;
        tx.commit().await
    }
    .await;

    match outcome {
        Ok(()) => Redirect::to("/setup").into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to create organization");
            render(step_one("Something went wrong. Please try again."))
        }
    }
}

/// POST /setup/complete — Choose a plan and finish onboarding (step 2).
pub async fn complete(
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    State(state): State<AppState>,
    Form(form): Form<ChoosePlanForm>,
) -> Response {
    let Some(organization_id) = &principal.organization_id else {
        return Redirect::to("/setup").into_response();
    };

    let organization = match db::organizations::find_by_id(&state.db, organization_id).await {
        Ok(Some(org)) => org,
        Ok(None) => return Redirect::to("/setup").into_response(),
        Err(err) => {
            tracing::error!(%err, "failed to load organization for setup completion");
            return Redirect::to("/setup").into_response();
        }
    };
    if organization.is_configured {
        return Redirect::to("/dashboard").into_response();
    }

    let plan = match db::plans::find_by_code(&state.db, form.plan_code.trim()).await {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            let template = step_two(&state, organization.name.clone(), "Pick one of the listed plans.")
                .await
                .unwrap_or_else(|_| step_one("Something went wrong. Please try again."));
            return render(template);
        }
        Err(err) => {
            tracing::error!(%err, "failed to load plan for setup completion");
            return Redirect::to("/setup").into_response();
        }
    };
    let Ok(plan_id) = PlanId::from_string(&plan.id) else {
        tracing::error!(plan_id = %plan.id, "plan row has malformed id");
        return Redirect::to("/setup").into_response();
    };

    let subscription = db::subscriptions::NewSubscription {
        organization_id: organization_id.clone(),
        plan_id,
        status: SubscriptionStatus::Trialing,
        current_period_end: Some(OffsetDateTime::now_utc() + Duration::days(TRIAL_DAYS)),
    };

    let outcome: Result<(), sqlx::Error> = async {
        let mut tx = state.db.begin().await?;
        db::subscriptions::insert(&mut *tx, &subscription).await?;
        db::organizations::mark_configured(&mut *tx, organization_id).await?;
        tx.commit().await
    }
    .await;

    match outcome {
        Ok(()) => {
            // The gate's cached rows predate the flip; drop them so the next
            // request sees the configured organization immediately.
            state
                .caches
                .invalidate_organization(&organization.id, organization.subdomain.as_deref());
            state.caches.invalidate_subscription(&organization.id);

            let target = match &organization.subdomain {
                Some(subdomain) => state.config.tenant_url(subdomain, "/dashboard"),
                None => "/dashboard".to_string(),
            };
            Redirect::to(&target).into_response()
        }
        Err(err) => {
            tracing::error!(%err, "failed to complete setup");
            Redirect::to("/setup").into_response()
        }
    }
}

/// Setup wizard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/setup", get(show).post(create_organization))
        .route("/setup/complete", post(complete))
}
