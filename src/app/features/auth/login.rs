use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    domain::{Email, Password},
    error::AppError,
    features::auth::service,
    session,
    AppState, APP_NAME,
};

/// Login form data from HTTP request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 254), email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,

    /// Where to return after sign-in. Only relative paths are honored.
    pub next: Option<String>,
}

/// Query parameters for the login page (return path set by the gate).
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub app_name: &'static str,
    pub error: String,
    pub next: String,
}

fn error_page(error: impl Into<String>, next: String) -> Html<String> {
    let template = LoginTemplate {
        app_name: APP_NAME,
        error: error.into(),
        next,
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string()))
}

/// GET /login — Show login form.
pub async fn show(Query(query): Query<LoginQuery>) -> LoginTemplate {
    LoginTemplate {
        app_name: APP_NAME,
        error: String::new(),
        next: query.next.unwrap_or_default(),
    }
}

/// POST /login — Process login form.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, Html<String>> {
    let next = form.next.clone().unwrap_or_default();

    if form.validate().is_err() {
        return Err(error_page("Invalid form data", next));
    }

    let email = match Email::new(form.email) {
        Ok(email) => email,
        Err(_) => return Err(error_page("Invalid email or password", next)),
    };

    // No strength check at login; we only verify against the stored hash.
    let password = Password::for_verification(form.password);

    match service::login(&state.db, &email, &password).await {
        Ok(session_id) => {
            let jar = jar.add(session::session_cookie(session_id));
            // Open redirects are not honored: only same-site paths.
            let target = form
                .next
                .filter(|n| n.starts_with('/') && !n.starts_with("//"))
                .unwrap_or_else(|| "/dashboard".to_string());
            Ok((jar, Redirect::to(&target)))
        }
        Err(AppError::Auth(msg)) => Err(error_page(msg, next)),
        Err(_) => Err(error_page("Internal server error", next)),
    }
}

/// Login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", get(show).post(submit))
}
