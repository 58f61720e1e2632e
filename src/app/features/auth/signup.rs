use askama::Template;
use axum::{
    extract::State,
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

/// Signup form data from HTTP request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, max = 254), email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(must_match(other = "password"))]
    pub confirm_password: String,
}

/// Signup page template.
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub app_name: &'static str,
    pub error: String,
    pub email: String,
}

fn error_page(error: impl Into<String>, email: impl Into<String>) -> Html<String> {
    let template = SignupTemplate {
        app_name: APP_NAME,
        error: error.into(),
        email: email.into(),
    };
    Html(template.render().unwrap_or_else(|_| "Template error".to_string()))
}

/// GET /signup — Show signup form.
pub async fn show() -> SignupTemplate {
    SignupTemplate {
        app_name: APP_NAME,
        error: String::new(),
        email: String::new(),
    }
}

/// POST /signup — Create the account and send the new user into onboarding.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<impl IntoResponse, Html<String>> {
    if form.validate().is_err() {
        return Err(error_page(
            "Passwords must match and be 8-128 characters",
            form.email,
        ));
    }

    let email = match Email::new(form.email.clone()) {
        Ok(email) => email,
        Err(_) => return Err(error_page("Invalid email address", form.email)),
    };

    let password = match Password::new(form.password) {
        Ok(password) => password,
        Err(e) => {
            let msg = e
                .message
                .map(|m| m.into_owned())
                .unwrap_or_else(|| "Invalid password".to_string());
            return Err(error_page(msg, form.email));
        }
    };

    match service::signup(&state.db, &email, &password).await {
        Ok(session_id) => {
            let jar = jar.add(session::session_cookie(session_id));
            Ok((jar, Redirect::to("/setup")))
        }
        Err(AppError::Auth(msg)) => Err(error_page(msg, form.email)),
        Err(_) => Err(error_page("Internal server error", form.email)),
    }
}

/// Signup routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/signup", get(show).post(submit))
}
