use axum::{extract::State, response::Redirect, routing::post, Router};
use axum_extra::extract::cookie::CookieJar;

use crate::app::{db, error::AppError, session, AppState};

/// POST /logout — Log out the current user.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get("session_id") {
        db::sessions::delete(&state.db, cookie.value()).await?;
    }

    let jar = jar
        .add(session::clear_session_cookie())
        .add(session::clear_impersonation_cookie());

    Ok((jar, Redirect::to("/")))
}

/// Logout routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/logout", post(submit))
}
