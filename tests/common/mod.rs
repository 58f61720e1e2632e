#![allow(dead_code)]

use axum::body::Body;
use lokera::app::db;
use lokera::app::domain::{
    Email, HashedPassword, OrganizationId, Password, PlanId, ProfileId, Subdomain,
    SubscriptionStatus, UserId,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// The bare platform host used by Config::for_tests().
pub const MAIN_HOST: &str = "platform.test";

pub async fn test_pool() -> SqlitePool {
    // One connection: an in-memory SQLite database exists per connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    lokera::seeds::run_seeds(&pool).await.unwrap();
    pool
}

pub fn test_state(pool: SqlitePool) -> lokera::app::AppState {
    lokera::app::AppState::new(pool, lokera::app::config::Config::for_tests())
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    lokera::create_router(test_state(pool))
}

pub fn get_request(host: &str, path: &str, cookie: Option<&str>) -> http::Request<Body> {
    let mut builder = http::Request::builder()
        .method("GET")
        .uri(path)
        .header("host", host);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(
    host: &str,
    path: &str,
    cookie: Option<&str>,
    body: String,
) -> http::Request<Body> {
    let mut builder = http::Request::builder()
        .method("POST")
        .uri(path)
        .header("host", host)
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn post_json(host: &str, path: &str, body: serde_json::Value) -> http::Request<Body> {
    http::Request::builder()
        .method("POST")
        .uri(path)
        .header("host", host)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn location_of(response: &http::Response<axum::body::Body>) -> String {
    response
        .headers()
        .get("location")
        .expect("expected a redirect with a location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn login_form_body(email: &str, password: &str) -> String {
    format!(
        "email={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(password)
    )
}

pub fn extract_session_id_from_cookie(set_cookie_header: &str) -> Option<&str> {
    set_cookie_header
        .split(';')
        .next()?
        .strip_prefix("session_id=")
}

/// Create a user directly in the database. Returns the user id string.
pub async fn create_user(pool: &SqlitePool, email: &str, password: &str) -> String {
    create_user_inner(pool, email, password, false).await
}

/// Create a platform super-admin directly in the database.
pub async fn create_super_admin(pool: &SqlitePool, email: &str, password: &str) -> String {
    create_user_inner(pool, email, password, true).await
}

async fn create_user_inner(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    is_super_admin: bool,
) -> String {
    let email = Email::new(email.to_string()).unwrap();
    let password = Password::new(password.to_string()).unwrap();
    let password_hash = HashedPassword::from_password(&password).unwrap();
    let user_id = UserId::new();

    let new_user = db::NewUser {
        id: user_id.clone(),
        email,
        password_hash,
        is_super_admin,
    };
    db::users::insert(pool, &new_user).await.unwrap();
    user_id.as_str()
}

/// Create an organization. Returns the organization id string.
pub async fn create_organization(
    pool: &SqlitePool,
    name: &str,
    subdomain: Option<&str>,
    configured: bool,
) -> String {
    let organization = db::organizations::NewOrganization {
        id: OrganizationId::new(),
        name: name.to_string(),
        subdomain: subdomain.map(|s| Subdomain::new(s.to_string()).unwrap()),
        country: "SN".to_string(),
    };
    db::organizations::insert(pool, &organization).await.unwrap();
    if configured {
        db::organizations::mark_configured(pool, &organization.id)
            .await
            .unwrap();
    }
    organization.id.as_str()
}

/// Attach a user to an organization with one of the seeded system profiles.
pub async fn attach_member(pool: &SqlitePool, user_id: &str, organization_id: &str, profile: &str) {
    let profile_row = db::profiles::find_system_by_name(pool, profile)
        .await
        .unwrap()
        .expect("profile must be seeded");
    db::users::assign_organization(
        pool,
        &UserId::from_string(user_id).unwrap(),
        &OrganizationId::from_string(organization_id).unwrap(),
        &ProfileId::from_string(&profile_row.id).unwrap(),
    )
    .await
    .unwrap();
}

/// Create a subscription for an organization on a seeded plan.
pub async fn create_subscription(
    pool: &SqlitePool,
    organization_id: &str,
    plan_code: &str,
    status: SubscriptionStatus,
) {
    let plan = db::plans::find_by_code(pool, plan_code)
        .await
        .unwrap()
        .expect("plan must be seeded");
    let subscription = db::subscriptions::NewSubscription {
        organization_id: OrganizationId::from_string(organization_id).unwrap(),
        plan_id: PlanId::from_string(&plan.id).unwrap(),
        status,
        current_period_end: None,
    };
    db::subscriptions::insert(pool, &subscription).await.unwrap();
}

/// Log in through the real login route. Returns the cookie header value.
pub async fn login(app: &axum::Router, email: &str, password: &str) -> String {
    let request = post_form(
        MAIN_HOST,
        "/login",
        None,
        login_form_body(email, password),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        http::StatusCode::SEE_OTHER,
        "login should succeed"
    );

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("login sets the session cookie")
        .to_str()
        .unwrap();
    let session_id = extract_session_id_from_cookie(set_cookie).unwrap();
    format!("session_id={}", session_id)
}
