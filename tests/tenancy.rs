mod common;

use common::*;
use http::StatusCode;
use http_body_util::BodyExt;
use lokera::app::domain::SubscriptionStatus;
use tower::ServiceExt;

/// A configured organization with an active subscription and one
/// System Administrator member.
async fn tenant_with_admin(
    pool: &sqlx::SqlitePool,
    name: &str,
    subdomain: &str,
    email: &str,
) -> String {
    let org = create_organization(pool, name, Some(subdomain), true).await;
    create_subscription(pool, &org, "growth", SubscriptionStatus::Active).await;
    let user = create_user(pool, email, "Password123").await;
    attach_member(pool, &user, &org, "System Administrator").await;
    org
}

#[tokio::test]
async fn unknown_subdomain_redirects_to_the_main_domain() {
    let pool = test_pool().await;
    let app = test_router(pool);

    let response = app
        .oneshot(get_request("ghost.platform.test", "/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "https://platform.test/");
}

#[tokio::test]
async fn own_subdomain_serves_the_request() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    tenant_with_admin(&pool, "Acme", "acme", "admin@acme.test").await;
    let cookie = login(&app, "admin@acme.test", "Password123").await;

    let response = app
        .oneshot(get_request("acme.platform.test", "/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn host_port_does_not_break_resolution() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    tenant_with_admin(&pool, "Acme", "acme", "admin@acme.test").await;
    let cookie = login(&app, "admin@acme.test", "Password123").await;

    let response = app
        .oneshot(get_request(
            "acme.platform.test:8443",
            "/dashboard",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn foreign_tenant_host_redirects_the_principal_home() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    tenant_with_admin(&pool, "Tenant X", "tenantx", "x@tenantx.test").await;
    tenant_with_admin(&pool, "Tenant Y", "tenanty", "y@tenanty.test").await;
    let cookie = login(&app, "y@tenanty.test", "Password123").await;

    let response = app
        .oneshot(get_request("tenantx.platform.test", "/units", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location_of(&response),
        "https://tenanty.platform.test/units",
        "cross-tenant requests land on the principal's own host, path preserved"
    );
}

#[tokio::test]
async fn foreign_tenant_host_without_own_subdomain_falls_back_to_main_domain() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    tenant_with_admin(&pool, "Tenant X", "tenantx", "x@tenantx.test").await;

    let org = create_organization(&pool, "Bare Org", None, true).await;
    create_subscription(&pool, &org, "growth", SubscriptionStatus::Active).await;
    let user = create_user(&pool, "bare@example.com", "Password123").await;
    attach_member(&pool, &user, &org, "System Administrator").await;
    let cookie = login(&app, "bare@example.com", "Password123").await;

    let response = app
        .oneshot(get_request("tenantx.platform.test", "/units", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "https://platform.test/units");
}

#[tokio::test]
async fn bare_domain_traffic_is_canonicalized_onto_the_subdomain() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    tenant_with_admin(&pool, "Acme", "acme", "admin@acme.test").await;
    let cookie = login(&app, "admin@acme.test", "Password123").await;

    let response = app
        .oneshot(get_request(MAIN_HOST, "/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location_of(&response),
        "https://acme.platform.test/dashboard"
    );
}

#[tokio::test]
async fn setup_is_not_canonicalized() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let org = create_organization(&pool, "Fresh", Some("fresh"), false).await;
    let user = create_user(&pool, "new@fresh.test", "Password123").await;
    attach_member(&pool, &user, &org, "System Administrator").await;
    let cookie = login(&app, "new@fresh.test", "Password123").await;

    let response = app
        .oneshot(get_request(MAIN_HOST, "/setup", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn www_is_an_alias_for_the_main_domain() {
    let pool = test_pool().await;
    let app = test_router(pool);

    let response = app
        .oneshot(get_request("www.platform.test", "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_context_is_exposed_to_api_handlers() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let org = tenant_with_admin(&pool, "Acme", "acme", "admin@acme.test").await;
    let cookie = login(&app, "admin@acme.test", "Password123").await;

    let response = app
        .oneshot(get_request(
            "acme.platform.test",
            "/api/organization",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["id"], org);
    assert_eq!(json["subdomain"], "acme");
    assert_eq!(json["name"], "Acme");
}
