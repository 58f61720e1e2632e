mod common;

use std::time::Duration;

use common::*;
use http::StatusCode;
use http_body_util::BodyExt;
use lokera::app::db;
use lokera::app::domain::{
    FeatureKey, Limit, LimitKey, ObjectAction, ObjectType, OrganizationId, PlanId, ProfileId,
    SubscriptionStatus, UserId,
};
use lokera::app::gate::cache::GateCaches;
use lokera::app::identity::Principal;
use lokera::app::permissions::PermissionEvaluator;
use tower::ServiceExt;

fn caches() -> GateCaches {
    GateCaches::new(Duration::ZERO)
}

fn principal(
    organization_id: Option<&str>,
    profile_id: Option<&str>,
    is_super_admin: bool,
) -> Principal {
    Principal {
        user_id: UserId::new(),
        email: "someone@example.com".to_string(),
        organization_id: organization_id.map(|s| OrganizationId::from_string(s).unwrap()),
        profile_id: profile_id.map(|s| ProfileId::from_string(s).unwrap()),
        profile_name: None,
        is_super_admin,
    }
}

async fn system_profile_id(pool: &sqlx::SqlitePool, name: &str) -> String {
    db::profiles::find_system_by_name(pool, name)
        .await
        .unwrap()
        .unwrap()
        .id
}

mod object_permissions {
    use super::*;

    #[tokio::test]
    async fn no_profile_denies_everything() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);

        let p = principal(None, None, false);
        for object_type in [ObjectType::Property, ObjectType::Organization] {
            assert!(!evaluator
                .can_access_object(&p, object_type, ObjectAction::Read)
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn missing_row_denies_even_with_a_profile() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);

        // Viewer has no Organization row at all.
        let viewer = system_profile_id(&pool, "Viewer").await;
        let p = principal(None, Some(&viewer), false);
        assert!(!evaluator
            .can_access_object(&p, ObjectType::Organization, ObjectAction::Read)
            .await
            .unwrap());
        assert!(evaluator
            .can_access_object(&p, ObjectType::Property, ObjectAction::Read)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn super_admin_bypasses_the_catalog() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);

        let p = principal(None, None, true);
        assert!(evaluator
            .can_access_object(&p, ObjectType::Organization, ObjectAction::Delete)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn view_all_without_read_is_demoted_at_load() {
        let pool = test_pool().await;
        let profile = db::profiles::NewProfile {
            id: ProfileId::new(),
            name: "Broken Fixture".to_string(),
            organization_id: None,
        };
        db::profiles::insert(&pool, &profile).await.unwrap();
        db::profiles::insert_permission(
            &pool,
            &profile.id,
            ObjectType::Property,
            false,
            false,
            false,
            false,
            true,
        )
        .await
        .unwrap();

        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);
        let p = principal(None, Some(&profile.id.as_str()), false);
        let grants = evaluator.grants_for_principal(&p).await.unwrap();
        let grant = grants.grant(ObjectType::Property).unwrap();
        assert!(!grant.can_view_all, "view-all without read is contradictory");
        assert!(!grant.can_read);
    }

    #[tokio::test]
    async fn agent_reads_properties_without_view_all() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);

        let agent = system_profile_id(&pool, "Agent").await;
        let p = principal(None, Some(&agent), false);
        assert!(evaluator
            .can_access_object(&p, ObjectType::Property, ObjectAction::Read)
            .await
            .unwrap());

        // Read without view-all: listings are scoped to the agent's own
        // records by the data layer.
        let grants = evaluator.grants_for_principal(&p).await.unwrap();
        let grant = grants.grant(ObjectType::Property).unwrap();
        assert!(grant.can_read);
        assert!(!grant.can_view_all);
    }

    #[tokio::test]
    async fn manager_cannot_administer_the_organization() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);

        let manager = system_profile_id(&pool, "Manager").await;
        let p = principal(None, Some(&manager), false);
        assert!(!evaluator.is_organization_admin(&p).await.unwrap());

        let admin = system_profile_id(&pool, "System Administrator").await;
        let p = principal(None, Some(&admin), false);
        assert!(evaluator.is_organization_admin(&p).await.unwrap());
    }
}

mod plan_features {
    use super::*;

    async fn org_on_plan(pool: &sqlx::SqlitePool, plan_code: &str) -> String {
        let org = create_organization(pool, "Acme", None, true).await;
        create_subscription(pool, &org, plan_code, SubscriptionStatus::Active).await;
        org
    }

    #[tokio::test]
    async fn feature_needs_both_plan_flag_and_object_permission() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);
        let org = org_on_plan(&pool, "growth").await;

        let manager = system_profile_id(&pool, "Manager").await;
        let p = principal(Some(&org), Some(&manager), false);

        assert!(evaluator
            .can_access_feature(
                &p,
                FeatureKey::OnlinePayments,
                Some((ObjectType::Payment, ObjectAction::Read)),
            )
            .await
            .unwrap());

        // A profile with no Payment row loses the feature even though the
        // plan keeps it enabled.
        let bare = db::profiles::NewProfile {
            id: ProfileId::new(),
            name: "Property Only".to_string(),
            organization_id: None,
        };
        db::profiles::insert(&pool, &bare).await.unwrap();
        db::profiles::insert_permission(
            &pool,
            &bare.id,
            ObjectType::Property,
            true,
            false,
            false,
            false,
            false,
        )
        .await
        .unwrap();
        let p = principal(Some(&org), Some(&bare.id.as_str()), false);
        assert!(!evaluator
            .can_access_feature(
                &p,
                FeatureKey::OnlinePayments,
                Some((ObjectType::Payment, ObjectAction::Read)),
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn toggling_the_plan_flag_leaves_object_permissions_untouched() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);
        let org = org_on_plan(&pool, "growth").await;

        let manager = system_profile_id(&pool, "Manager").await;
        let p = principal(Some(&org), Some(&manager), false);

        let plan = db::plans::find_by_code(&pool, "growth").await.unwrap().unwrap();
        let plan_id = PlanId::from_string(&plan.id).unwrap();
        db::plans::set_feature(&pool, &plan_id, FeatureKey::OnlinePayments, false)
            .await
            .unwrap();

        assert!(!evaluator
            .can_access_feature(&p, FeatureKey::OnlinePayments, None)
            .await
            .unwrap());
        assert!(evaluator
            .can_access_object(&p, ObjectType::Payment, ObjectAction::Read)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn no_subscription_means_no_features() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);
        let org = create_organization(&pool, "Acme", None, true).await;

        let manager = system_profile_id(&pool, "Manager").await;
        let p = principal(Some(&org), Some(&manager), false);
        assert!(!evaluator
            .can_access_feature(&p, FeatureKey::Documents, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn limits_normalize_to_unlimited() {
        let pool = test_pool().await;
        let caches = caches();
        let evaluator = PermissionEvaluator::new(&pool, &caches);

        let starter = db::plans::find_by_code(&pool, "starter").await.unwrap().unwrap();
        let starter_id = PlanId::from_string(&starter.id).unwrap();
        assert_eq!(
            evaluator.limit_for(&starter_id, LimitKey::Lots).await.unwrap(),
            Limit::Limited(10)
        );

        let scale = db::plans::find_by_code(&pool, "scale").await.unwrap().unwrap();
        let scale_id = PlanId::from_string(&scale.id).unwrap();
        assert_eq!(
            evaluator.limit_for(&scale_id, LimitKey::Lots).await.unwrap(),
            Limit::Unlimited
        );
    }
}

mod call_sites {
    use super::*;

    async fn active_org_member(
        pool: &sqlx::SqlitePool,
        plan_code: &str,
        profile: &str,
        email: &str,
    ) -> String {
        let org = create_organization(pool, "Acme", None, true).await;
        create_subscription(pool, &org, plan_code, SubscriptionStatus::Active).await;
        let user = create_user(pool, email, "Password123").await;
        attach_member(pool, &user, &org, profile).await;
        org
    }

    #[tokio::test]
    async fn payments_page_is_gated_by_plan_feature() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        // Starter has no online payments.
        active_org_member(&pool, "starter", "Manager", "m@acme.test").await;
        let cookie = login(&app, "m@acme.test", "Password123").await;

        let response = app
            .oneshot(get_request(MAIN_HOST, "/payments", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8_lossy(&body);
        assert!(body.contains("Access denied"), "got: {body}");
    }

    #[tokio::test]
    async fn payments_page_opens_on_a_plan_with_the_feature() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        active_org_member(&pool, "growth", "Manager", "m@acme.test").await;
        let cookie = login(&app, "m@acme.test", "Password123").await;

        let response = app
            .oneshot(get_request(MAIN_HOST, "/payments", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8_lossy(&body);
        assert!(!body.contains("Access denied"), "got: {body}");
    }

    #[tokio::test]
    async fn denied_pages_render_in_place_not_as_errors() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        // Agent has no Report permission and no Organization read.
        active_org_member(&pool, "growth", "Agent", "a@acme.test").await;
        let cookie = login(&app, "a@acme.test", "Password123").await;

        let response = app
            .clone()
            .oneshot(get_request(MAIN_HOST, "/properties", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request(MAIN_HOST, "/api/organization", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn permissions_api_reports_the_effective_table() {
        let pool = test_pool().await;
        let app = test_router(pool.clone());
        active_org_member(&pool, "growth", "Viewer", "v@acme.test").await;
        let cookie = login(&app, "v@acme.test", "Password123").await;

        let response = app
            .oneshot(get_request(MAIN_HOST, "/api/me/permissions", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["class"], "member");
        assert_eq!(json["is_super_admin"], false);

        let grants = json["grants"].as_array().unwrap();
        let property = grants
            .iter()
            .find(|g| g["object_type"] == "property")
            .unwrap();
        assert_eq!(property["read"], true);
        assert_eq!(property["edit"], false);

        let organization = grants
            .iter()
            .find(|g| g["object_type"] == "organization")
            .unwrap();
        assert_eq!(organization["read"], false);
    }
}
