use sqlx::FromRow;
use time::OffsetDateTime;

use crate::app::domain::{FeatureKey, PlanId};

/// Database row for plans table. Limit columns use -1 for unlimited.
#[derive(Debug, Clone, FromRow)]
pub struct Plan {
    pub id: String,
    pub code: String,
    pub name: String,
    pub max_lots: i64,
    pub max_users: i64,
    pub max_extranet_seats: i64,
    pub created_at: i64,
}

/// Database row for plan_features table.
#[derive(Debug, Clone, FromRow)]
pub struct PlanFeatureRow {
    pub plan_id: String,
    pub feature_key: String,
    pub is_enabled: bool,
}

/// Data structure for inserting a new plan.
pub struct NewPlan {
    pub id: PlanId,
    pub code: String,
    pub name: String,
    pub max_lots: i64,
    pub max_users: i64,
    pub max_extranet_seats: i64,
}

/// Find a plan by ID.
pub async fn find_by_id<'e, E>(executor: E, plan_id: &PlanId) -> Result<Option<Plan>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = ?")
        .bind(plan_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Find a plan by its stable code ("starter", "growth", "scale").
pub async fn find_by_code<'e, E>(executor: E, code: &str) -> Result<Option<Plan>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE code = ?")
        .bind(code)
        .fetch_optional(executor)
        .await
}

/// List all plans in seed order.
pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
}

/// Insert a new plan.
pub async fn insert<'e, E>(executor: E, plan: &NewPlan) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO plans (id, code, name, max_lots, max_users, max_extranet_seats, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(plan.id.as_str())
    .bind(&plan.code)
    .bind(&plan.name)
    .bind(plan.max_lots)
    .bind(plan.max_users)
    .bind(plan.max_extranet_seats)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// List the feature rows attached to a plan.
pub async fn list_features<'e, E>(
    executor: E,
    plan_id: &PlanId,
) -> Result<Vec<PlanFeatureRow>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, PlanFeatureRow>("SELECT * FROM plan_features WHERE plan_id = ?")
        .bind(plan_id.as_str())
        .fetch_all(executor)
        .await
}

/// Upsert a feature flag for a plan.
pub async fn set_feature<'e, E>(
    executor: E,
    plan_id: &PlanId,
    feature: FeatureKey,
    is_enabled: bool,
) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO plan_features (plan_id, feature_key, is_enabled) VALUES (?, ?, ?) \
         ON CONFLICT (plan_id, feature_key) DO UPDATE SET is_enabled = excluded.is_enabled",
    )
    .bind(plan_id.as_str())
    .bind(feature.to_string())
    .bind(is_enabled)
    .execute(executor)
    .await?;
    Ok(())
}
