use sqlx::FromRow;
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, PlanId, SubscriptionStatus, UserId};

/// Database row for subscriptions table. `status` is stored as text and
/// parsed into `SubscriptionStatus` by callers.
#[derive(Debug, Clone, FromRow)]
pub struct Subscription {
    pub id: String,
    pub organization_id: String,
    pub plan_id: String,
    pub status: String,
    pub current_period_end: Option<i64>,
    pub created_at: i64,
}

impl Subscription {
    /// Parse the stored status. An unrecognized value reads as None and is
    /// treated by the gate as not access-granting.
    pub fn parsed_status(&self) -> Option<SubscriptionStatus> {
        self.status.parse::<SubscriptionStatus>().ok()
    }
}

/// Data structure for inserting a new subscription.
pub struct NewSubscription {
    pub organization_id: OrganizationId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<OffsetDateTime>,
}

/// Find the current subscription for an organization: the latest row by
/// creation order is authoritative.
pub async fn find_current_for_organization<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Option<Subscription>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Subscription>(
        "SELECT * FROM subscriptions WHERE organization_id = ? \
         ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(organization_id.as_str())
    .fetch_optional(executor)
    .await
}

/// Insert a new subscription. Returns the subscription ID.
pub async fn insert<'e, E>(
    executor: E,
    subscription: &NewSubscription,
) -> Result<String, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let id = UserId::new().as_str();
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO subscriptions (id, organization_id, plan_id, status, current_period_end, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(subscription.organization_id.as_str())
    .bind(subscription.plan_id.as_str())
    .bind(subscription.status.to_string())
    .bind(subscription.current_period_end.map(|t| t.unix_timestamp()))
    .bind(now)
    .execute(executor)
    .await?;
    Ok(id)
}

/// Update the status of an organization's current subscription. Called by
/// the billing webhook. Returns false when no subscription row exists.
pub async fn update_current_status(
    pool: &sqlx::SqlitePool,
    organization_id: &OrganizationId,
    status: SubscriptionStatus,
) -> Result<bool, sqlx::Error> {
    let Some(current) = find_current_for_organization(pool, organization_id).await? else {
        return Ok(false);
    };
    sqlx::query("UPDATE subscriptions SET status = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(&current.id)
        .execute(pool)
        .await?;
    Ok(true)
}
