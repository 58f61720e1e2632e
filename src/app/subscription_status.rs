//! Read-through access to an organization's current subscription.
//!
//! The billing provider writes status transitions through the webhook; this
//! module only ever reads the resulting row. The latest row by creation
//! order is authoritative.

use sqlx::SqlitePool;

use crate::app::db;
use crate::app::domain::{OrganizationId, SubscriptionStatus};
use crate::app::gate::cache::GateCaches;

pub struct SubscriptionStatusProvider<'a> {
    pool: &'a SqlitePool,
    caches: &'a GateCaches,
}

impl<'a> SubscriptionStatusProvider<'a> {
    pub fn new(pool: &'a SqlitePool, caches: &'a GateCaches) -> Self {
        Self { pool, caches }
    }

    /// The organization's current subscription row, if any. "No row" is a
    /// meaningful (restrictive) answer and is cached like any other.
    pub async fn current(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<db::subscriptions::Subscription>, sqlx::Error> {
        let key = organization_id.as_str();
        if let Some(cached) = self.caches.subscriptions.get(&key) {
            return Ok(cached);
        }
        let row =
            db::subscriptions::find_current_for_organization(self.pool, organization_id).await?;
        self.caches.subscriptions.insert(key, row.clone());
        Ok(row)
    }

    /// The parsed status of the current subscription. An unparseable stored
    /// status reads as None, which callers treat as not access-granting.
    pub async fn current_status(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<SubscriptionStatus>, sqlx::Error> {
        Ok(self
            .current(organization_id)
            .await?
            .and_then(|s| s.parsed_status()))
    }
}
