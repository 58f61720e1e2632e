//! The per-plan feature and limit catalog.
//!
//! A feature with no row for a plan is disabled; limit columns of `-1`
//! normalize to unlimited.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::app::db;
use crate::app::domain::{FeatureKey, Limit, LimitKey, PlanId};
use crate::app::gate::cache::GateCaches;

/// A plan row with its enabled feature set, parsed once.
#[derive(Debug, Clone)]
pub struct PlanSnapshot {
    pub plan: db::plans::Plan,
    features: HashSet<FeatureKey>,
}

impl PlanSnapshot {
    pub fn from_rows(plan: db::plans::Plan, rows: &[db::plans::PlanFeatureRow]) -> Self {
        let mut features = HashSet::new();
        for row in rows {
            if !row.is_enabled {
                continue;
            }
            match row.feature_key.parse::<FeatureKey>() {
                Ok(key) => {
                    features.insert(key);
                }
                Err(_) => {
                    tracing::warn!(
                        plan_id = %row.plan_id,
                        feature_key = %row.feature_key,
                        "skipping plan feature row with unknown key"
                    );
                }
            }
        }
        Self { plan, features }
    }

    pub fn feature_enabled(&self, key: FeatureKey) -> bool {
        self.features.contains(&key)
    }

    pub fn limit(&self, key: LimitKey) -> Limit {
        let raw = match key {
            LimitKey::Lots => self.plan.max_lots,
            LimitKey::Users => self.plan.max_users,
            LimitKey::ExtranetSeats => self.plan.max_extranet_seats,
        };
        Limit::from_raw(Some(raw))
    }
}

/// Read-through access to plan snapshots.
pub struct PlanFeatureCatalog<'a> {
    pool: &'a SqlitePool,
    caches: &'a GateCaches,
}

impl<'a> PlanFeatureCatalog<'a> {
    pub fn new(pool: &'a SqlitePool, caches: &'a GateCaches) -> Self {
        Self { pool, caches }
    }

    /// Load (or reuse) a plan's snapshot. Returns None for an unknown plan
    /// id, which callers treat as "nothing enabled".
    pub async fn snapshot(&self, plan_id: &PlanId) -> Result<Option<PlanSnapshot>, sqlx::Error> {
        let key = plan_id.as_str();
        if let Some(snapshot) = self.caches.plans.get(&key) {
            return Ok(Some(snapshot));
        }
        let Some(plan) = db::plans::find_by_id(self.pool, plan_id).await? else {
            return Ok(None);
        };
        let rows = db::plans::list_features(self.pool, plan_id).await?;
        let snapshot = PlanSnapshot::from_rows(plan, &rows);
        self.caches.plans.insert(key, snapshot.clone());
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> db::plans::Plan {
        db::plans::Plan {
            id: "plan1".to_string(),
            code: "starter".to_string(),
            name: "Starter".to_string(),
            max_lots: 10,
            max_users: 2,
            max_extranet_seats: -1,
            created_at: 0,
        }
    }

    fn feature_row(key: &str, enabled: bool) -> db::plans::PlanFeatureRow {
        db::plans::PlanFeatureRow {
            plan_id: "plan1".to_string(),
            feature_key: key.to_string(),
            is_enabled: enabled,
        }
    }

    #[test]
    fn absent_feature_is_disabled() {
        let snapshot = PlanSnapshot::from_rows(plan(), &[feature_row("documents", true)]);
        assert!(snapshot.feature_enabled(FeatureKey::Documents));
        assert!(!snapshot.feature_enabled(FeatureKey::Accounting));
    }

    #[test]
    fn disabled_row_stays_disabled() {
        let snapshot = PlanSnapshot::from_rows(plan(), &[feature_row("documents", false)]);
        assert!(!snapshot.feature_enabled(FeatureKey::Documents));
    }

    #[test]
    fn unknown_feature_rows_are_skipped() {
        let snapshot = PlanSnapshot::from_rows(plan(), &[feature_row("teleportation", true)]);
        assert!(!snapshot.feature_enabled(FeatureKey::Documents));
    }

    #[test]
    fn limits_normalize() {
        let snapshot = PlanSnapshot::from_rows(plan(), &[]);
        assert_eq!(snapshot.limit(LimitKey::Lots), Limit::Limited(10));
        assert_eq!(snapshot.limit(LimitKey::ExtranetSeats), Limit::Unlimited);
    }
}
