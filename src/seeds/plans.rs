use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::app::db;
use crate::app::domain::{FeatureKey, PlanId};
use crate::seeds::{Seed, SeedOutcome};

struct PlanSpec {
    code: &'static str,
    name: &'static str,
    max_lots: i64,
    max_users: i64,
    max_extranet_seats: i64,
    features: &'static [FeatureKey],
}

const PLANS: &[PlanSpec] = &[
    PlanSpec {
        code: "starter",
        name: "Starter",
        max_lots: 10,
        max_users: 2,
        max_extranet_seats: 0,
        features: &[FeatureKey::Documents],
    },
    PlanSpec {
        code: "growth",
        name: "Growth",
        max_lots: 50,
        max_users: 10,
        max_extranet_seats: 50,
        features: &[
            FeatureKey::Documents,
            FeatureKey::Reports,
            FeatureKey::ExtranetPortal,
            FeatureKey::OnlinePayments,
        ],
    },
    PlanSpec {
        code: "scale",
        name: "Scale",
        max_lots: -1,
        max_users: -1,
        max_extranet_seats: -1,
        features: &[
            FeatureKey::Documents,
            FeatureKey::Reports,
            FeatureKey::ExtranetPortal,
            FeatureKey::OnlinePayments,
            FeatureKey::Accounting,
            FeatureKey::Messaging,
        ],
    },
];

pub struct SubscriptionPlans;

#[async_trait]
impl Seed for SubscriptionPlans {
    fn version(&self) -> i64 {
        20260601090000
    }

    fn description(&self) -> &str {
        "subscription_plans"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, sqlx::Error> {
        for spec in PLANS {
            if db::plans::find_by_code(pool, spec.code).await?.is_some() {
                continue;
            }
            let plan = db::plans::NewPlan {
                id: PlanId::new(),
                code: spec.code.to_string(),
                name: spec.name.to_string(),
                max_lots: spec.max_lots,
                max_users: spec.max_users,
                max_extranet_seats: spec.max_extranet_seats,
            };
            db::plans::insert(pool, &plan).await?;
            for feature in spec.features {
                db::plans::set_feature(pool, &plan.id, *feature, true).await?;
            }
        }
        Ok(SeedOutcome::Applied)
    }
}
