//! The single sanctioned permission gate.
//!
//! Every page and API handler asks this evaluator before touching a business
//! object; nothing else reads the permission tables. Object permission and
//! plan feature are orthogonal axes: a feature can be plan-enabled yet still
//! withheld from a principal lacking the paired object permission, and vice
//! versa, so gated affordances must pass both checks independently.

use sqlx::SqlitePool;

use crate::app::domain::{FeatureKey, Limit, LimitKey, ObjectAction, ObjectType, PlanId};
use crate::app::gate::cache::GateCaches;
use crate::app::identity::Principal;
use crate::app::permissions::catalog::{PermissionCatalog, ProfileGrants};
use crate::app::permissions::plan_features::PlanFeatureCatalog;
use crate::app::subscription_status::SubscriptionStatusProvider;

pub struct PermissionEvaluator<'a> {
    pool: &'a SqlitePool,
    caches: &'a GateCaches,
}

impl<'a> PermissionEvaluator<'a> {
    pub fn new(pool: &'a SqlitePool, caches: &'a GateCaches) -> Self {
        Self { pool, caches }
    }

    /// Can this principal perform `action` on `object_type`?
    ///
    /// Super-admins always may. Everyone else needs a profile with a
    /// permission row for the object type whose flag for the action is set;
    /// no profile or no row denies.
    pub async fn can_access_object(
        &self,
        principal: &Principal,
        object_type: ObjectType,
        action: ObjectAction,
    ) -> Result<bool, sqlx::Error> {
        if principal.is_super_admin {
            return Ok(true);
        }
        let Some(profile_id) = &principal.profile_id else {
            // Deny-by-default: no profile, no capabilities.
            return Ok(false);
        };
        let grants = PermissionCatalog::new(self.pool, self.caches)
            .grants_for(profile_id)
            .await?;
        Ok(grants.allows(object_type, action))
    }

    /// Whether the principal may administer the organization itself
    /// (billing, settings). Defined as edit capability on the Organization
    /// object type.
    pub async fn is_organization_admin(&self, principal: &Principal) -> Result<bool, sqlx::Error> {
        self.can_access_object(principal, ObjectType::Organization, ObjectAction::Edit)
            .await
    }

    /// Is `feature` available to this principal?
    ///
    /// True iff the organization's active plan enables the feature AND, when
    /// a capability requirement is given, the principal independently passes
    /// `can_access_object` for it. No organization or no subscription means
    /// no plan, which disables every feature.
    pub async fn can_access_feature(
        &self,
        principal: &Principal,
        feature: FeatureKey,
        requirement: Option<(ObjectType, ObjectAction)>,
    ) -> Result<bool, sqlx::Error> {
        let Some(organization_id) = &principal.organization_id else {
            return Ok(false);
        };
        let Some(subscription) = SubscriptionStatusProvider::new(self.pool, self.caches)
            .current(organization_id)
            .await?
        else {
            return Ok(false);
        };
        let Ok(plan_id) = PlanId::from_string(&subscription.plan_id) else {
            tracing::warn!(
                organization_id = %organization_id,
                "subscription references malformed plan id"
            );
            return Ok(false);
        };
        let Some(snapshot) = PlanFeatureCatalog::new(self.pool, self.caches)
            .snapshot(&plan_id)
            .await?
        else {
            return Ok(false);
        };
        if !snapshot.feature_enabled(feature) {
            return Ok(false);
        }
        match requirement {
            Some((object_type, action)) => {
                self.can_access_object(principal, object_type, action).await
            }
            None => Ok(true),
        }
    }

    /// The numeric limit a plan sets for `key`. Unknown plans read as
    /// unlimited-absent, matching the column normalization.
    pub async fn limit_for(&self, plan_id: &PlanId, key: LimitKey) -> Result<Limit, sqlx::Error> {
        match PlanFeatureCatalog::new(self.pool, self.caches)
            .snapshot(plan_id)
            .await?
        {
            Some(snapshot) => Ok(snapshot.limit(key)),
            None => Ok(Limit::Unlimited),
        }
    }

    /// The principal's full parsed grant table. Used by the permissions API
    /// endpoint; super-admins have no profile and read as an empty table
    /// there (their bypass lives in `can_access_object`).
    pub async fn grants_for_principal(
        &self,
        principal: &Principal,
    ) -> Result<ProfileGrants, sqlx::Error> {
        match &principal.profile_id {
            Some(profile_id) => {
                PermissionCatalog::new(self.pool, self.caches)
                    .grants_for(profile_id)
                    .await
            }
            None => Ok(ProfileGrants::default()),
        }
    }
}
