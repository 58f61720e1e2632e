//! Read-through caches for the request gate.
//!
//! **Rule**: cached rows are advisory only. `is_configured` and the
//! subscription status are mutated concurrently (setup wizard, billing
//! webhook), so entries are time-boxed to a short TTL and explicitly
//! invalidated by the writers. A stale Allow that outlives a cancellation is
//! a security defect, so the TTL must stay small.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::app::db::organizations::Organization;
use crate::app::db::subscriptions::Subscription;
use crate::app::permissions::catalog::ProfileGrants;
use crate::app::permissions::plan_features::PlanSnapshot;

/// A bounded-staleness cache. A TTL of zero disables it entirely: inserts
/// are dropped and lookups always miss, which is what the test config uses.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<K, (Instant, V)>>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up a fresh entry. Expired entries read as misses and are left
    /// for `insert` to sweep.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().ok()?;
        let (stored_at, value) = entries.get(key)?;
        if stored_at.elapsed() < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    pub fn insert(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            let ttl = self.ttl;
            entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
            entries.insert(key, (Instant::now(), value));
        }
    }

    pub fn invalidate(&self, key: &K) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

/// The gate's injected cache set, one per row family. Writers call the
/// invalidation hooks; nothing here is process-global.
#[derive(Clone)]
pub struct GateCaches {
    pub organizations: TtlCache<String, Organization>,
    pub organizations_by_subdomain: TtlCache<String, Organization>,
    /// `None` is cached too: "no subscription row" is a valid, restrictive
    /// answer.
    pub subscriptions: TtlCache<String, Option<Subscription>>,
    pub profile_grants: TtlCache<String, ProfileGrants>,
    pub plans: TtlCache<String, PlanSnapshot>,
}

impl GateCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            organizations: TtlCache::new(ttl),
            organizations_by_subdomain: TtlCache::new(ttl),
            subscriptions: TtlCache::new(ttl),
            profile_grants: TtlCache::new(ttl),
            plans: TtlCache::new(ttl),
        }
    }

    /// Invalidation hook for setup-wizard completion and any other
    /// organization mutation.
    pub fn invalidate_organization(&self, organization_id: &str, subdomain: Option<&str>) {
        self.organizations.invalidate(&organization_id.to_string());
        if let Some(subdomain) = subdomain {
            self.organizations_by_subdomain.invalidate(&subdomain.to_string());
        }
    }

    /// Invalidation hook for billing-webhook status transitions.
    pub fn invalidate_subscription(&self, organization_id: &str) {
        self.subscriptions.invalidate(&organization_id.to_string());
    }
}
