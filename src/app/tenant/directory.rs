//! Host-to-organization resolution.
//!
//! Tenants are addressed as `<subdomain>.<base domain>`. The bare base
//! domain (and any host outside it, e.g. a load balancer health probe)
//! carries no tenant context.

use sqlx::SqlitePool;

use crate::app::db;
use crate::app::gate::cache::GateCaches;

/// Outcome of resolving a request's Host header.
#[derive(Debug)]
pub enum HostTenant {
    /// Bare base domain or unrelated host: no tenant context.
    MainDomain,
    /// A subdomain of the base domain that maps to no organization.
    UnknownSubdomain(String),
    /// A subdomain that maps to an organization.
    Tenant(db::organizations::Organization),
}

/// Extract the tenant label from a Host header value. Returns None when the
/// host carries no subdomain. Port and the `www` alias are stripped; the
/// match against the base domain is exact.
pub fn subdomain_label(host: &str, base_domain: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host).trim().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host == base_domain {
        return None;
    }
    let label = host.strip_suffix(base_domain)?.strip_suffix('.')?;
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

pub struct TenantDirectory<'a> {
    pool: &'a SqlitePool,
    caches: &'a GateCaches,
    base_domain: &'a str,
}

impl<'a> TenantDirectory<'a> {
    pub fn new(pool: &'a SqlitePool, caches: &'a GateCaches, base_domain: &'a str) -> Self {
        Self {
            pool,
            caches,
            base_domain,
        }
    }

    /// Resolve a Host header to a tenant. Read-only; a single exact-match
    /// lookup, no fuzzy matching.
    pub async fn resolve(&self, host: &str) -> Result<HostTenant, sqlx::Error> {
        let Some(label) = subdomain_label(host, self.base_domain) else {
            return Ok(HostTenant::MainDomain);
        };

        if let Some(organization) = self.caches.organizations_by_subdomain.get(&label) {
            return Ok(HostTenant::Tenant(organization));
        }

        match db::organizations::find_by_subdomain(self.pool, &label).await? {
            Some(organization) => {
                self.caches
                    .organizations_by_subdomain
                    .insert(label, organization.clone());
                Ok(HostTenant::Tenant(organization))
            }
            None => Ok(HostTenant::UnknownSubdomain(label)),
        }
    }
}
