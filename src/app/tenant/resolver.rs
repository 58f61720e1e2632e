//! Tenant isolation enforcement at the host level.
//!
//! **Rule**: an authenticated principal operates only on its own
//! organization's host. Foreign-tenant traffic is redirected home, never
//! served, and never answered with a 403 that would confirm the foreign
//! tenant exists.

use sqlx::SqlitePool;

use crate::app::config::Config;
use crate::app::db;
use crate::app::domain::OrganizationId;
use crate::app::gate::cache::GateCaches;
use crate::app::identity::Principal;
use crate::app::tenant::directory::HostTenant;

/// Where the resolver decided the request belongs.
#[derive(Debug)]
pub struct TenantResolution {
    /// The organization whose host serves this request, when one resolved.
    pub organization: Option<db::organizations::Organization>,
    /// Redirect that must be honored before any further evaluation.
    pub redirect: Option<String>,
}

impl TenantResolution {
    fn proceed(organization: Option<db::organizations::Organization>) -> Self {
        Self {
            organization,
            redirect: None,
        }
    }

    fn redirect_to(target: String) -> Self {
        Self {
            organization: None,
            redirect: Some(target),
        }
    }
}

pub struct TenantResolver<'a> {
    pool: &'a SqlitePool,
    config: &'a Config,
    caches: &'a GateCaches,
}

impl<'a> TenantResolver<'a> {
    pub fn new(pool: &'a SqlitePool, config: &'a Config, caches: &'a GateCaches) -> Self {
        Self {
            pool,
            config,
            caches,
        }
    }

    /// Apply the cross-tenant and canonicalization rules for an
    /// authenticated, non-super-admin principal on a guarded route.
    ///
    /// - On a foreign tenant's host, redirect to the principal's own host
    ///   (or the main domain when its organization has no subdomain),
    ///   preserving the request path.
    /// - On the bare domain, members of a subdomain-bearing organization are
    ///   canonicalized onto their subdomain.
    pub async fn resolve_for_request(
        &self,
        host_tenant: &HostTenant,
        principal: &Principal,
        path: &str,
        canonicalize: bool,
    ) -> Result<TenantResolution, sqlx::Error> {
        match host_tenant {
            HostTenant::Tenant(host_org) => {
                let Some(own_id) = &principal.organization_id else {
                    // Organization-less principals get routed by the gate;
                    // the host organization is not theirs to use.
                    return Ok(TenantResolution::proceed(None));
                };
                if own_id.as_str() == host_org.id {
                    return Ok(TenantResolution::proceed(Some(host_org.clone())));
                }
                tracing::warn!(
                    user_id = %principal.user_id,
                    own_organization_id = %own_id,
                    host_organization_id = %host_org.id,
                    "cross-tenant access attempt; redirecting principal home"
                );
                let own = self.load_own_organization(own_id).await?;
                let target = match own.as_ref().and_then(|o| o.subdomain.clone()) {
                    Some(subdomain) => self.config.tenant_url(&subdomain, path),
                    None => self.config.main_url(path),
                };
                Ok(TenantResolution::redirect_to(target))
            }
            HostTenant::MainDomain => {
                let Some(own_id) = &principal.organization_id else {
                    return Ok(TenantResolution::proceed(None));
                };
                let own = self.load_own_organization(own_id).await?;
                match own {
                    Some(org) => {
                        // Canonicalization only once onboarding is done;
                        // half-configured organizations are routed to setup
                        // on the main domain instead.
                        if canonicalize && org.is_configured {
                            if let Some(subdomain) = &org.subdomain {
                                return Ok(TenantResolution::redirect_to(
                                    self.config.tenant_url(subdomain, path),
                                ));
                            }
                        }
                        Ok(TenantResolution::proceed(Some(org)))
                    }
                    None => Ok(TenantResolution::proceed(None)),
                }
            }
            // Unknown subdomains are handled before principal evaluation.
            HostTenant::UnknownSubdomain(_) => Ok(TenantResolution::proceed(None)),
        }
    }

    async fn load_own_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<db::organizations::Organization>, sqlx::Error> {
        let key = organization_id.as_str();
        if let Some(org) = self.caches.organizations.get(&key) {
            return Ok(Some(org));
        }
        let org = db::organizations::find_by_id(self.pool, organization_id).await?;
        if let Some(org) = &org {
            self.caches.organizations.insert(key, org.clone());
        }
        Ok(org)
    }
}
