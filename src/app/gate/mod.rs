//! The request gate: one decision per inbound request.
//!
//! Every entry point funnels through `RequestGate::decide`, which combines
//! principal state, tenant resolution, organization lifecycle, and
//! subscription status into a single routing decision. The evaluation order
//! is strict and first-match-wins; every reachable combination of inputs
//! maps to exactly one outcome.
//!
//! Lookup failures never fail open. A failed user lookup reads as
//! unauthenticated; failed organization or subscription lookups route to the
//! most restrictive applicable destination. Both are logged.

pub mod cache;
pub mod middleware;
pub mod route_class;

use sqlx::SqlitePool;

use crate::app::config::Config;
use crate::app::db;
use crate::app::domain::OrganizationId;
use crate::app::gate::cache::GateCaches;
use crate::app::gate::route_class::{classify, RouteClass};
use crate::app::identity::{self, Principal};
use crate::app::permissions::PermissionEvaluator;
use crate::app::subscription_status::SubscriptionStatusProvider;
use crate::app::tenant::{HostTenant, TenantDirectory, TenantResolver};

/// The organization a request is allowed to operate on.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub id: OrganizationId,
    pub name: String,
    pub subdomain: Option<String>,
}

impl TenantContext {
    fn from_row(org: &db::organizations::Organization) -> Option<Self> {
        let id = OrganizationId::from_string(&org.id).ok()?;
        Some(Self {
            id,
            name: org.name.clone(),
            subdomain: org.subdomain.clone(),
        })
    }
}

/// Context attached to a request the gate lets through.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub organization: Option<TenantContext>,
}

/// The gate's verdict. Produced fresh per request and never cached:
/// organization and subscription state change underneath us.
#[derive(Debug)]
pub enum Decision {
    /// Pass through with tenant context attached.
    Allow(RequestContext),
    /// Short-circuit to this target (relative path or absolute URL).
    Redirect(String),
    /// Deny without navigation. Emitted by handler-level permission checks;
    /// the routing state machine itself only ever allows or redirects.
    Forbidden(&'static str),
}

fn login_target(path: &str) -> String {
    format!("/login?next={}", urlencoding::encode(path))
}

pub struct RequestGate<'a> {
    pool: &'a SqlitePool,
    config: &'a Config,
    caches: &'a GateCaches,
}

impl<'a> RequestGate<'a> {
    pub fn new(pool: &'a SqlitePool, config: &'a Config, caches: &'a GateCaches) -> Self {
        Self {
            pool,
            config,
            caches,
        }
    }

    /// Decide the fate of one request.
    ///
    /// API callers cannot follow page redirects, so any redirect verdict on
    /// an `/api/` path is delivered as Forbidden instead; the reason string
    /// never names the tenant or rule involved.
    pub async fn decide(
        &self,
        host: &str,
        path: &str,
        session_id: Option<&str>,
        impersonated: Option<&str>,
    ) -> Decision {
        match self.decide_routing(host, path, session_id, impersonated).await {
            Decision::Redirect(_) if path.starts_with("/api/") => {
                Decision::Forbidden("access_denied")
            }
            decision => decision,
        }
    }

    async fn decide_routing(
        &self,
        host: &str,
        path: &str,
        session_id: Option<&str>,
        impersonated: Option<&str>,
    ) -> Decision {
        let class = classify(path);

        let principal = match session_id {
            None => None,
            Some(sid) => match identity::current_principal(self.pool, sid).await {
                Ok(p) => p,
                Err(err) => {
                    tracing::error!(%err, "principal lookup failed; treating request as unauthenticated");
                    return Decision::Redirect(login_target(path));
                }
            },
        };

        let directory = TenantDirectory::new(self.pool, self.caches, &self.config.base_domain);
        let host_tenant = match directory.resolve(host).await {
            Ok(t) => t,
            Err(err) => {
                tracing::error!(%err, host, "tenant lookup failed; redirecting to main domain");
                return Decision::Redirect(self.config.main_url("/"));
            }
        };

        if let HostTenant::UnknownSubdomain(label) = &host_tenant {
            tracing::debug!(%label, "host names no known tenant");
            return Decision::Redirect(self.config.main_url("/"));
        }

        // Public routes pass through, with tenant context when the host
        // carries one.
        if class == RouteClass::Public {
            let organization = match &host_tenant {
                HostTenant::Tenant(org) => TenantContext::from_row(org),
                _ => None,
            };
            return Decision::Allow(RequestContext {
                principal,
                organization,
            });
        }

        let Some(principal) = principal else {
            return Decision::Redirect(login_target(path));
        };

        // Host-level tenant isolation and canonicalization. Super-admins
        // have no home tenant and are routed by the admin branches below.
        let mut resolved_org = None;
        if !principal.is_super_admin {
            let resolver = TenantResolver::new(self.pool, self.config, self.caches);
            let canonicalize = class.is_organization_scoped();
            match resolver
                .resolve_for_request(&host_tenant, &principal, path, canonicalize)
                .await
            {
                Ok(resolution) => {
                    if let Some(target) = resolution.redirect {
                        return Decision::Redirect(target);
                    }
                    resolved_org = resolution.organization;
                }
                Err(err) => {
                    tracing::error!(%err, "organization lookup failed during tenant resolution");
                    if class != RouteClass::Setup {
                        return Decision::Redirect("/setup".to_string());
                    }
                    // Already headed to setup; let it render rather than
                    // redirect to itself.
                }
            }
        }

        if class == RouteClass::Setup {
            return self.decide_setup(principal, resolved_org);
        }

        if class == RouteClass::Admin {
            if !principal.is_super_admin {
                return Decision::Redirect("/dashboard".to_string());
            }
            let organization = match impersonated {
                Some(raw) => self.load_impersonated(raw).await.unwrap_or(None),
                None => None,
            }
            .as_ref()
            .and_then(TenantContext::from_row);
            return Decision::Allow(RequestContext {
                principal: Some(principal),
                organization,
            });
        }

        // Organization-scoped routes from here on.
        let (org, subscription_admin_override) = if principal.is_super_admin {
            let Some(raw) = impersonated else {
                // Platform operators work the admin area, not a tenant's
                // business data.
                return Decision::Redirect("/admin".to_string());
            };
            match self.load_impersonated(raw).await {
                Ok(Some(org)) => (org, true),
                Ok(None) => return Decision::Redirect("/admin/organizations".to_string()),
                Err(err) => {
                    tracing::error!(%err, "impersonated organization lookup failed");
                    return Decision::Redirect("/admin".to_string());
                }
            }
        } else {
            let Some(own_id) = &principal.organization_id else {
                // Zero organization membership blocks every protected route.
                return Decision::Redirect("/setup".to_string());
            };
            match resolved_org {
                Some(org) => (org, false),
                None => {
                    tracing::warn!(
                        user_id = %principal.user_id,
                        organization_id = %own_id,
                        "organization row missing; routing to setup"
                    );
                    return Decision::Redirect("/setup".to_string());
                }
            }
        };

        // A half-onboarded organization exposes no business routes, for any
        // role.
        if !org.is_configured {
            return Decision::Redirect("/setup".to_string());
        }

        let Some(organization) = TenantContext::from_row(&org) else {
            tracing::error!(organization_id = %org.id, "organization row has malformed id");
            return Decision::Redirect("/setup".to_string());
        };

        // Billing surfaces stay reachable regardless of subscription state,
        // so an inactive subscription cannot cause a redirect loop.
        if matches!(class, RouteClass::Billing | RouteClass::SubscriptionInactive) {
            return Decision::Allow(RequestContext {
                principal: Some(principal),
                organization: Some(organization),
            });
        }

        let provider = SubscriptionStatusProvider::new(self.pool, self.caches);
        let status = match provider.current_status(&organization.id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::error!(
                    %err,
                    organization_id = %organization.id,
                    "subscription lookup failed; withholding access"
                );
                return Decision::Redirect("/subscription-inactive".to_string());
            }
        };

        if status.is_some_and(|s| s.grants_access()) {
            return Decision::Allow(RequestContext {
                principal: Some(principal),
                organization: Some(organization),
            });
        }

        // Inactive subscription: whoever can edit the organization gets sent
        // to fix billing; everyone else gets the notice page.
        let manages_billing = if subscription_admin_override {
            true
        } else {
            let evaluator = PermissionEvaluator::new(self.pool, self.caches);
            match evaluator.is_organization_admin(&principal).await {
                Ok(v) => v,
                Err(err) => {
                    tracing::error!(%err, "permission lookup failed; using restrictive path");
                    false
                }
            }
        };
        if manages_billing {
            Decision::Redirect("/settings/subscription".to_string())
        } else {
            Decision::Redirect("/subscription-inactive".to_string())
        }
    }

    fn decide_setup(
        &self,
        principal: Principal,
        resolved_org: Option<db::organizations::Organization>,
    ) -> Decision {
        // Super-admins never complete tenant onboarding.
        if principal.is_super_admin {
            return Decision::Redirect("/admin/organizations".to_string());
        }
        match &principal.organization_id {
            None => Decision::Allow(RequestContext {
                principal: Some(principal),
                organization: None,
            }),
            Some(_) => match resolved_org {
                // Configured organizations cannot re-enter setup.
                Some(org) if org.is_configured => Decision::Redirect("/dashboard".to_string()),
                Some(org) => {
                    let organization = TenantContext::from_row(&org);
                    Decision::Allow(RequestContext {
                        principal: Some(principal),
                        organization,
                    })
                }
                // Dangling organization reference: let the wizard restart.
                None => Decision::Allow(RequestContext {
                    principal: Some(principal),
                    organization: None,
                }),
            },
        }
    }

    async fn load_impersonated(
        &self,
        raw: &str,
    ) -> Result<Option<db::organizations::Organization>, sqlx::Error> {
        let Ok(id) = OrganizationId::from_string(raw) else {
            return Ok(None);
        };
        let key = id.as_str();
        if let Some(org) = self.caches.organizations.get(&key) {
            return Ok(Some(org));
        }
        let org = db::organizations::find_by_id(self.pool, &id).await?;
        if let Some(org) = &org {
            self.caches.organizations.insert(key, org.clone());
        }
        Ok(org)
    }
}
