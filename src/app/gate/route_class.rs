/// Closed classification of request paths. Every path maps to exactly one
/// class; anything unlisted is a protected business route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session: home, pricing, sign-in/up, invite
    /// acceptance, webhooks, static assets.
    Public,
    /// The onboarding wizard.
    Setup,
    /// The platform admin area (super-admins only).
    Admin,
    /// Subscription management; always reachable once configured so an
    /// inactive subscription cannot cause a redirect loop.
    Billing,
    /// The "subscription inactive" notice page; same reachability rule.
    SubscriptionInactive,
    /// Everything else: dashboard, business pages, APIs.
    Protected,
}

impl RouteClass {
    /// Routes that operate a single organization's data and therefore carry
    /// tenant context. Super-admins reach these only through impersonation.
    pub fn is_organization_scoped(&self) -> bool {
        matches!(
            self,
            RouteClass::Protected | RouteClass::Billing | RouteClass::SubscriptionInactive
        )
    }
}

/// Classify a request path.
pub fn classify(path: &str) -> RouteClass {
    match path {
        "/" | "/pricing" | "/login" | "/signup" | "/logout" | "/accept-invite"
        | "/favicon.ico" => RouteClass::Public,
        "/subscription-inactive" => RouteClass::SubscriptionInactive,
        _ => {
            if path.starts_with("/webhooks/") || path.starts_with("/static/") {
                RouteClass::Public
            } else if path == "/setup" || path.starts_with("/setup/") {
                RouteClass::Setup
            } else if path == "/admin" || path.starts_with("/admin/") {
                RouteClass::Admin
            } else if path == "/settings/subscription" || path.starts_with("/settings/subscription/")
            {
                RouteClass::Billing
            } else {
                RouteClass::Protected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        for path in ["/", "/pricing", "/login", "/signup", "/accept-invite", "/webhooks/billing"] {
            assert_eq!(classify(path), RouteClass::Public, "{path}");
        }
    }

    #[test]
    fn setup_paths() {
        assert_eq!(classify("/setup"), RouteClass::Setup);
        assert_eq!(classify("/setup/complete"), RouteClass::Setup);
    }

    #[test]
    fn admin_paths() {
        assert_eq!(classify("/admin"), RouteClass::Admin);
        assert_eq!(classify("/admin/organizations"), RouteClass::Admin);
        // Not a prefix match on the bare string.
        assert_eq!(classify("/administrate"), RouteClass::Protected);
    }

    #[test]
    fn billing_paths_are_distinct_from_other_settings() {
        assert_eq!(classify("/settings/subscription"), RouteClass::Billing);
        assert_eq!(classify("/settings/profile"), RouteClass::Protected);
    }

    #[test]
    fn business_routes_are_protected() {
        for path in ["/dashboard", "/properties", "/units", "/tenants", "/leases", "/payments", "/api/me/permissions"] {
            assert_eq!(classify(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn org_scoped_classes() {
        assert!(RouteClass::Protected.is_organization_scoped());
        assert!(RouteClass::Billing.is_organization_scoped());
        assert!(!RouteClass::Setup.is_organization_scoped());
        assert!(!RouteClass::Admin.is_organization_scoped());
        assert!(!RouteClass::Public.is_organization_scoped());
    }
}
