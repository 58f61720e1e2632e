/// Centralized environment configuration.
/// All env vars and defaults are defined here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL. Required.
    pub database_url: String,

    /// Public base URL of the platform's main domain, including scheme and
    /// any port. Tenant URLs are derived from it.
    /// Default: http://localhost:3000
    pub app_url: String,

    /// Bare base domain used to extract tenant subdomains from the Host
    /// header. Defaults to the host part of `app_url`.
    pub base_domain: String,

    /// TTL in seconds for the gate's read-through caches (organization,
    /// subscription, profile rows). 0 disables caching.
    /// Default: 5
    pub auth_cache_ttl_secs: u64,
}

impl Config {
    /// Build config from environment variables.
    /// Returns an error if required vars are missing.
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set in .env")?;

        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let base_domain = match std::env::var("BASE_DOMAIN") {
            Ok(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
            _ => host_of(&app_url),
        };

        let auth_cache_ttl_secs = std::env::var("AUTH_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u64>()
            .map_err(|_| "AUTH_CACHE_TTL_SECS must be a number of seconds")?;

        Ok(Self {
            database_url,
            app_url,
            base_domain,
            auth_cache_ttl_secs,
        })
    }

    /// Returns the base URL without trailing slash, for building links.
    pub fn app_url_base(&self) -> &str {
        self.app_url.trim_end_matches('/')
    }

    /// Absolute URL for a path on the platform's main domain.
    pub fn main_url(&self, path: &str) -> String {
        format!("{}{}", self.app_url_base(), path)
    }

    /// Absolute URL for a path on a tenant's subdomain.
    pub fn tenant_url(&self, subdomain: &str, path: &str) -> String {
        match self.app_url_base().split_once("://") {
            Some((scheme, rest)) => format!("{}://{}.{}{}", scheme, subdomain, rest, path),
            None => format!("{}.{}{}", subdomain, self.app_url_base(), path),
        }
    }

    /// Config for tests. In-memory database, deterministic domain, and the
    /// gate caches disabled so fixtures written mid-test are always visible.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            app_url: "https://platform.test".to_string(),
            base_domain: "platform.test".to_string(),
            auth_cache_ttl_secs: 0,
        }
    }
}

/// Extract the bare host from a URL-ish string: scheme, port, and path are
/// stripped.
fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let host = rest.split('/').next().unwrap_or(rest);
    host.split(':').next().unwrap_or(host).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_url_inserts_subdomain() {
        let config = Config::for_tests();
        assert_eq!(
            config.tenant_url("acme", "/units"),
            "https://acme.platform.test/units"
        );
    }

    #[test]
    fn tenant_url_keeps_port() {
        let mut config = Config::for_tests();
        config.app_url = "http://localhost:3000".to_string();
        assert_eq!(
            config.tenant_url("acme", "/"),
            "http://acme.localhost:3000/"
        );
    }

    #[test]
    fn host_of_strips_scheme_port_and_path() {
        assert_eq!(host_of("https://Platform.Test:8443/x"), "platform.test");
        assert_eq!(host_of("localhost:3000"), "localhost");
    }
}
