use crate::limits::LimitedRoutes;

const DEFAULT_BASE_DOMAINS: &str = "localhost:3000,localhost";
const DEFAULT_LANDLORD_PREFIXES: &str = "app,www,admin,api";

/// Hostname and plan-limit settings shared by every request
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Platform apex domains; tenant subdomains hang off these.
    pub base_domains: Vec<String>,
    /// Reserved labels (stored with a trailing dot) that mark platform hosts.
    pub landlord_prefixes: Vec<String>,
    pub limited_routes: LimitedRoutes,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            base_domains: parse_base_domains(DEFAULT_BASE_DOMAINS),
            landlord_prefixes: parse_prefixes(DEFAULT_LANDLORD_PREFIXES),
            limited_routes: LimitedRoutes::default(),
        }
    }
}

impl TenancyConfig {
    pub fn from_env() -> Self {
        let base_domains = std::env::var("BASE_DOMAINS")
            .ok()
            .map(|v| parse_base_domains(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| parse_base_domains(DEFAULT_BASE_DOMAINS));

        let landlord_prefixes = std::env::var("LANDLORD_PREFIXES")
            .map(|v| parse_prefixes(&v))
            .unwrap_or_else(|_| parse_prefixes(DEFAULT_LANDLORD_PREFIXES));

        let limited_routes = match std::env::var("PLAN_LIMITED_ROUTES") {
            Ok(raw) => LimitedRoutes::parse(&raw).unwrap_or_else(|e| {
                tracing::warn!("Ignoring PLAN_LIMITED_ROUTES: {}", e);
                LimitedRoutes::default()
            }),
            Err(_) => LimitedRoutes::default(),
        };

        Self {
            base_domains,
            landlord_prefixes,
            limited_routes,
        }
    }

    pub fn with_base_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.base_domains = domains
            .into_iter()
            .map(|d| saas_models::normalize_hostname(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();
        self
    }
}

fn parse_base_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(saas_models::normalize_hostname)
        .filter(|d| !d.is_empty())
        .collect()
}

fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}.", p))
        .collect()
}
