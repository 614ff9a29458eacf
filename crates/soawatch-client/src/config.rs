//! Resolver endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-resolver timeout
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(2);

/// One DNS-over-HTTPS endpoint speaking the JSON API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverEndpoint {
    /// Name used in observations and logs
    pub name: String,

    /// Query URL, e.g. `https://cloudflare-dns.com/dns-query`
    pub url: String,

    /// Timeout for a single query
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    2000
}

impl ResolverEndpoint {
    /// Create an endpoint with the default timeout
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Set the query timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Query timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Three independent public resolvers, in tie-break priority order
#[must_use]
pub fn default_resolvers() -> Vec<ResolverEndpoint> {
    vec![
        ResolverEndpoint::new("cloudflare", "https://cloudflare-dns.com/dns-query"),
        ResolverEndpoint::new("google", "https://dns.google/resolve"),
        ResolverEndpoint::new("quad9", "https://dns.quad9.net:5053/dns-query"),
    ]
}
