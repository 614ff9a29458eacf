//! DNS-over-HTTPS resolver client (JSON API).

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use soawatch_core::{ResolverObservation, Result, SoaObserver, SoaRecord, WatchError};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::config::ResolverEndpoint;
use crate::http::{check_status, map_send_error};

/// DNS record type code for SOA
pub const TYPE_SOA: u16 = 6;

/// DNS record type code for NS
pub const TYPE_NS: u16 = 2;

const DNS_JSON: &str = "application/dns-json";

/// JSON body returned by DoH resolvers
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DohResponse {
    /// DNS RCODE; 0 is NOERROR
    #[serde(default)]
    pub status: u32,

    /// Answer section
    #[serde(default)]
    pub answer: Vec<DohRecord>,

    /// Authority section
    #[serde(default)]
    pub authority: Vec<DohRecord>,
}

/// A resource record in a DoH JSON answer
#[derive(Debug, Clone, Deserialize)]
pub struct DohRecord {
    /// Owner name
    #[serde(default)]
    pub name: String,

    /// Numeric record type
    #[serde(rename = "type")]
    pub record_type: u16,

    /// Time to live
    #[serde(rename = "TTL", default)]
    pub ttl: u32,

    /// Presentation-form RDATA
    pub data: String,
}

impl DohResponse {
    /// First SOA in the answer section, falling back to the authority section
    #[must_use]
    pub fn soa_data(&self) -> Option<&str> {
        self.answer
            .iter()
            .chain(&self.authority)
            .find(|r| r.record_type == TYPE_SOA)
            .map(|r| r.data.as_str())
    }

    /// All NS targets in the answer section
    #[must_use]
    pub fn ns_data(&self) -> Vec<String> {
        self.answer
            .iter()
            .filter(|r| r.record_type == TYPE_NS)
            .map(|r| r.data.trim().to_string())
            .collect()
    }
}

/// Queries a fixed set of DoH resolvers
#[derive(Clone)]
pub struct DohClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    resolvers: Vec<ResolverEndpoint>,
}

impl DohClient {
    /// Create a client for the given resolvers with default settings
    pub fn new(resolvers: Vec<ResolverEndpoint>) -> Result<Self> {
        DohClientBuilder::new(resolvers).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(resolvers: Vec<ResolverEndpoint>) -> DohClientBuilder {
        DohClientBuilder::new(resolvers)
    }

    /// Configured resolvers, in priority order
    #[must_use]
    pub fn resolvers(&self) -> &[ResolverEndpoint] {
        &self.inner.resolvers
    }

    /// Perform one DoH JSON query against one resolver
    pub async fn query(
        &self,
        endpoint: &ResolverEndpoint,
        name: &str,
        record_type: &str,
    ) -> Result<DohResponse> {
        let mut url = Url::parse(&endpoint.url)
            .map_err(|e| WatchError::InvalidUrl(format!("{}: {e}", endpoint.url)))?;
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", record_type);

        debug!(resolver = %endpoint.name, url = %url, "DoH query");

        let response = self
            .inner
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, DNS_JSON)
            .timeout(endpoint.timeout_duration())
            .send()
            .await
            .map_err(|e| map_send_error(&e, endpoint.timeout_ms))?;

        let response = check_status(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| map_send_error(&e, endpoint.timeout_ms))?;
        let parsed: DohResponse = serde_json::from_str(&body)?;

        if parsed.status != 0 {
            return Err(WatchError::DnsStatus(parsed.status));
        }
        Ok(parsed)
    }

    /// Fetch and parse the zone's SOA from one resolver
    pub async fn soa(&self, endpoint: &ResolverEndpoint, zone: &str) -> Result<SoaRecord> {
        let response = self.query(endpoint, zone, "SOA").await?;
        response
            .soa_data()
            .ok_or_else(|| WatchError::NoSoa(zone.to_string()))?
            .parse()
    }

    /// Query one resolver and fold the outcome into an observation
    pub async fn observe_one(&self, endpoint: &ResolverEndpoint, zone: &str) -> ResolverObservation {
        match self.soa(endpoint, zone).await {
            Ok(soa) => {
                debug!(resolver = %endpoint.name, zone, serial = soa.serial, "SOA observed");
                ResolverObservation::success(&endpoint.name, soa)
            }
            Err(e) => {
                warn!(resolver = %endpoint.name, zone, error = %e, "resolver failed");
                ResolverObservation::failure(&endpoint.name, e)
            }
        }
    }
}

#[async_trait]
impl SoaObserver for DohClient {
    fn priority(&self) -> Vec<String> {
        self.inner.resolvers.iter().map(|r| r.name.clone()).collect()
    }

    async fn observe(&self, zone: &str) -> Vec<ResolverObservation> {
        let queries = self
            .inner
            .resolvers
            .iter()
            .map(|endpoint| self.observe_one(endpoint, zone));
        join_all(queries).await
    }

    async fn nameservers(&self, zone: &str) -> Vec<String> {
        for endpoint in &self.inner.resolvers {
            match self.query(endpoint, zone, "NS").await {
                Ok(response) => {
                    let ns = response.ns_data();
                    if !ns.is_empty() {
                        return ns;
                    }
                }
                Err(e) => {
                    debug!(resolver = %endpoint.name, zone, error = %e, "NS lookup failed");
                }
            }
        }
        Vec::new()
    }
}

/// Builder for configuring a [`DohClient`]
pub struct DohClientBuilder {
    resolvers: Vec<ResolverEndpoint>,
    user_agent: String,
}

impl DohClientBuilder {
    /// Create a new builder for the given resolvers
    #[must_use]
    pub fn new(resolvers: Vec<ResolverEndpoint>) -> Self {
        Self {
            resolvers,
            user_agent: format!("soawatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<DohClient> {
        if self.resolvers.is_empty() {
            return Err(WatchError::Config("no resolver endpoints configured".into()));
        }

        let http = HttpClient::builder()
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| WatchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(DohClient {
            inner: Arc::new(ClientInner {
                http,
                resolvers: self.resolvers,
            }),
        })
    }
}
