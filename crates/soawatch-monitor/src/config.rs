//! Monitor configuration, read from a TOML file.

use serde::{Deserialize, Serialize};
use soawatch_client::{default_resolvers, EmailGateway, ResolverEndpoint};
use soawatch_core::{QuorumRule, Result, WatchError};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::policy::WritePolicy;

/// Environment variable overriding `notify.email_token`
pub const EMAIL_TOKEN_ENV: &str = "SOAWATCH_EMAIL_TOKEN";

/// Complete configuration for one monitor process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// DoH resolvers, in tie-break priority order.
    #[serde(default = "default_resolvers")]
    pub resolvers: Vec<ResolverEndpoint>,

    /// Detection engine tuning.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Store write retries and failure action.
    #[serde(default)]
    pub persistence: WritePolicy,

    /// Notification channels.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Where zones and history live.
    #[serde(default)]
    pub store: StoreConfig,

    /// Trigger endpoint.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level and format.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Detection engine tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Delay before the confirmation round (default: 200 ms).
    #[serde(default = "default_confirm_delay_ms")]
    pub confirm_delay_ms: u64,

    /// Window in which a serial is announced at most once (default: 15 min).
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,

    /// Upper bound of the scheduling jitter (default: 250 ms).
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,

    /// Announce the first serial recorded for a zone.
    #[serde(default = "default_true")]
    pub notify_on_baseline: bool,

    /// Look up NS records during each round.
    #[serde(default = "default_true")]
    pub fetch_nameservers: bool,

    /// Zones processed at the same time within a tick.
    #[serde(default = "default_zone_concurrency")]
    pub zone_concurrency: usize,

    /// Majority threshold used for consensus.
    #[serde(default)]
    pub quorum: QuorumRule,
}

/// Notification channel settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Link included in every message.
    #[serde(default)]
    pub login_url: String,

    /// Send-email endpoint; email targets fail without it.
    #[serde(default)]
    pub email_endpoint: Option<String>,

    /// Bearer token for the send-email endpoint.
    #[serde(default)]
    pub email_token: Option<String>,

    /// Per-delivery timeout (default: 10 s).
    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,

    /// Accent colour of Teams cards.
    #[serde(default)]
    pub teams_theme_color: Option<String>,
}

/// Store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON document holding zones, channels and history.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Trigger endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: 127.0.0.1:8787).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive when `RUST_LOG` is unset (default: info).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolvers: default_resolvers(),
            monitor: MonitorConfig::default(),
            persistence: WritePolicy::default(),
            notify: NotifyConfig::default(),
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            confirm_delay_ms: default_confirm_delay_ms(),
            dedup_window_secs: default_dedup_window_secs(),
            max_jitter_ms: default_max_jitter_ms(),
            notify_on_baseline: true,
            fetch_nameservers: true,
            zone_concurrency: default_zone_concurrency(),
            quorum: QuorumRule::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when absent.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| WatchError::Config(format!("{}: {e}", path.display())))?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };
        if let Ok(token) = std::env::var(EMAIL_TOKEN_ENV) {
            if !token.is_empty() {
                config.notify.email_token = Some(token);
            }
        }
        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WatchError::Config(e.to_string()))
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.resolvers.is_empty() {
            return Err(WatchError::Config("at least one resolver is required".into()));
        }
        for resolver in &self.resolvers {
            let url = url::Url::parse(&resolver.url).map_err(|e| {
                WatchError::InvalidUrl(format!("resolver {}: {}: {e}", resolver.name, resolver.url))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(WatchError::InvalidUrl(format!(
                    "resolver {}: unsupported scheme {}",
                    resolver.name,
                    url.scheme()
                )));
            }
        }
        if let Some(endpoint) = &self.notify.email_endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| WatchError::InvalidUrl(format!("email endpoint {endpoint}: {e}")))?;
        }
        if self.store.path.is_none() {
            return Err(WatchError::Config("store.path is not set".into()));
        }
        if self.monitor.zone_concurrency == 0 {
            return Err(WatchError::Config("monitor.zone_concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// Email gateway, when an endpoint is configured.
    #[must_use]
    pub fn email_gateway(&self) -> Option<EmailGateway> {
        self.notify.email_endpoint.as_ref().map(|endpoint| EmailGateway {
            endpoint: endpoint.clone(),
            token: self.notify.email_token.clone(),
        })
    }
}

impl MonitorConfig {
    /// Delay before the confirmation round
    #[must_use]
    pub const fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }

    /// Dedup window
    #[must_use]
    pub const fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }

    /// Upper bound of the scheduling jitter
    #[must_use]
    pub const fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }
}

impl NotifyConfig {
    /// Per-delivery timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Default value functions for serde.
const fn default_confirm_delay_ms() -> u64 {
    200
}

const fn default_dedup_window_secs() -> u64 {
    15 * 60
}

const fn default_max_jitter_ms() -> u64 {
    250
}

const fn default_zone_concurrency() -> usize {
    1
}

const fn default_notify_timeout_ms() -> u64 {
    10_000
}

const fn default_true() -> bool {
    true
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

fn default_log_level() -> String {
    String::from("info")
}
