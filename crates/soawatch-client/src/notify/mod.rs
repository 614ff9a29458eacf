//! Notification channels: Slack, Microsoft Teams, generic webhook and email.
//!
//! Every delivery is a single POST. Nothing here retries; the caller decides
//! what a failure means.

pub mod email;
pub mod slack;
pub mod teams;
pub mod webhook;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use soawatch_core::{ChangeEvent, ChannelTarget, Notifier, Result, WatchError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::http::{check_status, map_send_error};
pub use email::EmailGateway;

/// Default delivery timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP notifier covering every [`ChannelTarget`] kind
#[derive(Clone)]
pub struct NotifyClient {
    inner: Arc<NotifyInner>,
}

struct NotifyInner {
    http: HttpClient,
    timeout: Duration,
    email: Option<EmailGateway>,
    theme_color: String,
}

impl NotifyClient {
    /// Create a notifier with default settings and no email gateway
    pub fn new() -> Result<Self> {
        NotifyClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> NotifyClientBuilder {
        NotifyClientBuilder::new()
    }

    async fn post_json(&self, url: &str, body: &Value, bearer: Option<&str>) -> Result<()> {
        debug!(url, "POST notification");

        let mut request = self.inner.http.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let timeout_ms = u64::try_from(self.inner.timeout.as_millis()).unwrap_or(u64::MAX);
        let response = request
            .send()
            .await
            .map_err(|e| map_send_error(&e, timeout_ms))?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for NotifyClient {
    async fn deliver(&self, target: &ChannelTarget, event: &ChangeEvent) -> Result<()> {
        match target {
            ChannelTarget::Slack { webhook_url } => {
                self.post_json(webhook_url, &slack::payload(event), None).await
            }
            ChannelTarget::Teams { webhook_url } => {
                let body = teams::payload(event, &self.inner.theme_color);
                self.post_json(webhook_url, &body, None).await
            }
            ChannelTarget::Webhook { url } => {
                self.post_json(url, &webhook::payload(event), None).await
            }
            ChannelTarget::Email { to } => {
                let gateway = self.inner.email.as_ref().ok_or_else(|| {
                    WatchError::ChannelNotConfigured {
                        channel: "email".into(),
                        reason: "no email endpoint configured".into(),
                    }
                })?;
                self.post_json(
                    &gateway.endpoint,
                    &email::payload(event, to),
                    gateway.token.as_deref(),
                )
                .await
            }
        }
    }
}

/// Builder for configuring a [`NotifyClient`]
pub struct NotifyClientBuilder {
    timeout: Duration,
    email: Option<EmailGateway>,
    theme_color: String,
    user_agent: String,
}

impl Default for NotifyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            email: None,
            theme_color: teams::DEFAULT_THEME_COLOR.to_string(),
            user_agent: format!("soawatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the per-delivery timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable email delivery through the given gateway
    #[must_use]
    pub fn email_gateway(mut self, gateway: EmailGateway) -> Self {
        self.email = Some(gateway);
        self
    }

    /// Set the Teams card accent colour
    #[must_use]
    pub fn theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = color.into();
        self
    }

    /// Build the notifier
    pub fn build(self) -> Result<NotifyClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| WatchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(NotifyClient {
            inner: Arc::new(NotifyInner {
                http,
                timeout: self.timeout,
                email: self.email,
                theme_color: self.theme_color,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use soawatch_core::ChangeKind;

    fn event() -> ChangeEvent {
        ChangeEvent {
            zone_id: "z1".into(),
            zone: "example.com".into(),
            kind: ChangeKind::SerialChanged,
            old_serial: Some(5),
            new_serial: 6,
            soa: "ns1.example.com. hostmaster.example.com. 6 7200 3600 1209600 300"
                .parse()
                .unwrap(),
            nameservers: vec!["ns1.example.com.".into()],
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            login_url: "https://app.soawatch.test/login".into(),
        }
    }

    #[test]
    fn slack_payload_has_text() {
        let body = slack::payload(&event());
        let text = body["text"].as_str().unwrap();
        assert!(text.contains("changed from 5 to 6"));
        assert!(text.contains("https://app.soawatch.test/login"));
    }

    #[test]
    fn teams_payload_is_message_card() {
        let body = teams::payload(&event(), "FF0000");
        assert_eq!(body["@type"], "MessageCard");
        assert_eq!(body["@context"], "https://schema.org/extensions");
        assert_eq!(body["themeColor"], "FF0000");
        assert_eq!(body["title"], "DNS zone change: example.com");
        assert!(body["summary"].as_str().unwrap().contains("example.com"));
        let action = &body["potentialAction"][0];
        assert_eq!(action["@type"], "OpenUri");
        assert_eq!(action["targets"][0]["uri"], "https://app.soawatch.test/login");
    }

    #[test]
    fn webhook_envelope_fields() {
        let body = webhook::payload(&event());
        assert_eq!(body["event"], "zone.serial_changed");
        assert_eq!(body["zone"], "example.com");
        assert_eq!(body["old_serial"], 5);
        assert_eq!(body["new_serial"], 6);
        assert_eq!(body["soa"]["serial"], 6);
        assert_eq!(body["soa"]["primary_ns"], "ns1.example.com.");
        assert_eq!(body["occurred_at"], "2026-03-01T12:00:00+00:00");
        assert_eq!(body["login_url"], "https://app.soawatch.test/login");
    }

    #[test]
    fn baseline_webhook_has_null_old_serial() {
        let mut event = event();
        event.kind = ChangeKind::Baseline;
        event.old_serial = None;
        let body = webhook::payload(&event);
        assert_eq!(body["event"], "zone.baseline_established");
        assert!(body["old_serial"].is_null());
    }

    #[test]
    fn email_payload_carries_recipient() {
        let body = email::payload(&event(), "ops@example.com");
        assert_eq!(body["to"], "ops@example.com");
        assert!(body["subject"].as_str().unwrap().starts_with("[soawatch]"));
    }

    #[tokio::test]
    async fn email_without_gateway_fails_only_that_channel() {
        let client = NotifyClient::new().unwrap();
        let err = client
            .deliver(&ChannelTarget::Email { to: "ops@example.com".into() }, &event())
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::ChannelNotConfigured { .. }));
    }
}
