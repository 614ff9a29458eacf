//! Slack incoming-webhook payload.

use serde_json::{json, Value};
use soawatch_core::ChangeEvent;

/// `{"text": ...}` body for a Slack incoming webhook
#[must_use]
pub fn payload(event: &ChangeEvent) -> Value {
    let mut text = format!(
        ":rotating_light: *{}*\nPrimary NS: `{}`  Admin: `{}`\nDetected at {}",
        event.headline(),
        event.soa.primary_ns,
        event.soa.admin,
        event.occurred_at.to_rfc3339()
    );
    if !event.login_url.is_empty() {
        text.push_str(&format!("\n<{}|Open dashboard>", event.login_url));
    }
    json!({ "text": text })
}
