//! Microsoft Teams MessageCard payload.

use serde_json::{json, Value};
use soawatch_core::ChangeEvent;

/// Default accent colour of the card
pub const DEFAULT_THEME_COLOR: &str = "0076D7";

/// MessageCard body with a deep link back to the dashboard
#[must_use]
pub fn payload(event: &ChangeEvent, theme_color: &str) -> Value {
    let old = event
        .old_serial
        .map_or_else(|| "none".to_string(), |s| s.to_string());
    let text = format!(
        "**Zone:** {}<br>**Old serial:** {old}<br>**New serial:** {}<br>**Primary NS:** {}<br>**Detected:** {}",
        event.zone,
        event.new_serial,
        event.soa.primary_ns,
        event.occurred_at.to_rfc3339()
    );

    json!({
        "@type": "MessageCard",
        "@context": "https://schema.org/extensions",
        "summary": event.headline(),
        "themeColor": theme_color,
        "title": format!("DNS zone change: {}", event.zone),
        "text": text,
        "potentialAction": [{
            "@type": "OpenUri",
            "name": "View in dashboard",
            "targets": [{ "os": "default", "uri": event.login_url }]
        }]
    })
}
