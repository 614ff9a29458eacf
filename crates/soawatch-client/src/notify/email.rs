//! Request body for the external send-email capability.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use soawatch_core::ChangeEvent;

/// Where and how to reach the send-email capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailGateway {
    /// Endpoint accepting the JSON body
    pub endpoint: String,

    /// Bearer token, if the endpoint requires one
    #[serde(default)]
    pub token: Option<String>,
}

/// Structured change fields; the gateway renders the message
#[must_use]
pub fn payload(event: &ChangeEvent, to: &str) -> Value {
    json!({
        "to": to,
        "subject": format!("[soawatch] {}", event.headline()),
        "zone": event.zone,
        "old_serial": event.old_serial,
        "new_serial": event.new_serial,
        "soa": event.soa,
        "nameservers": event.nameservers,
        "occurred_at": event.occurred_at.to_rfc3339(),
        "login_url": event.login_url,
    })
}
