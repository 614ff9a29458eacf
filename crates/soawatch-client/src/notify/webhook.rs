//! Generic JSON webhook envelope.

use serde_json::{json, Value};
use soawatch_core::ChangeEvent;

/// `{event, zone, old_serial, new_serial, soa, occurred_at, login_url}`
#[must_use]
pub fn payload(event: &ChangeEvent) -> Value {
    json!({
        "event": event.kind.event_name(),
        "zone": event.zone,
        "old_serial": event.old_serial,
        "new_serial": event.new_serial,
        "soa": event.soa,
        "occurred_at": event.occurred_at.to_rfc3339(),
        "login_url": event.login_url,
    })
}
