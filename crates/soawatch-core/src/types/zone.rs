use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored DNS zone as held by the zone store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Unique zone ID
    pub id: String,

    /// Zone apex, e.g. `example.com`
    pub name: String,

    /// Owning user; selects the notification channels
    pub owner_id: String,

    /// Polling interval in seconds. Stored as-is; clamped when scheduling.
    pub cadence_seconds: i64,

    /// When the zone was last picked up by a tick
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,

    /// Serial accepted by the last completed round
    #[serde(default)]
    pub last_known_serial: Option<u32>,

    /// When the zone is next due
    #[serde(default)]
    pub next_check_at: Option<DateTime<Utc>>,

    /// Inactive zones are never selected
    #[serde(default = "default_true")]
    pub active: bool,
}

const fn default_true() -> bool {
    true
}

impl Zone {
    /// Create an active, never-checked zone
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        cadence_seconds: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            cadence_seconds,
            last_checked: None,
            last_known_serial: None,
            next_check_at: None,
            active: true,
        }
    }

    /// Returns true if the zone should be checked at `now`
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active && self.next_check_at.map_or(true, |at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn never_scheduled_zone_is_due() {
        let zone = Zone::new("z1", "example.com", "u1", 30);
        assert!(zone.is_due(Utc::now()));
    }

    #[test]
    fn due_boundary_is_inclusive() {
        let now = Utc::now();
        let mut zone = Zone::new("z1", "example.com", "u1", 30);
        zone.next_check_at = Some(now);
        assert!(zone.is_due(now));
        zone.next_check_at = Some(now + Duration::milliseconds(1));
        assert!(!zone.is_due(now));
    }

    #[test]
    fn inactive_zone_is_never_due() {
        let mut zone = Zone::new("z1", "example.com", "u1", 30);
        zone.active = false;
        assert!(!zone.is_due(Utc::now()));
    }
}
