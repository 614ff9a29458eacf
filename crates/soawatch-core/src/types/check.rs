use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SoaRecord;

/// One entry of the append-only check history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCheckRecord {
    /// Zone the check belongs to
    pub zone_id: String,

    /// When the round completed
    pub checked_at: DateTime<Utc>,

    /// Serial the round settled on; `None` for no-quorum rounds
    pub serial: Option<u32>,

    /// SOA in presentation form
    #[serde(default)]
    pub raw_soa: Option<String>,

    /// Parsed SOA
    #[serde(default)]
    pub soa: Option<SoaRecord>,

    /// Whether the round recorded a change (baseline included)
    pub is_change: bool,

    /// Free-text annotation
    #[serde(default)]
    pub details: String,

    /// SOA from the preceding record, on changes
    #[serde(default)]
    pub previous_soa: Option<SoaRecord>,
}

impl ZoneCheckRecord {
    /// Start a record for `zone_id` with no serial
    #[must_use]
    pub fn new(zone_id: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        Self {
            zone_id: zone_id.into(),
            checked_at,
            serial: None,
            raw_soa: None,
            soa: None,
            is_change: false,
            details: String::new(),
            previous_soa: None,
        }
    }

    /// Attach the observed SOA and its serial
    #[must_use]
    pub fn with_soa(mut self, soa: Option<SoaRecord>, serial: Option<u32>) -> Self {
        self.raw_soa = soa.as_ref().map(ToString::to_string);
        self.soa = soa;
        self.serial = serial;
        self
    }

    /// Mark the record as a change
    #[must_use]
    pub fn change(mut self, previous_soa: Option<SoaRecord>) -> Self {
        self.is_change = true;
        self.previous_soa = previous_soa;
        self
    }

    /// Set the change details
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}
