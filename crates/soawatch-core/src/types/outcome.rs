use serde::{Deserialize, Serialize};

use super::{ConsensusResult, DeliveryOutcome, Zone};

/// How a zone's round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    /// First serial recorded
    Baseline,
    /// Serial equals the last known serial
    Unchanged,
    /// Change confirmed by a second round and announced
    ConfirmedChange,
    /// Change not confirmed; serial advanced, nothing announced
    UnconfirmedChange,
    /// Change confirmed but already announced inside the dedup window
    DuplicateSuppressed,
    /// No serial reached the majority threshold
    NoQuorum,
    /// The round could not complete
    Error,
}

/// Per-zone entry of a tick summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneOutcome {
    /// Zone ID
    pub zone_id: String,

    /// Zone name
    pub zone: String,

    /// Round outcome
    pub status: ZoneStatus,

    /// Serial the round settled on
    pub serial: Option<u32>,

    /// Whether a change was recorded
    pub is_change: bool,

    /// Votes for the leading serial (first round)
    pub votes: usize,

    /// Successful observations (first round)
    pub total: usize,

    /// Nameservers seen during the round
    #[serde(default)]
    pub nameservers: Vec<String>,

    /// Resolvers that voted for the leading serial
    #[serde(default)]
    pub sources: Vec<String>,

    /// Human-readable annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Error text for `ZoneStatus::Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Delivery attempts made for this zone
    #[serde(default)]
    pub notifications: Vec<DeliveryOutcome>,

    /// Soft failures absorbed by the write policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ZoneOutcome {
    /// Start an outcome from the first-round consensus
    #[must_use]
    pub fn from_round(zone: &Zone, status: ZoneStatus, consensus: &ConsensusResult) -> Self {
        Self {
            zone_id: zone.id.clone(),
            zone: zone.name.clone(),
            status,
            serial: consensus.accepted(),
            is_change: false,
            votes: consensus.votes,
            total: consensus.total,
            nameservers: Vec::new(),
            sources: consensus.sources.clone(),
            note: None,
            error: None,
            notifications: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// An outcome for a zone whose round failed outright
    #[must_use]
    pub fn failed(zone: &Zone, error: impl ToString) -> Self {
        Self {
            zone_id: zone.id.clone(),
            zone: zone.name.clone(),
            status: ZoneStatus::Error,
            serial: None,
            is_change: false,
            votes: 0,
            total: 0,
            nameservers: Vec::new(),
            sources: Vec::new(),
            note: None,
            error: Some(error.to_string()),
            notifications: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// What one tick returns to its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSummary {
    /// Human-readable summary line
    pub message: String,

    /// One entry per processed zone, in selection order
    pub results: Vec<ZoneOutcome>,

    /// Number of zones processed
    pub zones_checked: usize,
}

impl TickSummary {
    /// Build a summary from the tick's accumulated results
    #[must_use]
    pub fn new(results: Vec<ZoneOutcome>) -> Self {
        let zones_checked = results.len();
        let changes = results.iter().filter(|r| r.is_change).count();
        let errors = results
            .iter()
            .filter(|r| r.status == ZoneStatus::Error)
            .count();
        let message = if zones_checked == 0 {
            "No zones due for checking".to_string()
        } else {
            format!("Checked {zones_checked} zone(s): {changes} change(s), {errors} error(s)")
        };

        Self {
            message,
            results,
            zones_checked,
        }
    }
}
