use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::SoaRecord;

/// Notification channel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Email through the external send-email capability
    Email,
    /// Slack incoming webhook
    Slack,
    /// Microsoft Teams connector (MessageCard)
    Teams,
    /// Generic JSON webhook
    Webhook,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Slack => write!(f, "slack"),
            Self::Teams => write!(f, "teams"),
            Self::Webhook => write!(f, "webhook"),
        }
    }
}

/// An enabled notification target of a zone owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChannelTarget {
    /// Send an email to `to`
    Email {
        /// Recipient address
        to: String,
    },
    /// Post to a Slack incoming webhook
    Slack {
        /// Webhook URL
        webhook_url: String,
    },
    /// Post a MessageCard to a Teams connector
    Teams {
        /// Webhook URL
        webhook_url: String,
    },
    /// Post the JSON envelope to an arbitrary URL
    Webhook {
        /// Endpoint URL
        url: String,
    },
}

impl ChannelTarget {
    /// Channel family of this target
    #[must_use]
    pub const fn kind(&self) -> ChannelKind {
        match self {
            Self::Email { .. } => ChannelKind::Email,
            Self::Slack { .. } => ChannelKind::Slack,
            Self::Teams { .. } => ChannelKind::Teams,
            Self::Webhook { .. } => ChannelKind::Webhook,
        }
    }
}

/// Why an event is being announced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// First serial ever recorded for the zone
    Baseline,
    /// Confirmed change from a previously known serial
    SerialChanged,
}

impl ChangeKind {
    /// Event name used in webhook envelopes
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Baseline => "zone.baseline_established",
            Self::SerialChanged => "zone.serial_changed",
        }
    }
}

/// A verified zone change ready for fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Zone ID
    pub zone_id: String,

    /// Zone name
    pub zone: String,

    /// Baseline or change
    pub kind: ChangeKind,

    /// Serial before the change
    pub old_serial: Option<u32>,

    /// Serial after the change
    pub new_serial: u32,

    /// Full SOA observed for the new serial
    pub soa: SoaRecord,

    /// Nameservers seen during the round
    #[serde(default)]
    pub nameservers: Vec<String>,

    /// When the change was confirmed
    pub occurred_at: DateTime<Utc>,

    /// Where the user can review the zone
    pub login_url: String,
}

impl ChangeEvent {
    /// One-line human summary used by chat channels and email subjects
    #[must_use]
    pub fn headline(&self) -> String {
        match (self.kind, self.old_serial) {
            (ChangeKind::SerialChanged, Some(old)) => format!(
                "SOA serial for {} changed from {old} to {}",
                self.zone, self.new_serial
            ),
            _ => format!(
                "Monitoring started for {}: current SOA serial is {}",
                self.zone, self.new_serial
            ),
        }
    }
}

/// Result of one delivery attempt on one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    /// Zone ID
    pub zone_id: String,

    /// Serial announced
    pub serial: u32,

    /// Channel used
    pub channel: ChannelKind,

    /// Whether the channel accepted the message
    pub delivered: bool,

    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the attempt finished
    pub at: DateTime<Utc>,
}
