//! Change classification and confirmation verdicts.

use serde::{Deserialize, Serialize};

use crate::types::ConsensusResult;

/// How an accepted serial relates to the zone's last known serial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Classification {
    /// No serial recorded yet; this round establishes history
    Baseline,
    /// Same serial as before
    Unchanged,
    /// Serial differs from the recorded one
    Changed {
        /// The recorded serial
        previous: u32,
    },
}

/// Compare an accepted serial with the last known one.
///
/// Serials are compared for equality only; sequence-space ordering is not
/// applied, so a decrease is a change like any other.
#[must_use]
pub const fn classify(last_known: Option<u32>, serial: u32) -> Classification {
    match last_known {
        None => Classification::Baseline,
        Some(previous) if previous == serial => Classification::Unchanged,
        Some(previous) => Classification::Changed { previous },
    }
}

/// Result of the delayed second round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Confirmation {
    /// Second round reached quorum on the same serial
    Confirmed,
    /// Second round reached quorum on another serial
    Diverged {
        /// Serial of the second round
        serial: u32,
    },
    /// Second round had no quorum
    NoQuorum,
}

impl Confirmation {
    /// Judge a second round against the serial of the first
    #[must_use]
    pub const fn judge(first: u32, second: &ConsensusResult) -> Self {
        match second.accepted() {
            Some(serial) if serial == first => Self::Confirmed,
            Some(serial) => Self::Diverged { serial },
            None => Self::NoQuorum,
        }
    }

    /// Serial the zone advances to after this verdict.
    ///
    /// An unconfirmed change still moves the zone forward: to the second
    /// round's serial when it had one, otherwise to the first round's.
    #[must_use]
    pub const fn settled_serial(self, first: u32) -> u32 {
        match self {
            Self::Diverged { serial } => serial,
            Self::Confirmed | Self::NoQuorum => first,
        }
    }

    /// Whether the change may be announced
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Confirmed)
    }
}
