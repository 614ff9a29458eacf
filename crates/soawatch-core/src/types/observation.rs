use serde::{Deserialize, Serialize};

use super::SoaRecord;

/// What one resolver reported for one zone in one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverObservation {
    /// Resolver name, as configured
    pub resolver: String,

    /// Parsed SOA, present only on success
    #[serde(default)]
    pub soa: Option<SoaRecord>,

    /// Whether the query produced a usable SOA
    pub ok: bool,

    /// Failure reason when `ok` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolverObservation {
    /// A successful observation
    #[must_use]
    pub fn success(resolver: impl Into<String>, soa: SoaRecord) -> Self {
        Self {
            resolver: resolver.into(),
            soa: Some(soa),
            ok: true,
            error: None,
        }
    }

    /// A failed observation; never aborts the round
    #[must_use]
    pub fn failure(resolver: impl Into<String>, error: impl ToString) -> Self {
        Self {
            resolver: resolver.into(),
            soa: None,
            ok: false,
            error: Some(error.to_string()),
        }
    }

    /// Serial reported by this resolver, if it succeeded
    #[must_use]
    pub fn serial(&self) -> Option<u32> {
        if self.ok {
            self.soa.as_ref().map(|soa| soa.serial)
        } else {
            None
        }
    }
}

/// Outcome of one majority vote over a round of observations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Most-voted serial (after tie-break), even when it lacks quorum
    pub serial: Option<u32>,

    /// SOA reported by the highest-priority resolver voting for `serial`
    pub soa: Option<SoaRecord>,

    /// Votes for `serial`
    pub votes: usize,

    /// Successful observations in the round
    pub total: usize,

    /// Whether `serial` reached the majority threshold
    pub quorum: bool,

    /// Resolvers that voted for `serial`, in priority order
    pub sources: Vec<String>,

    /// Every observation of the round, failures included
    pub samples: Vec<ResolverObservation>,
}

impl ConsensusResult {
    /// The serial the round agreed on, or `None` for a no-quorum round
    #[must_use]
    pub const fn accepted(&self) -> Option<u32> {
        if self.quorum {
            self.serial
        } else {
            None
        }
    }
}
