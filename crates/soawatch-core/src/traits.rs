//! Seams between the engine and the outside world.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChangeEvent, ChannelTarget, ResolverObservation};

/// Source of per-resolver SOA observations
#[async_trait]
pub trait SoaObserver: Send + Sync {
    /// Resolver names in priority order; used to break consensus ties
    fn priority(&self) -> Vec<String>;

    /// Query every resolver for the zone's SOA. Always returns one
    /// observation per resolver; failures are observations, not errors.
    async fn observe(&self, zone: &str) -> Vec<ResolverObservation>;

    /// Nameservers of the zone, for audit. Empty on failure.
    async fn nameservers(&self, zone: &str) -> Vec<String>;
}

/// Delivery of a change event to one channel target
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Make one delivery attempt
    async fn deliver(&self, target: &ChannelTarget, event: &ChangeEvent) -> Result<()>;
}
