//! Boundary to the durable zone store.
//!
//! The store owns zones, notification preferences and check history. The
//! engine only reads due zones and channel targets, and writes schedule
//! fields, the last known serial and new history records.

mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use soawatch_core::{ChannelTarget, Result, Zone, ZoneCheckRecord};

pub use local::{LocalStore, StoreState};

/// Zone state and check history
#[async_trait]
pub trait ZoneStore: Send + Sync {
    /// Active zones whose `next_check_at` is unset or not after `now`
    async fn due_zones(&self, now: DateTime<Utc>) -> Result<Vec<Zone>>;

    /// Record that the zone was picked up and when it is next due
    async fn schedule(
        &self,
        zone_id: &str,
        last_checked: DateTime<Utc>,
        next_check_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Advance the zone's last known serial
    async fn set_last_known_serial(&self, zone_id: &str, serial: u32) -> Result<()>;

    /// Append a history record; records are never edited afterwards
    async fn append_check(&self, record: &ZoneCheckRecord) -> Result<()>;

    /// Change records of the zone checked at or after `since`, newest first
    async fn recent_changes(
        &self,
        zone_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ZoneCheckRecord>>;

    /// Most recent history record of the zone that carries an observed SOA
    async fn last_observed(&self, zone_id: &str) -> Result<Option<ZoneCheckRecord>>;

    /// Enabled notification targets of a zone owner
    async fn channels(&self, owner_id: &str) -> Result<Vec<ChannelTarget>>;
}
