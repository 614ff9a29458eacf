//! JSON-document store, in memory or backed by a file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soawatch_core::{ChannelTarget, Result, WatchError, Zone, ZoneCheckRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::ZoneStore;

/// Everything the local store holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Monitored zones
    #[serde(default)]
    pub zones: Vec<Zone>,

    /// Enabled channel targets per owner
    #[serde(default)]
    pub channels: BTreeMap<String, Vec<ChannelTarget>>,

    /// Append-only check history, oldest first
    #[serde(default)]
    pub history: Vec<ZoneCheckRecord>,
}

impl StoreState {
    fn zone_mut(&mut self, zone_id: &str) -> Result<&mut Zone> {
        self.zones
            .iter_mut()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| WatchError::Store(format!("unknown zone {zone_id}")))
    }
}

/// Store keeping one JSON document; every write is flushed when file-backed
#[derive(Debug)]
pub struct LocalStore {
    state: Mutex<StoreState>,
    path: Option<PathBuf>,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl LocalStore {
    /// Empty store that never touches disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(StoreState::default())
    }

    /// In-memory store seeded with `state`
    #[must_use]
    pub fn with_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
            path: None,
        }
    }

    /// Open a file-backed store; a missing file starts empty
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                WatchError::Store(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(e) => {
                return Err(WatchError::Store(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    /// Backing file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the whole document
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    /// All zones, active or not
    pub async fn zones(&self) -> Vec<Zone> {
        self.state.lock().await.zones.clone()
    }

    /// One zone by ID
    pub async fn zone(&self, zone_id: &str) -> Option<Zone> {
        self.state
            .lock()
            .await
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .cloned()
    }

    /// History of one zone, oldest first
    pub async fn history(&self, zone_id: &str) -> Vec<ZoneCheckRecord> {
        self.state
            .lock()
            .await
            .history
            .iter()
            .filter(|r| r.zone_id == zone_id)
            .cloned()
            .collect()
    }

    /// Add a zone; IDs and names must be unique
    pub async fn add_zone(&self, zone: Zone) -> Result<()> {
        self.update(|state| {
            if state.zones.iter().any(|z| z.id == zone.id || z.name == zone.name) {
                return Err(WatchError::Store(format!(
                    "zone {} ({}) already exists",
                    zone.name, zone.id
                )));
            }
            state.zones.push(zone);
            Ok(())
        })
        .await
    }

    /// Remove a zone; its history stays. Returns false if it did not exist.
    pub async fn remove_zone(&self, zone_id: &str) -> Result<bool> {
        if self.zone(zone_id).await.is_none() {
            return Ok(false);
        }
        self.update(|state| {
            state.zones.retain(|z| z.id != zone_id);
            Ok(true)
        })
        .await
    }

    /// Attach a notification target to an owner
    pub async fn add_channel(&self, owner_id: &str, target: ChannelTarget) -> Result<()> {
        self.update(|state| {
            let targets = state.channels.entry(owner_id.to_string()).or_default();
            if !targets.contains(&target) {
                targets.push(target);
            }
            Ok(())
        })
        .await
    }

    /// Apply `change` to a copy of the document and keep it only once the
    /// copy is on disk, so a failed write leaves the store as it was.
    async fn update<T: Send>(
        &self,
        change: impl FnOnce(&mut StoreState) -> Result<T> + Send,
    ) -> Result<T> {
        let mut state = self.state.lock().await;
        if self.path.is_none() {
            return change(&mut state);
        }

        let mut next = state.clone();
        let value = change(&mut next)?;
        self.flush(&next).await?;
        *state = next;
        Ok(value)
    }

    async fn flush(&self, state: &StoreState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(state)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| WatchError::Store(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| WatchError::Store(format!("failed to replace {}: {e}", path.display())))?;

        debug!(path = %path.display(), "store flushed");
        Ok(())
    }
}

#[async_trait]
impl ZoneStore for LocalStore {
    async fn due_zones(&self, now: DateTime<Utc>) -> Result<Vec<Zone>> {
        Ok(self
            .state
            .lock()
            .await
            .zones
            .iter()
            .filter(|z| z.is_due(now))
            .cloned()
            .collect())
    }

    async fn schedule(
        &self,
        zone_id: &str,
        last_checked: DateTime<Utc>,
        next_check_at: DateTime<Utc>,
    ) -> Result<()> {
        self.update(|state| {
            let zone = state.zone_mut(zone_id)?;
            zone.last_checked = Some(last_checked);
            zone.next_check_at = Some(next_check_at);
            Ok(())
        })
        .await
    }

    async fn set_last_known_serial(&self, zone_id: &str, serial: u32) -> Result<()> {
        self.update(|state| {
            state.zone_mut(zone_id)?.last_known_serial = Some(serial);
            Ok(())
        })
        .await
    }

    async fn append_check(&self, record: &ZoneCheckRecord) -> Result<()> {
        self.update(|state| {
            state.history.push(record.clone());
            Ok(())
        })
        .await
    }

    async fn recent_changes(
        &self,
        zone_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ZoneCheckRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .history
            .iter()
            .rev()
            .filter(|r| r.zone_id == zone_id && r.is_change && r.checked_at >= since)
            .cloned()
            .collect())
    }

    async fn last_observed(&self, zone_id: &str) -> Result<Option<ZoneCheckRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .history
            .iter()
            .rev()
            .find(|r| r.zone_id == zone_id && r.soa.is_some())
            .cloned())
    }

    async fn channels(&self, owner_id: &str) -> Result<Vec<ChannelTarget>> {
        Ok(self
            .state
            .lock()
            .await
            .channels
            .get(owner_id)
            .cloned()
            .unwrap_or_default())
    }
}
