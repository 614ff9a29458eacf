//! The tick: select due zones, run their rounds, report per-zone outcomes.

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use soawatch_client::{DohClient, NotifyClient};
use soawatch_core::{
    consensus, dedup, detect::classify, ChangeEvent, ChangeKind, Classification, Confirmation,
    ConsensusResult, DeliveryOutcome, Notifier, Result, SoaObserver, TickSummary, WatchError,
    Zone, ZoneCheckRecord, ZoneOutcome, ZoneStatus,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, MonitorConfig};
use crate::dispatch;
use crate::policy::{OnWriteFailure, WritePolicy};
use crate::scheduler::Scheduler;
use crate::store::ZoneStore;

/// Zone-change detection engine.
///
/// Holds no state between ticks beyond what lives in the store; each
/// [`tick`](Self::tick) returns its own accumulated results.
pub struct Monitor {
    store: Arc<dyn ZoneStore>,
    observer: Arc<dyn SoaObserver>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    config: MonitorConfig,
    policy: WritePolicy,
    priority: Vec<String>,
    login_url: String,
}

impl Monitor {
    /// Start building a monitor from its three collaborators
    pub fn builder(
        store: Arc<dyn ZoneStore>,
        observer: Arc<dyn SoaObserver>,
        notifier: Arc<dyn Notifier>,
    ) -> MonitorBuilder {
        MonitorBuilder::new(store, observer, notifier)
    }

    /// Wire DoH resolvers and notification channels from `config`.
    ///
    /// Fails on configuration the engine cannot run with, before any zone is
    /// touched.
    pub fn from_config(config: &Config, store: Arc<dyn ZoneStore>) -> Result<Self> {
        config.validate()?;

        let observer = DohClient::new(config.resolvers.clone())?;

        let mut notifier = NotifyClient::builder().timeout(config.notify.timeout());
        if let Some(gateway) = config.email_gateway() {
            notifier = notifier.email_gateway(gateway);
        }
        if let Some(color) = &config.notify.teams_theme_color {
            notifier = notifier.theme_color(color.clone());
        }
        let notifier = notifier.build()?;

        Ok(Self::builder(store, Arc::new(observer), Arc::new(notifier))
            .config(config.monitor.clone())
            .policy(config.persistence.clone())
            .login_url(config.notify.login_url.clone())
            .build())
    }

    /// Engine settings in use
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one tick over every due zone.
    ///
    /// Only a failure to list due zones is an error; anything that goes wrong
    /// inside a zone's round is reported in that zone's entry.
    pub async fn tick(&self) -> Result<TickSummary> {
        let now = self.clock.now();
        let store = self.store.as_ref();
        let due = self
            .policy
            .run(self.clock.as_ref(), "*", "list due zones", move || store.due_zones(now))
            .await?;
        let zones = self.scheduler.select(due, now);
        info!(due = zones.len(), "tick started");

        let results: Vec<ZoneOutcome> = stream::iter(zones)
            .map(|zone| async move { self.check_zone(&zone).await })
            .buffered(self.config.zone_concurrency.max(1))
            .collect()
            .await;

        let summary = TickSummary::new(results);
        info!(zones = summary.zones_checked, "{}", summary.message);
        Ok(summary)
    }

    /// Run one complete round for `zone`, never failing.
    #[instrument(skip(self, zone), fields(zone = %zone.name, zone_id = %zone.id))]
    pub async fn check_zone(&self, zone: &Zone) -> ZoneOutcome {
        let mut warnings = Vec::new();
        let mut outcome = match self.process_zone(zone, &mut warnings).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "zone round failed");
                ZoneOutcome::failed(zone, &e)
            }
        };
        outcome.warnings = warnings;
        outcome
    }

    async fn process_zone(&self, zone: &Zone, warnings: &mut Vec<String>) -> Result<ZoneOutcome> {
        let store = self.store.as_ref();
        let zone_id = zone.id.as_str();

        // Provisional: a crash mid-round must not leave the zone due forever.
        let picked_at = self.clock.now();
        let next_check_at = self.scheduler.next_check_at(picked_at, zone.cadence_seconds);
        self.guarded(zone, "schedule", warnings, move || {
            store.schedule(zone_id, picked_at, next_check_at)
        })
        .await?;

        let first = self.round(zone).await;
        let nameservers = if self.config.fetch_nameservers {
            self.observer.nameservers(&zone.name).await
        } else {
            Vec::new()
        };

        let Some(serial) = first.accepted() else {
            return self.no_quorum(zone, &first, nameservers, warnings).await;
        };

        let mut outcome = match classify(zone.last_known_serial, serial) {
            Classification::Unchanged => {
                debug!(serial, "serial unchanged");
                let record = ZoneCheckRecord::new(zone_id, self.clock.now())
                    .with_soa(first.soa.clone(), Some(serial))
                    .details("unchanged");
                self.commit(zone, &record, None, warnings).await?;
                ZoneOutcome::from_round(zone, ZoneStatus::Unchanged, &first)
            }
            Classification::Baseline => self.baseline(zone, serial, &first, &nameservers, warnings).await?,
            Classification::Changed { previous } => {
                self.changed(zone, previous, serial, &first, &nameservers, warnings)
                    .await?
            }
        };
        outcome.nameservers = nameservers;
        Ok(outcome)
    }

    async fn no_quorum(
        &self,
        zone: &Zone,
        first: &ConsensusResult,
        nameservers: Vec<String>,
        warnings: &mut Vec<String>,
    ) -> Result<ZoneOutcome> {
        let note = match first.serial {
            Some(leading) => format!(
                "no quorum: serial {leading} had {}/{} votes",
                first.votes, first.total
            ),
            None => "no quorum: no resolver answered".to_string(),
        };
        warn!(votes = first.votes, total = first.total, "{note}");

        let record = ZoneCheckRecord::new(zone.id.as_str(), self.clock.now()).details(note.clone());
        self.commit(zone, &record, None, warnings).await?;

        let mut outcome = ZoneOutcome::from_round(zone, ZoneStatus::NoQuorum, first);
        outcome.nameservers = nameservers;
        outcome.note = Some(note);
        Ok(outcome)
    }

    async fn baseline(
        &self,
        zone: &Zone,
        serial: u32,
        first: &ConsensusResult,
        nameservers: &[String],
        warnings: &mut Vec<String>,
    ) -> Result<ZoneOutcome> {
        info!(serial, "baseline established");
        let duplicate = self.config.notify_on_baseline && self.is_duplicate(zone, serial, warnings).await?;

        let details = if duplicate {
            "baseline established; duplicate suppressed"
        } else {
            "baseline established"
        };
        let record = ZoneCheckRecord::new(zone.id.as_str(), self.clock.now())
            .with_soa(first.soa.clone(), Some(serial))
            .change(None)
            .details(details);
        self.commit(zone, &record, Some(serial), warnings).await?;

        let mut outcome = ZoneOutcome::from_round(zone, ZoneStatus::Baseline, first);
        outcome.is_change = true;
        if duplicate {
            outcome.note = Some(format!("serial {serial} already announced within the dedup window"));
        } else if self.config.notify_on_baseline {
            let event = self.event(zone, ChangeKind::Baseline, None, serial, first, nameservers)?;
            outcome.notifications = self.announce(zone, &event, warnings).await?;
        }
        Ok(outcome)
    }

    async fn changed(
        &self,
        zone: &Zone,
        previous: u32,
        serial: u32,
        first: &ConsensusResult,
        nameservers: &[String],
        warnings: &mut Vec<String>,
    ) -> Result<ZoneOutcome> {
        info!(previous, serial, "serial change detected, confirming");
        self.clock.sleep(self.config.confirm_delay()).await;
        let second = self.round(zone).await;
        let verdict = Confirmation::judge(serial, &second);

        let store = self.store.as_ref();
        let zone_id = zone.id.as_str();
        let previous_soa = self
            .guarded(zone, "load previous SOA", warnings, move || store.last_observed(zone_id))
            .await?
            .flatten()
            .and_then(|record| record.soa);

        if !verdict.is_confirmed() {
            let settled = verdict.settled_serial(serial);
            // The outcome describes whichever round the settled serial came from
            let (note, settled_round) = match verdict {
                Confirmation::Diverged { serial: seen } => (
                    format!("unconfirmed: confirmation round saw serial {seen} instead of {serial}"),
                    &second,
                ),
                _ => (
                    format!(
                        "unconfirmed: confirmation round had no quorum ({}/{})",
                        second.votes, second.total
                    ),
                    first,
                ),
            };
            warn!(previous, serial, settled, "{note}");

            let record = ZoneCheckRecord::new(zone_id, self.clock.now())
                .with_soa(settled_round.soa.clone(), Some(settled))
                .change(previous_soa)
                .details(note.clone());
            self.commit(zone, &record, Some(settled), warnings).await?;

            let mut outcome =
                ZoneOutcome::from_round(zone, ZoneStatus::UnconfirmedChange, settled_round);
            outcome.serial = Some(settled);
            outcome.is_change = true;
            outcome.note = Some(note);
            return Ok(outcome);
        }

        let duplicate = self.is_duplicate(zone, serial, warnings).await?;
        let details = if duplicate {
            format!("serial {previous} -> {serial} confirmed; duplicate suppressed")
        } else {
            format!("serial {previous} -> {serial} confirmed")
        };
        let record = ZoneCheckRecord::new(zone_id, self.clock.now())
            .with_soa(first.soa.clone(), Some(serial))
            .change(previous_soa)
            .details(details);
        self.commit(zone, &record, Some(serial), warnings).await?;

        let mut outcome = ZoneOutcome::from_round(zone, ZoneStatus::ConfirmedChange, first);
        outcome.is_change = true;
        if duplicate {
            info!(serial, "duplicate suppressed");
            outcome.status = ZoneStatus::DuplicateSuppressed;
            outcome.note = Some(format!("serial {serial} already announced within the dedup window"));
        } else {
            let event = self.event(
                zone,
                ChangeKind::SerialChanged,
                Some(previous),
                serial,
                first,
                nameservers,
            )?;
            outcome.notifications = self.announce(zone, &event, warnings).await?;
        }
        Ok(outcome)
    }

    async fn round(&self, zone: &Zone) -> ConsensusResult {
        let observations = self.observer.observe(&zone.name).await;
        let result = consensus::tally(observations, &self.priority, self.config.quorum);
        debug!(
            serial = ?result.serial,
            votes = result.votes,
            total = result.total,
            quorum = result.quorum,
            "consensus round"
        );
        result
    }

    /// Whether `serial` was already announced inside the dedup window.
    /// An unreadable history counts as "not announced".
    async fn is_duplicate(&self, zone: &Zone, serial: u32, warnings: &mut Vec<String>) -> Result<bool> {
        let window = chrono::Duration::from_std(self.config.dedup_window())
            .unwrap_or_else(|_| chrono::Duration::zero());
        let now = self.clock.now();
        let since = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);

        let store = self.store.as_ref();
        let zone_id = zone.id.as_str();
        let records = self
            .guarded(zone, "load recent changes", warnings, move || {
                store.recent_changes(zone_id, since)
            })
            .await?;
        Ok(records.is_some_and(|records| dedup::already_announced(&records, serial, since)))
    }

    /// Append the round's record, then advance the serial if one settled.
    async fn commit(
        &self,
        zone: &Zone,
        record: &ZoneCheckRecord,
        serial: Option<u32>,
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        let store = self.store.as_ref();
        self.guarded(zone, "append check", warnings, move || store.append_check(record))
            .await?;
        if let Some(serial) = serial {
            let zone_id = zone.id.as_str();
            self.guarded(zone, "set last known serial", warnings, move || {
                store.set_last_known_serial(zone_id, serial)
            })
            .await?;
        }
        Ok(())
    }

    fn event(
        &self,
        zone: &Zone,
        kind: ChangeKind,
        old_serial: Option<u32>,
        new_serial: u32,
        round: &ConsensusResult,
        nameservers: &[String],
    ) -> Result<ChangeEvent> {
        let soa = round
            .soa
            .clone()
            .ok_or_else(|| WatchError::Internal(format!("accepted serial {new_serial} has no SOA")))?;
        Ok(ChangeEvent {
            zone_id: zone.id.clone(),
            zone: zone.name.clone(),
            kind,
            old_serial,
            new_serial,
            soa,
            nameservers: nameservers.to_vec(),
            occurred_at: self.clock.now(),
            login_url: self.login_url.clone(),
        })
    }

    async fn announce(
        &self,
        zone: &Zone,
        event: &ChangeEvent,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<DeliveryOutcome>> {
        let store = self.store.as_ref();
        let owner = zone.owner_id.as_str();
        let targets = self
            .guarded(zone, "load channels", warnings, move || store.channels(owner))
            .await?
            .unwrap_or_default();
        if targets.is_empty() {
            debug!(owner, "no notification channels enabled");
            return Ok(Vec::new());
        }
        Ok(dispatch::fan_out(self.notifier.as_ref(), self.clock.as_ref(), &targets, event).await)
    }

    /// Run a store operation under the write policy.
    ///
    /// `Ok(None)` means the operation failed and the policy chose to continue;
    /// the failure is already logged and recorded in `warnings`.
    async fn guarded<T, F, Fut>(
        &self,
        zone: &Zone,
        what: &str,
        warnings: &mut Vec<String>,
        op: F,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        match self.policy.run(self.clock.as_ref(), &zone.name, what, op).await {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self.policy.on_failure {
                OnWriteFailure::Continue => {
                    error!(zone = %zone.name, zone_id = %zone.id, what, error = %e, "store failure, continuing");
                    warnings.push(format!("{what} failed: {e}"));
                    Ok(None)
                }
                OnWriteFailure::AbortZone => Err(e),
            },
        }
    }
}

/// Builder for [`Monitor`]
pub struct MonitorBuilder {
    store: Arc<dyn ZoneStore>,
    observer: Arc<dyn SoaObserver>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    scheduler: Option<Scheduler>,
    config: MonitorConfig,
    policy: WritePolicy,
    login_url: String,
}

impl MonitorBuilder {
    /// Create a builder with the system clock and default settings
    pub fn new(
        store: Arc<dyn ZoneStore>,
        observer: Arc<dyn SoaObserver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            observer,
            notifier,
            clock: Arc::new(SystemClock),
            scheduler: None,
            config: MonitorConfig::default(),
            policy: WritePolicy::default(),
            login_url: String::new(),
        }
    }

    /// Use another clock
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a specific scheduler, e.g. one with a seeded jitter source
    #[must_use]
    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Set engine settings
    #[must_use]
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the store failure policy
    #[must_use]
    pub fn policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the link included in notifications
    #[must_use]
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Build the monitor
    #[must_use]
    pub fn build(self) -> Monitor {
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Scheduler::new(self.config.max_jitter()));
        let priority = self.observer.priority();
        Monitor {
            store: self.store,
            observer: self.observer,
            notifier: self.notifier,
            clock: self.clock,
            scheduler,
            config: self.config,
            policy: self.policy,
            priority,
            login_url: self.login_url,
        }
    }
}
