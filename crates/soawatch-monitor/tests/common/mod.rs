//! Scripted collaborators for engine scenarios.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use soawatch_core::{
    ChangeEvent, ChannelKind, ChannelTarget, Notifier, ResolverObservation, Result, SoaObserver,
    SoaRecord, WatchError, Zone, ZoneCheckRecord,
};
use soawatch_monitor::{
    config::MonitorConfig, LocalStore, ManualClock, Monitor, Scheduler, WritePolicy, ZoneStore,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const RESOLVERS: [&str; 3] = ["cloudflare", "google", "quad9"];

pub fn soa(serial: u32) -> SoaRecord {
    format!("ns1.example.com. hostmaster.example.com. {serial} 7200 3600 1209600 300")
        .parse()
        .unwrap()
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Answers each round from a per-zone script; the last round repeats.
/// `None` in a round is a failed resolver.
#[derive(Default)]
pub struct ScriptedObserver {
    scripts: Mutex<HashMap<String, VecDeque<Vec<Option<u32>>>>>,
    rounds: AtomicU32,
}

impl ScriptedObserver {
    pub fn script(&self, zone: &str, rounds: &[&[Option<u32>]]) {
        self.scripts.lock().insert(
            zone.to_string(),
            rounds.iter().map(|round| round.to_vec()).collect(),
        );
    }

    pub fn rounds(&self) -> u32 {
        self.rounds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SoaObserver for ScriptedObserver {
    fn priority(&self) -> Vec<String> {
        RESOLVERS.iter().map(ToString::to_string).collect()
    }

    async fn observe(&self, zone: &str) -> Vec<ResolverObservation> {
        self.rounds.fetch_add(1, Ordering::SeqCst);
        let round = {
            let mut scripts = self.scripts.lock();
            match scripts.get_mut(zone) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
                Some(queue) => queue.front().cloned().unwrap_or_default(),
                None => vec![None; RESOLVERS.len()],
            }
        };
        RESOLVERS
            .iter()
            .zip(round)
            .map(|(name, serial)| match serial {
                Some(serial) => ResolverObservation::success(*name, soa(serial)),
                None => ResolverObservation::failure(*name, "request timed out after 2000 ms"),
            })
            .collect()
    }

    async fn nameservers(&self, _zone: &str) -> Vec<String> {
        vec!["ns1.example.com.".into(), "ns2.example.com.".into()]
    }
}

/// Records every delivery; fails the channels listed in `failing`.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(ChannelKind, ChangeEvent)>>,
    pub failing: Mutex<Vec<ChannelKind>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn kinds(&self) -> Vec<ChannelKind> {
        self.sent.lock().iter().map(|(kind, _)| *kind).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, target: &ChannelTarget, event: &ChangeEvent) -> Result<()> {
        self.sent.lock().push((target.kind(), event.clone()));
        if self.failing.lock().contains(&target.kind()) {
            return Err(WatchError::Status {
                code: 503,
                message: "unavailable".into(),
            });
        }
        Ok(())
    }
}

/// A [`LocalStore`] whose operations can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: LocalStore,
    pub fail_due: AtomicBool,
    pub fail_append: AtomicBool,
    pub fail_recent: AtomicBool,
    pub fail_channels: AtomicBool,
    pub append_calls: AtomicU32,
}

fn down(what: &str) -> WatchError {
    WatchError::Store(format!("{what}: connection reset"))
}

#[async_trait]
impl ZoneStore for FlakyStore {
    async fn due_zones(&self, now: DateTime<Utc>) -> Result<Vec<Zone>> {
        if self.fail_due.load(Ordering::SeqCst) {
            return Err(down("due zones"));
        }
        self.inner.due_zones(now).await
    }

    async fn schedule(
        &self,
        zone_id: &str,
        last_checked: DateTime<Utc>,
        next_check_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner.schedule(zone_id, last_checked, next_check_at).await
    }

    async fn set_last_known_serial(&self, zone_id: &str, serial: u32) -> Result<()> {
        self.inner.set_last_known_serial(zone_id, serial).await
    }

    async fn append_check(&self, record: &ZoneCheckRecord) -> Result<()> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(down("append"));
        }
        self.inner.append_check(record).await
    }

    async fn recent_changes(
        &self,
        zone_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ZoneCheckRecord>> {
        if self.fail_recent.load(Ordering::SeqCst) {
            return Err(down("recent changes"));
        }
        self.inner.recent_changes(zone_id, since).await
    }

    async fn last_observed(&self, zone_id: &str) -> Result<Option<ZoneCheckRecord>> {
        self.inner.last_observed(zone_id).await
    }

    async fn channels(&self, owner_id: &str) -> Result<Vec<ChannelTarget>> {
        if self.fail_channels.load(Ordering::SeqCst) {
            return Err(down("channels"));
        }
        self.inner.channels(owner_id).await
    }
}

pub fn all_channels() -> Vec<ChannelTarget> {
    vec![
        ChannelTarget::Email {
            to: "ops@example.com".into(),
        },
        ChannelTarget::Slack {
            webhook_url: "https://hooks.slack.test/T000/B000".into(),
        },
        ChannelTarget::Teams {
            webhook_url: "https://outlook.office.test/webhook/1".into(),
        },
        ChannelTarget::Webhook {
            url: "https://hooks.example.test/soa".into(),
        },
    ]
}

/// Everything a scenario needs, wired together.
pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub observer: Arc<ScriptedObserver>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub monitor: Monitor,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(MonitorConfig::default(), WritePolicy::default())
    }

    pub fn with(config: MonitorConfig, policy: WritePolicy) -> Self {
        let store = Arc::new(FlakyStore::default());
        let observer = Arc::new(ScriptedObserver::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(start()));
        let scheduler = Scheduler::seeded(config.max_jitter(), 7);
        let monitor = Monitor::builder(store.clone(), observer.clone(), notifier.clone())
            .clock(clock.clone())
            .scheduler(scheduler)
            .config(config)
            .policy(policy)
            .login_url("https://soawatch.test/login")
            .build();

        Self {
            store,
            observer,
            notifier,
            clock,
            monitor,
        }
    }

    /// Add an owner "u1" zone, optionally with a known serial and a prior
    /// baseline record carrying its SOA.
    pub async fn zone(&self, id: &str, name: &str, last_known: Option<u32>) {
        self.store.inner.add_zone(Zone::new(id, name, "u1", 30)).await.unwrap();
        if let Some(serial) = last_known {
            let earlier = start() - chrono::Duration::hours(1);
            let record = ZoneCheckRecord::new(id, earlier)
                .with_soa(Some(soa(serial)), Some(serial))
                .change(None)
                .details("baseline established");
            self.store.inner.append_check(&record).await.unwrap();
            self.store.inner.set_last_known_serial(id, serial).await.unwrap();
        }
    }

    pub async fn channels(&self, targets: Vec<ChannelTarget>) {
        for target in targets {
            self.store.inner.add_channel("u1", target).await.unwrap();
        }
    }

    pub async fn serial(&self, id: &str) -> Option<u32> {
        self.store.inner.zone(id).await.unwrap().last_known_serial
    }

    pub async fn history(&self, id: &str) -> Vec<ZoneCheckRecord> {
        self.store.inner.history(id).await
    }

    /// Move past every zone's next due time
    pub fn later(&self) {
        self.clock.advance(Duration::from_secs(61));
    }
}
