//! Zone-change detection engine for soawatch.
//!
//! One [`Monitor::tick`] selects the zones that are due, and for each one:
//!
//! 1. writes a provisional schedule so a crashed round cannot wedge the zone
//! 2. runs a consensus round over every configured resolver
//! 3. classifies the accepted serial against the last known one
//! 4. on a change, waits and runs a confirmation round
//! 5. checks the dedup window, appends a history record and advances the serial
//! 6. fans a verified event out to the owner's channels
//!
//! Store failures go through a [`WritePolicy`]; time goes through a
//! [`Clock`] so tests can drive the confirmation delay.
//!
//! # Example
//!
//! ```rust,no_run
//! use soawatch_monitor::{Config, LocalStore, Monitor};
//! use std::sync::Arc;
//!
//! # async fn example() -> soawatch_core::Result<()> {
//! let mut config = Config::default();
//! config.store.path = Some("state.json".into());
//! let store = Arc::new(LocalStore::open("state.json").await?);
//! let monitor = Monitor::from_config(&config, store)?;
//! let summary = monitor.tick().await?;
//! println!("{}", summary.message);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod dispatch;
mod monitor;
pub mod policy;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use monitor::{Monitor, MonitorBuilder};
pub use policy::{OnWriteFailure, WritePolicy};
pub use scheduler::Scheduler;
pub use store::{LocalStore, StoreState, ZoneStore};
