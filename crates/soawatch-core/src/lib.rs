//! Core types and logic for soawatch.
//!
//! This crate holds everything about zone-change detection that does not
//! touch the network or a store:
//!
//! - **Types**: zones, SOA records, observations, check records, events
//! - **Consensus**: majority vote over resolver observations
//! - **Detection**: change classification and confirmation verdicts
//! - **Dedup**: the repeat-announcement predicate
//! - **Schedule**: cadence clamping and jitter
//! - **Traits**: [`SoaObserver`] and [`Notifier`], implemented by `soawatch-client`
//!
//! # Example
//!
//! ```rust
//! use soawatch_core::{consensus, QuorumRule, ResolverObservation};
//!
//! let soa = "ns1.example.com. hostmaster.example.com. 5 7200 3600 1209600 300"
//!     .parse()
//!     .unwrap();
//! let order = vec!["a".to_string(), "b".to_string()];
//! let result = consensus::tally(
//!     vec![
//!         ResolverObservation::success("a", soa),
//!         ResolverObservation::failure("b", "timeout"),
//!     ],
//!     &order,
//!     QuorumRule::CeilHalf,
//! );
//! assert_eq!(result.accepted(), Some(5));
//! ```

pub mod consensus;
pub mod dedup;
pub mod detect;
mod error;
pub mod schedule;
mod traits;
pub mod types;

pub use consensus::QuorumRule;
pub use detect::{Classification, Confirmation};
pub use error::{Result, WatchError};
pub use traits::{Notifier, SoaObserver};
pub use types::*;
