//! Network clients for soawatch.
//!
//! - [`DohClient`]: queries several DNS-over-HTTPS resolvers for a zone's SOA
//!   and NS records and implements [`SoaObserver`](soawatch_core::SoaObserver)
//! - [`NotifyClient`]: delivers change events to Slack, Teams, generic
//!   webhooks and an email gateway; implements
//!   [`Notifier`](soawatch_core::Notifier)

mod config;
mod doh;
mod http;
pub mod notify;

pub use config::*;
pub use doh::{DohClient, DohClientBuilder, DohRecord, DohResponse, TYPE_NS, TYPE_SOA};
pub use notify::{EmailGateway, NotifyClient, NotifyClientBuilder};
pub use soawatch_core::{Result, WatchError};
