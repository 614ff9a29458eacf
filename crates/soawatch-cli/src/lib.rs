//! # soawatch-cli
//!
//! Command-line interface for soawatch.
//!
//! ## Commands
//!
//! - **tick**: run one monitoring pass and print the summary
//! - **serve**: expose `POST /tick` and `GET /health` over HTTP
//! - **check**: one consensus round for a zone, without touching the store
//! - **zone** / **channel**: administer the local store

pub mod cli;
pub mod output;
pub mod paths;
pub mod telemetry;

pub use cli::run;
