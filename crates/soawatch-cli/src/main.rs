//! soawatch - SOA serial change monitor
//!
//! Watches DNS zones through several DNS-over-HTTPS resolvers and announces
//! confirmed serial changes.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    soawatch_cli::run().await
}
