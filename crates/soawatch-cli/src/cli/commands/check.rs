//! `soawatch check` - One consensus round for a zone.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use soawatch_client::DohClient;
use soawatch_core::{consensus, ConsensusResult, SoaObserver};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::CheckArgs;
use crate::output::{print_json, OutputFormat};

#[derive(Tabled)]
struct ObservationRow {
    #[tabled(rename = "Resolver")]
    resolver: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Primary NS")]
    primary: String,
}

pub async fn execute(ctx: Context, args: CheckArgs) -> Result<()> {
    ctx.config.validate()?;

    let client = DohClient::new(ctx.config.resolvers.clone())?;
    let observations = client.observe(&args.zone).await;
    let nameservers = if ctx.config.monitor.fetch_nameservers {
        client.nameservers(&args.zone).await
    } else {
        Vec::new()
    };
    let result = consensus::tally(observations, &client.priority(), ctx.config.monitor.quorum);

    match ctx.format_or(OutputFormat::Pretty) {
        OutputFormat::Json => print_json(&json!({
            "zone": args.zone,
            "serial": result.accepted(),
            "consensus": result,
            "nameservers": nameservers,
        }))?,
        OutputFormat::Pretty => print_check(&args.zone, &result, &nameservers),
    }

    Ok(())
}

fn print_check(zone: &str, result: &ConsensusResult, nameservers: &[String]) {
    println!("{} {}", "Zone:".bold(), zone.cyan());
    println!();

    let rows: Vec<ObservationRow> = result
        .samples
        .iter()
        .map(|o| ObservationRow {
            resolver: o.resolver.clone(),
            result: if o.ok {
                "ok".green().to_string()
            } else {
                o.error.clone().unwrap_or_else(|| "failed".into()).red().to_string()
            },
            serial: o.serial().map_or_else(|| "-".to_string(), |s| s.to_string()),
            primary: o.soa.as_ref().map(|s| s.primary_ns.clone()).unwrap_or_default(),
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!();

    match result.accepted() {
        Some(serial) => println!(
            "{} serial {} ({}/{} votes: {})",
            "Consensus:".bold(),
            serial.to_string().green().bold(),
            result.votes,
            result.total,
            result.sources.join(", ")
        ),
        None => println!(
            "{} {} ({}/{} votes for the leading serial)",
            "Consensus:".bold(),
            "no quorum".yellow(),
            result.votes,
            result.total
        ),
    }

    if !nameservers.is_empty() {
        println!("{} {}", "Nameservers:".bold(), nameservers.join(", "));
    }
}
