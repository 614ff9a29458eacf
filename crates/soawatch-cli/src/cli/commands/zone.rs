//! `soawatch zone` - Manage monitored zones.

use anyhow::{bail, Result};
use colored::Colorize;
use soawatch_core::{schedule, Zone};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::cli::args::{ZoneArgs, ZoneCommands};
use crate::output::{print_json, OutputFormat};

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Zone")]
    name: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Cadence")]
    cadence: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Next check")]
    next: String,
}

pub async fn execute(ctx: Context, args: ZoneArgs) -> Result<()> {
    match args.command {
        ZoneCommands::Add {
            name,
            owner,
            cadence,
            id,
        } => add(&ctx, name, owner, cadence, id).await,
        ZoneCommands::List => list(&ctx).await,
        ZoneCommands::Remove { id } => remove(&ctx, &id).await,
    }
}

async fn add(ctx: &Context, name: String, owner: String, cadence: i64, id: Option<String>) -> Result<()> {
    let name = name.trim_end_matches('.').to_lowercase();
    if name.is_empty() || name.contains(char::is_whitespace) {
        bail!("Invalid zone name: {name:?}");
    }
    let clamped = schedule::clamp_cadence(cadence);
    if i64::from(clamped) != cadence {
        eprintln!(
            "{}",
            format!("Note: cadence {cadence}s will be checked every {clamped}s").dimmed()
        );
    }

    let zone = Zone::new(id.unwrap_or_else(|| name.clone()), name, owner, cadence);
    let store = ctx.store().await?;
    store.add_zone(zone.clone()).await?;

    match ctx.format_or(OutputFormat::Pretty) {
        OutputFormat::Json => print_json(&zone)?,
        OutputFormat::Pretty => println!(
            "{} {} ({})",
            "Watching".green(),
            zone.name.cyan(),
            zone.id
        ),
    }
    Ok(())
}

async fn list(ctx: &Context) -> Result<()> {
    let zones = ctx.store().await?.zones().await;

    match ctx.format_or(OutputFormat::Pretty) {
        OutputFormat::Json => print_json(&zones)?,
        OutputFormat::Pretty => {
            if zones.is_empty() {
                println!("{}", "No zones. Add one with: soawatch zone add <name> --owner <id>".dimmed());
                return Ok(());
            }
            let rows: Vec<ZoneRow> = zones
                .iter()
                .map(|z| ZoneRow {
                    id: z.id.clone(),
                    name: z.name.clone(),
                    owner: z.owner_id.clone(),
                    cadence: format!("{}s", schedule::clamp_cadence(z.cadence_seconds)),
                    serial: z
                        .last_known_serial
                        .map_or_else(|| "-".to_string(), |s| s.to_string()),
                    next: z
                        .next_check_at
                        .map_or_else(|| "due".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                })
                .collect();
            println!("{}", Table::new(&rows).with(Style::rounded()));
        }
    }
    Ok(())
}

async fn remove(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.store().await?;
    if !store.remove_zone(id).await? {
        bail!("No zone with ID {id}");
    }
    println!("{} {}", "Removed".green(), id);
    Ok(())
}
