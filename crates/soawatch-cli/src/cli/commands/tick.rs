//! `soawatch tick` - Check every due zone once.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use soawatch_core::{TickSummary, ZoneStatus};
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::output::{print_json, OutputFormat};

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Votes")]
    votes: String,
    #[tabled(rename = "Sent")]
    sent: String,
    #[tabled(rename = "Note")]
    note: String,
}

pub async fn execute(ctx: Context) -> Result<()> {
    let monitor = ctx.monitor().await?;
    let summary = monitor.tick().await?;

    match ctx.format_or(OutputFormat::Json) {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Pretty => print_summary(&summary),
    }

    Ok(())
}

/// Status word colored by severity
pub fn status_label(status: ZoneStatus) -> ColoredString {
    match status {
        ZoneStatus::Baseline => "baseline".cyan(),
        ZoneStatus::Unchanged => "unchanged".normal(),
        ZoneStatus::ConfirmedChange => "confirmed change".green().bold(),
        ZoneStatus::UnconfirmedChange => "unconfirmed change".yellow(),
        ZoneStatus::DuplicateSuppressed => "duplicate suppressed".dimmed(),
        ZoneStatus::NoQuorum => "no quorum".yellow(),
        ZoneStatus::Error => "error".red().bold(),
    }
}

fn print_summary(summary: &TickSummary) {
    println!("{}", summary.message.bold());

    if summary.results.is_empty() {
        return;
    }
    println!();

    let rows: Vec<ResultRow> = summary
        .results
        .iter()
        .map(|r| ResultRow {
            zone: r.zone.clone(),
            status: status_label(r.status).to_string(),
            serial: r.serial.map_or_else(|| "-".to_string(), |s| s.to_string()),
            votes: format!("{}/{}", r.votes, r.total),
            sent: format!(
                "{}/{}",
                r.notifications.iter().filter(|n| n.delivered).count(),
                r.notifications.len()
            ),
            note: r
                .error
                .clone()
                .or_else(|| r.note.clone())
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");

    for result in summary.results.iter().filter(|r| !r.warnings.is_empty()) {
        for warning in &result.warnings {
            println!("{} {}: {}", "warning:".yellow(), result.zone, warning);
        }
    }
}
