//! `soawatch channel` - Manage notification channels.

use anyhow::{bail, Result};
use colored::Colorize;
use soawatch_core::ChannelTarget;

use super::Context;
use crate::cli::args::{ChannelArgs, ChannelCommands, ChannelKindArg};
use crate::output::{print_json, OutputFormat};

pub async fn execute(ctx: Context, args: ChannelArgs) -> Result<()> {
    match args.command {
        ChannelCommands::Add {
            owner,
            kind,
            target,
        } => {
            let target = parse_target(kind, target)?;
            ctx.store().await?.add_channel(&owner, target.clone()).await?;
            println!("{} {} channel for {}", "Added".green(), target.kind(), owner.cyan());
            Ok(())
        }
        ChannelCommands::List { owner } => {
            let targets = ctx.store().await?.snapshot().await.channels.remove(&owner).unwrap_or_default();
            match ctx.format_or(OutputFormat::Pretty) {
                OutputFormat::Json => print_json(&targets)?,
                OutputFormat::Pretty => {
                    if targets.is_empty() {
                        println!("{}", format!("No channels for {owner}").dimmed());
                    }
                    for target in &targets {
                        println!("  {:8} {}", target.kind().to_string().yellow(), describe(target));
                    }
                }
            }
            Ok(())
        }
    }
}

/// Build a channel target, checking the address fits the channel type.
pub fn parse_target(kind: ChannelKindArg, target: String) -> Result<ChannelTarget> {
    if kind == ChannelKindArg::Email {
        if !target.contains('@') {
            bail!("Not an email address: {target}");
        }
        return Ok(ChannelTarget::Email { to: target });
    }

    let url = url::Url::parse(&target)?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Webhook URL must be http or https: {target}");
    }
    Ok(match kind {
        ChannelKindArg::Slack => ChannelTarget::Slack { webhook_url: target },
        ChannelKindArg::Teams => ChannelTarget::Teams { webhook_url: target },
        _ => ChannelTarget::Webhook { url: target },
    })
}

fn describe(target: &ChannelTarget) -> &str {
    match target {
        ChannelTarget::Email { to } => to,
        ChannelTarget::Slack { webhook_url } | ChannelTarget::Teams { webhook_url } => webhook_url,
        ChannelTarget::Webhook { url } => url,
    }
}
