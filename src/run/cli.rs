use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::config::Config;
use crate::models::{parse_start_date, BillingPeriod, Cycle, SubscriptionId};
use crate::recurrence;
use crate::store::{Store, SubscriptionDraft, SubscriptionPatch};
use crate::summary::Summary;
use crate::ui::util::{format_amount, truncate};

use super::{resolve_export_target, shellexpand};

pub(crate) fn as_cli(args: &[String], store: &mut Store, config: &Config) -> Result<()> {
    match args[1].as_str() {
        "list" | "ls" => cli_list(store),
        "add" => cli_add(&args[2..], store),
        "edit" => cli_edit(&args[2..], store),
        "delete" | "rm" => cli_delete(&args[2..], store),
        "cancel" => cli_cancel(&args[2..], store),
        "color" => cli_color(&args[2..], store),
        "total" | "t" => cli_total(store),
        "calendar" | "cal" => cli_calendar(&args[2..], store, config),
        "export" => cli_export(&args[2..], store),
        "import" => cli_import(&args[2..], store),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("subtrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SubTrack - local-only subscription expense tracker");
    println!();
    println!("Usage: subtrack [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                 Launch interactive TUI");
    println!("  list                                   List subscriptions");
    println!("  add <name> <price> [YYYY-MM-DD] [cycle] Add a subscription (cycle: monthly|yearly)");
    println!("  edit <id> [--name N] [--price P] [--start D] [--cycle C]");
    println!("                                         Change fields of a subscription");
    println!("  delete <id>                            Delete a subscription");
    println!("  cancel <id>                            Toggle the cancelled flag");
    println!("  color <id> <color>                     Set color (name or hex from the palette)");
    println!("  total                                  Print monthly and yearly totals");
    println!("  calendar [--until YYYY-MM-DD]          List upcoming billing periods");
    println!("  export [path]                          Export to subscriptions-<date>.json");
    println!("  import <file.json>                     Replace all subscriptions from a file");
    println!("  --help, -h                             Show this help");
    println!("  --version, -V                          Show version");
}

fn cli_list(store: &Store) -> Result<()> {
    if store.is_empty() {
        println!("No subscriptions");
        return Ok(());
    }

    let today = super::today();
    println!(
        "{:<15} {:<24} {:>10} {:<8} {:<11} {:<8} {:<11} Status",
        "ID", "Name", "Price", "Cycle", "Start", "Color", "Renews"
    );
    println!("{}", "─".repeat(100));
    for sub in store.subscriptions() {
        let renews = recurrence::next_renewal(sub, today)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<15} {:<24} {:>10} {:<8} {:<11} {:<8} {:<11} {}",
            sub.id,
            truncate(&sub.name, 24),
            format_amount(sub.price),
            sub.cycle,
            sub.start_date.to_string(),
            sub.color.name(),
            renews,
            if sub.cancelled { "cancelled" } else { "active" },
        );
    }
    Ok(())
}

fn cli_add(args: &[String], store: &mut Store) -> Result<()> {
    let draft = parse_add_args(args, super::today())?;
    let sub = store.add(&draft)?;
    println!(
        "Added {} ({} {}, color {}) with id {}",
        sub.name,
        format_amount(sub.price),
        sub.cycle,
        sub.color.name(),
        sub.id
    );
    Ok(())
}

fn cli_edit(args: &[String], store: &mut Store) -> Result<()> {
    let (id, patch) = parse_edit_args(args)?;
    let sub = store.update(id, &patch)?;
    println!(
        "Updated {}: {} {} from {}",
        sub.id,
        sub.name,
        format_amount(sub.price),
        sub.start_date
    );
    Ok(())
}

fn cli_delete(args: &[String], store: &mut Store) -> Result<()> {
    let id = parse_id(args.first(), "Usage: subtrack delete <id>")?;
    if store.delete(id)? {
        println!("Deleted {id}");
    } else {
        println!("No subscription with id {id}");
    }
    Ok(())
}

fn cli_cancel(args: &[String], store: &mut Store) -> Result<()> {
    let id = parse_id(args.first(), "Usage: subtrack cancel <id>")?;
    if store.toggle_cancelled(id)? {
        let cancelled = store.get(id).is_some_and(|s| s.cancelled);
        println!(
            "{id} is now {}",
            if cancelled { "cancelled" } else { "active" }
        );
    } else {
        println!("No subscription with id {id}");
    }
    Ok(())
}

fn cli_color(args: &[String], store: &mut Store) -> Result<()> {
    let id = parse_id(args.first(), "Usage: subtrack color <id> <color>")?;
    let Some(color) = args.get(1) else {
        let names: Vec<&str> = crate::models::PaletteColor::all()
            .iter()
            .map(|c| c.name())
            .collect();
        anyhow::bail!(
            "Usage: subtrack color <id> <color>. Colors: {}",
            names.join(", ")
        );
    };
    if store.recolor(id, color)? {
        println!("Recolored {id}");
    } else {
        println!("No subscription with id {id}");
    }
    Ok(())
}

fn cli_total(store: &Store) -> Result<()> {
    let summary = Summary::of(store.subscriptions());
    println!("SubTrack - totals");
    println!("{}", "─".repeat(40));
    println!("  Active:     {}", summary.active);
    println!("  Cancelled:  {}", summary.cancelled);
    println!("  Monthly:    {}", format_amount(summary.monthly_total));
    println!("  Yearly:     {}", format_amount(summary.yearly_total));
    Ok(())
}

fn cli_calendar(args: &[String], store: &Store, config: &Config) -> Result<()> {
    let horizon = match flag_value(args, "--until") {
        Some(raw) => parse_start_date(raw)?,
        None => recurrence::horizon_from(super::today(), config.horizon_years),
    };

    let mut rows: Vec<(BillingPeriod, String, bool)> = Vec::new();
    for sub in store.subscriptions() {
        for period in recurrence::expand(sub, horizon) {
            rows.push((period, sub.title(), sub.cancelled));
        }
    }
    if rows.is_empty() {
        println!("No billing periods before {horizon}");
        return Ok(());
    }
    rows.sort_by_key(|(period, ..)| period.start);

    println!("Billing periods until {horizon}");
    println!("{}", "─".repeat(60));
    for (period, title, cancelled) in &rows {
        let mark = if *cancelled { " (cancelled)" } else { "" };
        println!(
            "  {} → {}  {:>3}d  {title}{mark}",
            period.start,
            period.end,
            period.len_days()
        );
    }
    Ok(())
}

fn cli_export(args: &[String], store: &Store) -> Result<()> {
    let target = resolve_export_target(args.first().map(String::as_str));
    let path = store.export_to_file(&target, super::today())?;
    println!("Exported {} subscriptions to {}", store.len(), path.display());
    Ok(())
}

fn cli_import(args: &[String], store: &mut Store) -> Result<()> {
    let Some(file) = args.first() else {
        anyhow::bail!("Usage: subtrack import <file.json>");
    };
    let path = PathBuf::from(shellexpand(file));
    if !path.exists() {
        anyhow::bail!("File not found: {file}");
    }
    let count = store.import_from_file(&path)?;
    println!("Imported {count} subscriptions (previous list replaced)");
    Ok(())
}

// ── Argument parsing ─────────────────────────────────────────

/// `<name…> <price> [YYYY-MM-DD] [monthly|yearly]`, read from the end so the
/// name may contain spaces.
pub(crate) fn parse_add_args(args: &[String], today: NaiveDate) -> Result<SubscriptionDraft> {
    const USAGE: &str = "Usage: subtrack add <name> <price> [YYYY-MM-DD] [monthly|yearly]";
    let mut rest: Vec<&str> = args.iter().map(String::as_str).collect();

    let mut cycle = Cycle::Monthly.as_str().to_string();
    if rest.len() > 2 {
        if let Some(last) = rest.last() {
            if let Ok(c) = Cycle::parse(last) {
                cycle = c.as_str().to_string();
                rest.pop();
            }
        }
    }

    let mut start_date = today.format("%Y-%m-%d").to_string();
    if rest.len() > 2 {
        if let Some(last) = rest.last() {
            if parse_start_date(last).is_ok() {
                start_date = last.to_string();
                rest.pop();
            }
        }
    }

    let Some(price) = rest.pop() else {
        anyhow::bail!(USAGE);
    };
    if rest.is_empty() {
        anyhow::bail!(USAGE);
    }

    Ok(SubscriptionDraft {
        name: rest.join(" "),
        price: price.to_string(),
        start_date,
        cycle,
    })
}

pub(crate) fn parse_edit_args(args: &[String]) -> Result<(SubscriptionId, SubscriptionPatch)> {
    const USAGE: &str =
        "Usage: subtrack edit <id> [--name N] [--price P] [--start YYYY-MM-DD] [--cycle C]";
    let id = parse_id(args.first(), USAGE)?;
    let rest = args.get(1..).unwrap_or_default();
    let patch = SubscriptionPatch {
        name: flag_value(rest, "--name").map(str::to_string),
        price: flag_value(rest, "--price").map(str::to_string),
        start_date: flag_value(rest, "--start").map(str::to_string),
        cycle: flag_value(rest, "--cycle").map(str::to_string),
    };
    if patch.is_empty() {
        anyhow::bail!(USAGE);
    }
    Ok((id, patch))
}

fn parse_id(arg: Option<&String>, usage: &str) -> Result<SubscriptionId> {
    let Some(raw) = arg else {
        anyhow::bail!("{usage}");
    };
    raw.parse()
        .with_context(|| format!("Invalid subscription id: {raw}"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
