use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::models::{Cycle, PaletteColor, SubscriptionId};
use crate::store::{Store, SubscriptionPatch};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Store) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SubTrack", cmd_quit, r);
    register_command!("quit", "Quit SubTrack", cmd_quit, r);
    register_command!("l", "Go to Subscriptions", cmd_list, r);
    register_command!("list", "Go to Subscriptions", cmd_list, r);
    register_command!("cal", "Go to Calendar", cmd_calendar, r);
    register_command!("calendar", "Go to Calendar", cmd_calendar, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "add",
        "Add subscription (e.g. :add Netflix 15.49 2024-01-15 monthly)",
        cmd_add,
        r
    );
    register_command!("a", "Add subscription", cmd_add, r);
    register_command!("name", "Rename selected (e.g. :name Disney+)", cmd_name, r);
    register_command!("price", "Set price of selected (e.g. :price 9.99)", cmd_price, r);
    register_command!(
        "start",
        "Set start date of selected (e.g. :start 2024-03-01)",
        cmd_start,
        r
    );
    register_command!("cycle", "Set billing cycle (monthly|yearly)", cmd_cycle, r);
    register_command!(
        "color",
        "Set color of selected (e.g. :color teal or :color #3B82F6)",
        cmd_color,
        r
    );
    register_command!("cancel", "Toggle cancelled on selected", cmd_cancel, r);
    register_command!("delete", "Delete selected subscription", cmd_delete, r);
    register_command!(
        "export",
        "Export to JSON (e.g. :export ~/backups)",
        cmd_export,
        r
    );
    register_command!(
        "import",
        "Replace all from JSON (e.g. :import ~/subs.json)",
        cmd_import,
        r
    );
    register_command!("month", "Show month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Show month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, store)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _store: &mut Store) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_list(_args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    app.screen = Screen::Subscriptions;
    app.refresh(store);
    Ok(())
}

fn cmd_calendar(_args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    app.screen = Screen::Calendar;
    app.refresh(store);
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _store: &mut Store) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let words: Vec<String> = args.split_whitespace().map(str::to_string).collect();
    let Ok(draft) = crate::run::parse_add_args(&words, app.today) else {
        app.set_status("Usage: :add <name> <price> [YYYY-MM-DD] [monthly|yearly]");
        return Ok(());
    };

    let result = store.add(&draft);
    if let Some(sub) = app.report(store, result)? {
        if let Some(pos) = app.subscriptions.iter().position(|s| s.id == sub.id) {
            let page = app.page();
            app.cursor.select(pos, page);
        }
        app.set_status(format!("Added {} ({})", sub.title(), sub.color.name()));
    }
    Ok(())
}

/// The subscription the command applies to, or a status hint when the list
/// is empty.
fn selected_id(app: &mut App) -> Option<SubscriptionId> {
    let id = app.selected().map(|s| s.id);
    if id.is_none() {
        app.set_status("No subscription selected. Add one with :add");
    }
    id
}

fn update_selected(
    app: &mut App,
    store: &mut Store,
    patch: SubscriptionPatch,
    usage: &str,
) -> anyhow::Result<()> {
    if patch.is_empty() {
        app.set_status(usage);
        return Ok(());
    }
    let Some(id) = selected_id(app) else {
        return Ok(());
    };
    let result = store.update(id, &patch);
    if let Some(sub) = app.report(store, result)? {
        app.set_status(format!("Updated {}", sub.title()));
    }
    Ok(())
}

/// `None` for an empty argument so the patch stays empty and usage is shown.
fn arg(args: &str) -> Option<String> {
    (!args.is_empty()).then(|| args.to_string())
}

fn cmd_name(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let patch = SubscriptionPatch {
        name: arg(args),
        ..Default::default()
    };
    update_selected(app, store, patch, "Usage: :name <new name>")
}

fn cmd_price(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let patch = SubscriptionPatch {
        price: arg(args),
        ..Default::default()
    };
    update_selected(app, store, patch, "Usage: :price <amount>")
}

fn cmd_start(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let patch = SubscriptionPatch {
        start_date: arg(args),
        ..Default::default()
    };
    update_selected(app, store, patch, "Usage: :start YYYY-MM-DD")
}

fn cmd_cycle(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let patch = SubscriptionPatch {
        cycle: arg(args),
        ..Default::default()
    };
    let cycles: Vec<&str> = Cycle::all().iter().map(Cycle::as_str).collect();
    update_selected(
        app,
        store,
        patch,
        &format!("Usage: :cycle {}", cycles.join("|")),
    )
}

fn cmd_color(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    if args.is_empty() {
        let names: Vec<&str> = PaletteColor::all().iter().map(|c| c.name()).collect();
        app.set_status(format!("Usage: :color <color>. Colors: {}", names.join(", ")));
        return Ok(());
    }
    let Some(id) = selected_id(app) else {
        return Ok(());
    };
    let result = store.recolor(id, args);
    if app.report(store, result)?.is_some() {
        app.set_status(format!("Color set to {args}"));
    }
    Ok(())
}

fn cmd_cancel(_args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let Some(id) = selected_id(app) else {
        return Ok(());
    };
    toggle_cancelled(app, store, id)
}

pub(crate) fn toggle_cancelled(
    app: &mut App,
    store: &mut Store,
    id: SubscriptionId,
) -> anyhow::Result<()> {
    let result = store.toggle_cancelled(id);
    if app.report(store, result)? == Some(true) {
        if let Some(sub) = store.get(id) {
            let state = if sub.cancelled { "cancelled" } else { "active" };
            app.set_status(format!("{} is now {state}", sub.name));
        }
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _store: &mut Store) -> anyhow::Result<()> {
    let Some((id, name)) = app.selected().map(|s| (s.id, s.name.clone())) else {
        app.set_status("No subscription selected");
        return Ok(());
    };
    app.confirm_message = format!("Delete '{name}'?");
    app.pending_action = Some(PendingAction::DeleteSubscription { id, name });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    let target = crate::run::resolve_export_target((!args.is_empty()).then_some(args));
    match store.export_to_file(&target, app.today) {
        Ok(path) => app.set_status(format!(
            "Exported {} subscriptions to {}",
            store.len(),
            path.display()
        )),
        Err(e) => app.set_status(format!("Export failed: {e:#}")),
    }
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, _store: &mut Store) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.json>");
        return Ok(());
    }
    let path = PathBuf::from(crate::run::shellexpand(args));
    if !path.is_file() {
        app.set_status(format!("File not found: {args}"));
        return Ok(());
    }
    app.confirm_message = format!(
        "Replace all {} subscriptions with {}?",
        app.subscriptions.len(),
        path.display()
    );
    app.pending_action = Some(PendingAction::ReplaceFromFile { path });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    if args.is_empty() {
        let (year, month) = crate::recurrence::year_month(app.today);
        app.set_month(store, year, month);
        app.set_status("Showing current month");
        return Ok(());
    }

    // Accept formats like "2024-01", "2024-1", "01", "1"
    let month = if args.len() <= 2 {
        format!("{}-{args:0>2}", app.calendar_year)
    } else {
        args.to_string()
    };

    match chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d") {
        Ok(first) => {
            let (year, month) = crate::recurrence::year_month(first);
            app.set_month(store, year, month);
            app.screen = Screen::Calendar;
            app.set_status(format!("Switched to month: {}", first.format("%Y-%m")));
        }
        Err(_) => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)"),
    }

    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    app.shift_month(store, 1);
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, store: &mut Store) -> anyhow::Result<()> {
    app.shift_month(store, -1);
    Ok(())
}
