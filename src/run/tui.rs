use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::store::Store;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;

pub(crate) fn as_tui(store: &mut Store, config: &Config) -> Result<()> {
    let mut app = App::new(super::today(), config.horizon_years);
    app.refresh(store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    log::info!("tui started with {} subscriptions", store.len());
    let result = run_app(&mut terminal, &mut app, store);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("tui stopped: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &mut Store,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, store)?,
                InputMode::Command => handle_command_input(key, app, store)?,
                InputMode::Editing => handle_editing_input(key, app, store)?,
                InputMode::Confirm => handle_confirm_input(key, app, store)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, store: &mut Store) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.page() / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.page() / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, store, Screen::Subscriptions),
        KeyCode::Char('2') => switch_screen(app, store, Screen::Calendar),
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, store, screens[next]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, store, screens[prev]);
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('a') => {
            app.input_mode = InputMode::Command;
            app.command_input = "add ".into();
        }
        KeyCode::Char('e') => {
            if let Some(name) = app.selected().map(|s| s.name.clone()) {
                app.command_input = name;
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('x') => {
            if let Some(id) = app.selected().map(|s| s.id) {
                commands::toggle_cancelled(app, store, id)?;
            }
        }
        KeyCode::Char('c') => cycle_color(app, store, 1)?,
        KeyCode::Char('C') => cycle_color(app, store, -1)?,
        KeyCode::Char('D') => commands::handle_command("delete", app, store)?,
        KeyCode::Char('H') => commands::handle_command("prev-month", app, store)?,
        KeyCode::Char('L') => commands::handle_command("next-month", app, store)?,
        KeyCode::Char('t') => commands::handle_command("month", app, store)?,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn cycle_color(app: &mut App, store: &mut Store, step: i32) -> Result<()> {
    let Some((id, color)) = app.selected().map(|s| (s.id, s.color.cycled(step))) else {
        return Ok(());
    };
    let result = store.set_color(id, color);
    if app.report(store, result)?.is_some() {
        app.set_status(format!("Color: {}", color.name()));
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, store: &mut Store) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, store)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

/// Inline rename of the selected subscription.
fn handle_editing_input(key: event::KeyEvent, app: &mut App, store: &mut Store) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let new_name = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::handle_command(&format!("name {new_name}"), app, store)?;
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, store: &mut Store) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteSubscription { id, name } => {
                        let result = store.delete(id);
                        if app.report(store, result)? == Some(true) {
                            app.set_status(format!("Deleted: {name}"));
                        }
                    }
                    PendingAction::ReplaceFromFile { path } => match std::fs::read(&path) {
                        Ok(bytes) => {
                            let result = store.import_snapshot(&bytes);
                            if let Some(count) = app.report(store, result)? {
                                app.cursor.top();
                                app.set_status(format!(
                                    "Imported {count} subscriptions from {}",
                                    path.display()
                                ));
                            }
                        }
                        Err(e) => app.set_status(format!("Could not read {}: {e}", path.display())),
                    },
                }
            }
            app.confirm_message.clear();
            app.input_mode = InputMode::Normal;
        }
        _ => {
            app.pending_action = None;
            app.confirm_message.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Cancelled");
        }
    }
    Ok(())
}

// ── Navigation ───────────────────────────────────────────────

fn switch_screen(app: &mut App, store: &Store, screen: Screen) {
    app.screen = screen;
    app.refresh(store);
    app.set_status(format!("{screen}"));
}

fn handle_move_down(app: &mut App) {
    let page = app.page();
    app.cursor.down(app.subscriptions.len(), page);
}

fn handle_move_up(app: &mut App) {
    app.cursor.up();
}

fn handle_goto_top(app: &mut App) {
    app.cursor.top();
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.page();
    app.cursor.bottom(app.subscriptions.len(), page);
}
