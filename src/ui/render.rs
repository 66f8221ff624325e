use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};
use std::collections::BTreeMap;

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;
use super::util::format_amount;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    render_screen(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area(), app.screen);
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let num = format!("{}", i + 1);
            if *s == app.screen {
                Line::from(vec![
                    Span::styled(format!("{num}:"), Style::default().fg(theme::TEXT_DIM)),
                    Span::styled(
                        format!("{s}"),
                        Style::default()
                            .fg(theme::ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(Span::styled(
                    format!("{num}:{s}"),
                    Style::default().fg(theme::TEXT_DIM),
                ))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

fn render_screen(f: &mut Frame, area: Rect, app: &App) {
    match app.screen {
        Screen::Subscriptions => super::screens::subscriptions::render(f, area, app),
        Screen::Calendar => super::screens::calendar::render(f, area, app),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
        InputMode::Command => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::GREEN)
            .add_modifier(Modifier::BOLD),
        InputMode::Editing => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::GREEN)
            .add_modifier(Modifier::BOLD),
        InputMode::Confirm => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::RED)
            .add_modifier(Modifier::BOLD),
    };

    let info = format!(
        " {} | {}-{:02} | {} subs | {}/mo",
        app.screen,
        app.calendar_year,
        app.calendar_month,
        app.subscriptions.len(),
        format_amount(app.summary.monthly_total)
    );

    let right = match app.screen {
        Screen::Subscriptions => " x cancel | c color | e rename | D delete | ? help ",
        Screen::Calendar => " H/L month | x cancel | c color | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.len() + info.len() + right.len();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.len() as u16),
        ),
        InputMode::Editing => (
            Line::from(vec![
                Span::styled("name> ", Style::default().fg(theme::GREEN)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(6 + app.command_input.len() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

/// Key bindings in the help popup, grouped by what they act on.
const KEY_HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Moving around",
        &[
            ("j/k, Up/Down", "Select next/previous subscription"),
            ("g/G", "First/last subscription"),
            ("Ctrl-d/u", "Half a page down/up"),
            ("1, 2, Tab", "Subscriptions or Calendar"),
            ("Ctrl-q", "Quit"),
        ],
    ),
    (
        "Selected subscription",
        &[
            ("e", "Rename"),
            ("x", "Cancel or resume"),
            ("c/C", "Next/previous bar color"),
            ("D", "Delete (asks first)"),
        ],
    ),
    (
        "Calendar",
        &[("H/L", "Previous/next month"), ("t", "Back to this month")],
    ),
    (
        "Anywhere",
        &[
            ("a", "Add a subscription"),
            (":", "Command line"),
            ("Esc", "Clear the status line"),
        ],
    ),
];

/// One row per command, its aliases joined: `(":list :l", "Go to Subscriptions")`.
fn command_rows() -> Vec<(String, &'static str)> {
    let mut by_description: BTreeMap<&'static str, Vec<&str>> = BTreeMap::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        by_description.entry(cmd.description).or_default().push(name);
    }
    let mut rows: Vec<(String, &'static str)> = by_description
        .into_iter()
        .map(|(description, mut names)| {
            names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
            let joined: Vec<String> = names.iter().map(|n| format!(":{n}")).collect();
            (joined.join(" "), description)
        })
        .collect();
    rows.sort();
    rows
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {text}"),
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_help_overlay(f: &mut Frame, area: Rect, screen: Screen) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" SubTrack help ({screen}) "),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (section, keys) in KEY_HELP {
        // Calendar keys only matter on the calendar screen.
        if *section == "Calendar" && screen != Screen::Calendar {
            continue;
        }
        lines.push(heading(section));
        for (key, action) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<14}"), Style::default().fg(theme::ACCENT)),
                Span::styled(*action, theme::normal_style()),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(heading("Commands"));
    for (names, description) in command_rows() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {names:<24}"), Style::default().fg(theme::GREEN)),
            Span::styled(description, theme::normal_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Any key closes this ",
        theme::dim_style(),
    )));

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let width = 76.min(area.width.saturating_sub(4));
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    f.render_widget(Clear, popup);
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_rows_list_every_command_once() {
        let rows = command_rows();
        for name in commands::COMMANDS.keys() {
            let alias = format!(":{name}");
            let hits = rows
                .iter()
                .filter(|(names, _)| names.split(' ').any(|n| n == alias))
                .count();
            assert_eq!(hits, 1, "{alias} appears {hits} times");
        }
    }

    #[test]
    fn test_command_rows_put_long_name_first() {
        let rows = command_rows();
        let list = rows
            .iter()
            .find(|(_, description)| *description == "Go to Subscriptions");
        assert_eq!(list.map(|(names, _)| names.as_str()), Some(":list :l"));
    }
}
