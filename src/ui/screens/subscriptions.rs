use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::recurrence;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(5),    // Subscription table
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    render_table(f, chunks[1], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let summary = &app.summary;
    render_card(
        f,
        cards[0],
        "Monthly",
        format_amount(summary.monthly_total),
        theme::total_style(),
    );
    render_card(
        f,
        cards[1],
        "Yearly",
        format_amount(summary.yearly_total),
        Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD),
    );
    render_card(
        f,
        cards[2],
        "Subscriptions",
        format!("{} active / {} cancelled", summary.active, summary.cancelled),
        theme::normal_style().add_modifier(Modifier::BOLD),
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, style: Style) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    let text = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(value, style))])
        .centered()
        .block(block);

    f.render_widget(text, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    if app.subscriptions.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No subscriptions yet.",
                theme::dim_style().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Add one with :add <name> <price> [YYYY-MM-DD] [monthly|yearly]",
                theme::dim_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                " Subscriptions (0) ",
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            ));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["", "Name", "Price", "Cycle", "Per month", "Start", "Renews"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .subscriptions
        .iter()
        .enumerate()
        .skip(app.cursor.scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, sub)| {
            let bar = sub.bar_style();
            let is_cursor = i == app.cursor.index;

            let renews = if sub.cancelled {
                "cancelled".to_string()
            } else {
                recurrence::next_renewal(sub, app.today)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into())
            };

            let style = if is_cursor {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let label = if is_cursor {
                style
            } else {
                theme::label_style(bar)
            };

            Row::new(vec![
                Cell::from(Span::styled("●", theme::bar_style(bar))),
                Cell::from(Span::styled(truncate(&sub.name, 32), label)),
                Cell::from(Span::styled(format_amount(sub.price), label)),
                Cell::from(sub.cycle.as_str()),
                Cell::from(format_amount(sub.monthly_price())),
                Cell::from(sub.start_date.to_string()),
                Cell::from(renews),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(
                    " Subscriptions ({}) | total {} / month ",
                    app.subscriptions.len(),
                    format_amount(app.summary.monthly_total)
                ),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}
