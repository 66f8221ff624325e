use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::{BillingPeriod, Subscription};
use crate::recurrence;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::truncate;

const NAME_WIDTH: usize = 22;

/// What a single day cell of a subscription row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayMark {
    Empty,
    Covered,
    Renewal,
}

impl DayMark {
    fn symbol(self) -> &'static str {
        match self {
            Self::Empty => " ·",
            Self::Covered => "━━",
            Self::Renewal => "┣━",
        }
    }
}

/// One mark per day of the month for the periods of a single subscription.
pub(crate) fn day_marks(periods: &[BillingPeriod], year: i32, month: u32) -> Vec<DayMark> {
    let in_month = recurrence::periods_in_month(periods, year, month);
    (1..=recurrence::days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .map(|date| {
            if recurrence::renews_on(&in_month, date) {
                DayMark::Renewal
            } else if in_month.iter().any(|p| p.contains(date)) {
                DayMark::Covered
            } else {
                DayMark::Empty
            }
        })
        .collect()
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let renewals = month_renewals(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5), // Day strips
            Constraint::Length(renewals.len().clamp(1, 8) as u16 + 2), // Renewal list
        ])
        .split(area);

    render_strips(f, chunks[0], app);
    render_renewals(f, chunks[1], &renewals);
}

fn month_title(app: &App) -> String {
    NaiveDate::from_ymd_opt(app.calendar_year, app.calendar_month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", app.calendar_year, app.calendar_month))
}

fn render_strips(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} | H/L month | :month YYYY-MM ", month_title(app)),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));

    if app.subscriptions.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("Nothing to show yet.", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Add a subscription with :add to see its billing periods",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let mut lines = vec![day_header(app)];
    let page = area.height.saturating_sub(3) as usize;
    for (i, sub) in app
        .subscriptions
        .iter()
        .enumerate()
        .skip(app.cursor.scroll)
        .take(page)
    {
        lines.push(strip_line(app, sub, i == app.cursor.index));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn day_header(app: &App) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " ".repeat(NAME_WIDTH),
        theme::header_style(),
    )];
    for day in 1..=recurrence::days_in_month(app.calendar_year, app.calendar_month) {
        let is_today = NaiveDate::from_ymd_opt(app.calendar_year, app.calendar_month, day)
            == Some(app.today);
        let style = if is_today {
            theme::selected_style()
        } else if day % 2 == 0 {
            theme::header_style()
        } else {
            theme::header_style().fg(theme::TEXT_DIM)
        };
        spans.push(Span::styled(format!("{day:>2}"), style));
    }
    Line::from(spans)
}

fn strip_line<'a>(app: &App, sub: &'a Subscription, is_cursor: bool) -> Line<'a> {
    let bar = sub.bar_style();
    let label = format!(
        "{:<width$}",
        truncate(&sub.name, NAME_WIDTH - 1),
        width = NAME_WIDTH
    );
    let label_style = if is_cursor {
        theme::selected_style()
    } else {
        theme::label_style(bar)
    };

    let own: Vec<BillingPeriod> = app
        .periods
        .iter()
        .filter(|p| p.subscription_id == sub.id)
        .copied()
        .collect();

    let mut spans = vec![Span::styled(label, label_style)];
    for mark in day_marks(&own, app.calendar_year, app.calendar_month) {
        let style = match mark {
            DayMark::Empty => theme::dim_style(),
            DayMark::Covered => theme::bar_style(bar),
            DayMark::Renewal => theme::bar_style(bar).add_modifier(Modifier::BOLD),
        };
        spans.push(Span::styled(mark.symbol(), style));
    }
    Line::from(spans)
}

/// Renewal dates falling in the displayed month, earliest first.
fn month_renewals(app: &App) -> Vec<(NaiveDate, &Subscription)> {
    let mut renewals: Vec<(NaiveDate, &Subscription)> =
        recurrence::periods_in_month(&app.periods, app.calendar_year, app.calendar_month)
            .iter()
            .filter(|p| recurrence::year_month(p.start) == (app.calendar_year, app.calendar_month))
            .filter_map(|p| {
                app.subscriptions
                    .iter()
                    .find(|s| s.id == p.subscription_id)
                    .map(|s| (p.start, s))
            })
            .collect();
    renewals.sort_by_key(|(date, _)| *date);
    renewals
}

fn render_renewals(f: &mut Frame, area: Rect, renewals: &[(NaiveDate, &Subscription)]) {
    let lines: Vec<Line> = if renewals.is_empty() {
        vec![Line::from(Span::styled(
            " No renewals this month",
            theme::dim_style(),
        ))]
    } else {
        renewals
            .iter()
            .map(|(date, sub)| {
                let bar = sub.bar_style();
                Line::from(vec![
                    Span::styled(format!(" {} ", date.format("%b %d")), theme::dim_style()),
                    Span::styled("● ", theme::bar_style(bar)),
                    Span::styled(sub.title(), theme::label_style(bar)),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" Renewals ({}) ", renewals.len()),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
