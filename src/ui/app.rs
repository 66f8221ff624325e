use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::StoreError;
use crate::models::*;
use crate::recurrence;
use crate::store::Store;
use crate::summary::Summary;

use super::util::ListCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Subscriptions,
    Calendar,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Subscriptions, Self::Calendar]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subscriptions => write!(f, "Subscriptions"),
            Self::Calendar => write!(f, "Calendar"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteSubscription { id: SubscriptionId, name: String },
    ReplaceFromFile { path: PathBuf },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) today: NaiveDate,
    pub(crate) horizon: NaiveDate,

    // Subscriptions
    pub(crate) subscriptions: Vec<Subscription>,
    pub(crate) summary: Summary,
    pub(crate) cursor: ListCursor,

    // Calendar
    pub(crate) periods: Vec<BillingPeriod>,
    pub(crate) calendar_year: i32,
    pub(crate) calendar_month: u32,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(today: NaiveDate, horizon_years: u32) -> Self {
        let (calendar_year, calendar_month) = recurrence::year_month(today);

        Self {
            running: true,
            screen: Screen::Subscriptions,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            today,
            horizon: recurrence::horizon_from(today, horizon_years),

            subscriptions: Vec::new(),
            summary: Summary::of(&[]),
            cursor: ListCursor::default(),

            periods: Vec::new(),
            calendar_year,
            calendar_month,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Re-read the store and recompute everything derived from it.
    pub(crate) fn refresh(&mut self, store: &Store) {
        self.subscriptions = store.subscriptions().to_vec();
        self.summary = Summary::of(&self.subscriptions);
        self.periods = recurrence::expand_all(&self.subscriptions, self.calendar_horizon());
        self.cursor.clamp(self.subscriptions.len());
    }

    /// Periods are expanded far enough to cover the displayed month even when
    /// it lies past the configured horizon.
    fn calendar_horizon(&self) -> NaiveDate {
        let shown_end = recurrence::month_bounds(self.calendar_year, self.calendar_month)
            .map(|(_, next)| next)
            .unwrap_or(self.horizon);
        self.horizon.max(shown_end)
    }

    /// Rows of the current list that fit on screen.
    pub(crate) fn page(&self) -> usize {
        let chrome = match self.screen {
            // summary cards, table borders and header
            Screen::Subscriptions => 8,
            // strip borders, day header and the renewal list
            Screen::Calendar => 13,
        };
        self.visible_rows.saturating_sub(chrome).max(1)
    }

    pub(crate) fn selected(&self) -> Option<&Subscription> {
        self.subscriptions.get(self.cursor.index)
    }

    pub(crate) fn set_month(&mut self, store: &Store, year: i32, month: u32) {
        self.calendar_year = year;
        self.calendar_month = month;
        self.refresh(store);
    }

    pub(crate) fn shift_month(&mut self, store: &Store, delta: i32) {
        let (year, month) = recurrence::shift_month(self.calendar_year, self.calendar_month, delta);
        self.set_month(store, year, month);
    }

    /// Apply the outcome of a store operation. Input problems and unknown ids
    /// end up in the status line; storage failures are returned.
    pub(crate) fn report<T>(
        &mut self,
        store: &Store,
        result: Result<T, StoreError>,
    ) -> anyhow::Result<Option<T>> {
        match result {
            Ok(value) => {
                self.refresh(store);
                Ok(Some(value))
            }
            Err(e) if e.is_user_error() => {
                self.set_status(e.to_string());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
