use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{FixedOffset, NaiveDate};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::KeyAction;
use crate::model::member::MemberDirectory;
use crate::providers::Provider;
use crate::report::category::ListCategories;
use crate::report::daily::{day_shift_report, ShiftSummary};
use crate::report::interval::{day_bounds, fetch_actions_between, ActionWindow, FetchOptions};
use crate::report::shift::{ShiftTable, ShiftView};

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    ReportLoaded {
        generation: u64,
        result: Result<ActionWindow, String>,
    },
    Tick,
    Quit,
}

const FLASH_TTL: Duration = Duration::from_secs(3);

/// Everything a background fetch needs, shared with spawned tasks.
#[derive(Clone)]
pub struct ReportSource {
    pub provider: Arc<dyn Provider>,
    pub board_id: String,
    pub offset: FixedOffset,
    pub fetch: FetchOptions,
}

pub struct App {
    pub date: NaiveDate,
    pub view: ShiftView,
    pub table: ShiftTable,
    pub rows: Vec<ShiftSummary>,
    pub selected_row: usize,
    pub loading: bool,
    pub truncated: bool,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    generation: u64,
    source: ReportSource,
    directory: MemberDirectory,
    categories: ListCategories,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        source: ReportSource,
        table: ShiftTable,
        view: ShiftView,
        date: NaiveDate,
        directory: MemberDirectory,
        categories: ListCategories,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            date,
            view,
            table,
            rows: Vec::new(),
            selected_row: 0,
            loading: false,
            truncated: false,
            flash_message: None,
            should_quit: false,
            generation: 0,
            source,
            directory,
            categories,
            action_tx,
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn update(&mut self, action: Action) {
        self.expire_flash();

        match action {
            Action::Key(key) => self.handle_key(key),
            Action::ReportLoaded { generation, result } => {
                self.apply_loaded(generation, result)
            }
            // Expiry above is all a tick does
            Action::Tick => {}
            Action::Quit => self.should_quit = true,
        }
    }

    fn expire_flash(&mut self) {
        if let Some((_, shown_at)) = &self.flash_message {
            if shown_at.elapsed() >= FLASH_TTL {
                self.flash_message = None;
            }
        }
    }

    fn handle_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyAction::Down => {
                if self.selected_row + 1 < self.rows.len() {
                    self.selected_row += 1;
                }
            }
            KeyAction::PrevDay => {
                if let Some(date) = self.date.pred_opt() {
                    self.date = date;
                    self.reload();
                }
            }
            KeyAction::NextDay => {
                if let Some(date) = self.date.succ_opt() {
                    self.date = date;
                    self.reload();
                }
            }
            KeyAction::ToggleView => {
                self.view = self.view.toggle();
                self.table = ShiftTable::builtin(self.view);
                self.reload();
            }
            KeyAction::Refresh => {
                self.reload();
            }
        }
    }

    /// Starts a fetch for the current day. Responses to earlier calls are
    /// ignored once this one is issued.
    pub fn reload(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;

        let generation = self.generation;
        let source = self.source.clone();
        let (since, before) = day_bounds(self.date, &source.offset);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = fetch_actions_between(
                source.provider.as_ref(),
                &source.board_id,
                since,
                before,
                &source.fetch,
            )
            .await
            .map_err(|e| e.to_string());
            let _ = tx.send(Action::ReportLoaded { generation, result });
        });
        generation
    }

    fn apply_loaded(&mut self, generation: u64, result: Result<ActionWindow, String>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale report");
            return;
        }
        self.loading = false;

        match result {
            Ok(window) => {
                let report = day_shift_report(&window.actions, &self.table, &self.source.offset);
                debug!(date = %self.date, actions = report.total(), "report loaded");
                self.rows = report.summarize_day(self.date, &self.directory, &self.categories);
                self.truncated = window.truncated;
                if window.truncated {
                    self.flash_message = Some((
                        "Upstream cap reached, some actions are missing".into(),
                        Instant::now(),
                    ));
                }
            }
            Err(msg) => {
                warn!(error = %msg, date = %self.date, "report fetch failed");
                self.rows = self.empty_rows();
                self.truncated = false;
                self.flash_message = Some((format!("Fetch error: {msg}"), Instant::now()));
            }
        }
        if self.selected_row >= self.rows.len() {
            self.selected_row = self.rows.len().saturating_sub(1);
        }
    }

    fn empty_rows(&self) -> Vec<ShiftSummary> {
        self.table
            .shifts()
            .iter()
            .map(|s| ShiftSummary::empty(self.date, s))
            .collect()
    }

    pub fn total_actions(&self) -> usize {
        self.rows.iter().map(|r| r.actions).sum()
    }
}
