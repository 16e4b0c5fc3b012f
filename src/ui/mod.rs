//! Egui-based UI for Talk Cleaner.
//!
//! This module defines the application state and the eframe App
//! implementation. User actions become background tasks (see `tasks`); the
//! state owns the handle of the single task that may run at a time.

pub mod dialogs;
pub mod list;
pub mod panels;
pub mod tasks;

use std::path::PathBuf;
use std::time::Duration;

use eframe::{egui, App};

use crate::config::AppConfig;
use crate::core::archive::ArchiveEntry;
use crate::types::{FileRecord, SearchResult, TaskProgress};

use dialogs::Dialog;
use list::SortState;
use tasks::ActiveTask;

/// Everything the window shows, plus the running task.
pub struct GuiState {
    pub config: AppConfig,
    pub root_dir: PathBuf,
    pub records: Vec<FileRecord>,

    // selection, parallel to `records`
    pub checked: Vec<bool>,
    pub hidden: Vec<bool>,

    // search
    pub search_input: String,
    pub search_term: Option<String>,
    pub search_results: Vec<SearchResult>,

    pub sort: Option<SortState>,
    pub active: Option<ActiveTask>,
    pub progress: Option<TaskProgress>,
    pub dialog: Option<Dialog>,

    // status log
    pub status_msgs: Vec<String>,
}

impl GuiState {
    pub fn new(config: AppConfig) -> Self {
        let root_dir = config.received_dir();
        Self {
            config,
            root_dir,
            records: Vec::new(),
            checked: Vec::new(),
            hidden: Vec::new(),
            search_input: String::new(),
            search_term: None,
            search_results: Vec::new(),
            sort: None,
            active: None,
            progress: None,
            dialog: None,
            status_msgs: Vec::new(),
        }
    }

    pub fn task_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn push_status(&mut self, msg: impl Into<String>) {
        self.status_msgs.push(msg.into());
    }

    /// Replace the file list wholesale; selection and search start over.
    pub fn set_records(&mut self, records: Vec<FileRecord>) {
        self.checked = vec![false; records.len()];
        self.hidden = vec![false; records.len()];
        self.records = records;
        self.search_term = None;
        self.search_results.clear();
    }

    /// Hide every file the search did not match. Missing trailing results
    /// count as non-matching.
    pub fn apply_search(&mut self, term: String, results: Vec<SearchResult>) {
        self.hidden = (0..self.records.len())
            .map(|i| !results.get(i).is_some_and(|r| r.matched))
            .collect();
        self.search_results = results;
        self.search_term = Some(term);
    }

    pub fn reset_search(&mut self) {
        self.search_input.clear();
        self.search_term = None;
        self.search_results.clear();
        self.hidden = vec![false; self.records.len()];
    }

    pub fn search_result(&self, idx: usize) -> Option<&SearchResult> {
        self.search_term.as_ref()?;
        self.search_results.get(idx)
    }

    pub fn all_checked(&self) -> bool {
        !self.checked.is_empty() && self.checked.iter().all(|c| *c)
    }

    pub fn set_all_checked(&mut self, value: bool) {
        self.checked.iter_mut().for_each(|c| *c = value);
    }

    pub fn is_visible(&self, idx: usize) -> bool {
        !self.hidden.get(idx).copied().unwrap_or(false)
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        (0..self.records.len()).filter(|i| self.is_visible(*i)).collect()
    }

    pub fn checked_count(&self) -> usize {
        self.checked.iter().filter(|c| **c).count()
    }

    /// Targets of "Delete all": every file currently shown.
    pub fn visible_paths(&self) -> Vec<PathBuf> {
        self.visible_indices()
            .into_iter()
            .map(|i| self.records[i].path.clone())
            .collect()
    }

    /// Targets of "Delete selected" and "Open": checked files, shown or not.
    pub fn checked_paths(&self) -> Vec<PathBuf> {
        self.records
            .iter()
            .zip(&self.checked)
            .filter(|(_, c)| **c)
            .map(|(r, _)| r.path.clone())
            .collect()
    }

    /// Checked files that are currently shown.
    pub fn checked_visible_entries(&self) -> Vec<ArchiveEntry> {
        self.entries_where(|i| self.checked[i])
    }

    pub fn visible_entries(&self) -> Vec<ArchiveEntry> {
        self.entries_where(|_| true)
    }

    fn entries_where(&self, keep: impl Fn(usize) -> bool) -> Vec<ArchiveEntry> {
        self.visible_indices()
            .into_iter()
            .filter(|i| keep(*i))
            .map(|i| ArchiveEntry {
                source: self.records[i].path.clone(),
                name: self.records[i].archive_entry_name(),
            })
            .collect()
    }
}

/// Main eframe application that renders and controls the UI.
pub struct TalkCleanerApp {
    pub state: GuiState,
}

impl TalkCleanerApp {
    /// Start with an empty list and immediately trigger a folder scan.
    pub fn new(config: AppConfig) -> Self {
        let mut state = GuiState::new(config);
        tasks::spawn_refresh(&mut state);
        Self { state }
    }
}

/// Egui frame update: drains task events, then lays out the panels.
impl App for TalkCleanerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tasks::poll(&mut self.state);

        panels::top::show(ctx, &mut self.state);
        panels::bottom::show(ctx, &self.state);
        panels::side::show(ctx, &mut self.state);
        panels::central::show(ctx, &mut self.state);
        dialogs::show(ctx, &mut self.state);

        // request repaint for smooth progress updates
        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
