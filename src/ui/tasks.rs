//! Background tasks started by the UI: refreshing the file list, searching,
//! compressing and deleting, without blocking the UI thread.
//!
//! Each `spawn_*` function hands an owned snapshot of its inputs to
//! `task::spawn` and stores the handle in `GuiState::active`. `poll` drains
//! the handle once per frame and applies the terminal outcome.

use std::path::PathBuf;

use log::warn;

use crate::core::archive::{compress_files, ArchiveEntry};
use crate::core::delete::{delete_files, DeleteSummary};
use crate::core::format::format_duration;
use crate::core::scan::scan_folder;
use crate::core::search::search_files;
use crate::error::TaskError;
use crate::task::{self, TaskEvent, TaskHandle, TaskOutcome};
use crate::types::{FileRecord, SearchResult, TaskKind, TaskProgress};

use super::dialogs::Dialog;
use super::GuiState;

/// The one task allowed to run at a time.
pub enum ActiveTask {
    Refresh(TaskHandle<Vec<FileRecord>>),
    Search {
        term: String,
        handle: TaskHandle<Vec<SearchResult>>,
    },
    Compress(TaskHandle<PathBuf>),
    Delete(TaskHandle<DeleteSummary>),
}

impl ActiveTask {
    pub fn kind(&self) -> TaskKind {
        match self {
            ActiveTask::Refresh(h) => h.kind(),
            ActiveTask::Search { handle, .. } => handle.kind(),
            ActiveTask::Compress(h) => h.kind(),
            ActiveTask::Delete(h) => h.kind(),
        }
    }

    pub fn cancel(&self) {
        match self {
            ActiveTask::Refresh(h) => h.cancel(),
            ActiveTask::Search { handle, .. } => handle.cancel(),
            ActiveTask::Compress(h) => h.cancel(),
            ActiveTask::Delete(h) => h.cancel(),
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        match self {
            ActiveTask::Refresh(h) => h.is_cancel_requested(),
            ActiveTask::Search { handle, .. } => handle.is_cancel_requested(),
            ActiveTask::Compress(h) => h.is_cancel_requested(),
            ActiveTask::Delete(h) => h.is_cancel_requested(),
        }
    }
}

/// Rescan the received-files folder.
pub fn spawn_refresh(state: &mut GuiState) {
    if state.task_running() {
        return;
    }
    let root = state.root_dir.clone();
    let handle = task::spawn(TaskKind::Refresh, move |ctx| scan_folder(&root, ctx));
    start(state, ActiveTask::Refresh(handle));
}

/// Search the current records for `term`. A blank term resets the search.
pub fn spawn_search(state: &mut GuiState, term: &str) {
    if state.task_running() {
        return;
    }
    let term = term.trim().to_string();
    if term.is_empty() {
        state.reset_search();
        return;
    }
    let records = state.records.clone();
    let needle = term.clone();
    let handle = task::spawn(TaskKind::Search, move |ctx| {
        Ok(search_files(&records, &needle, ctx))
    });
    start(state, ActiveTask::Search { term, handle });
}

pub fn spawn_compress(state: &mut GuiState, entries: Vec<ArchiveEntry>, dest: PathBuf) {
    if state.task_running() {
        return;
    }
    if entries.is_empty() {
        state.dialog = Some(Dialog::notice("Compress", "There are no files to compress."));
        return;
    }
    let handle = task::spawn(TaskKind::Compress, move |ctx| {
        compress_files(&entries, &dest, ctx)
    });
    start(state, ActiveTask::Compress(handle));
}

pub fn spawn_delete(state: &mut GuiState, paths: Vec<PathBuf>) {
    if state.task_running() {
        return;
    }
    let mode = state.config.removal_mode();
    let handle = task::spawn(TaskKind::Delete, move |ctx| delete_files(&paths, mode, ctx));
    start(state, ActiveTask::Delete(handle));
}

fn start(state: &mut GuiState, active: ActiveTask) {
    state.progress = None;
    state.push_status(format!("Started {}.", active.kind().label()));
    state.active = Some(active);
}

/// Request cancellation of the running task, if any.
pub fn cancel_active(state: &mut GuiState) {
    let Some(active) = state.active.as_ref().filter(|a| !a.is_cancel_requested()) else {
        return;
    };
    active.cancel();
    let kind = active.kind();
    state.push_status(format!("Cancelling {}...", kind.label()));
}

/// Drain pending events of the active task and apply its outcome once it
/// finishes.
pub fn poll(state: &mut GuiState) {
    let Some(active) = state.active.take() else {
        return;
    };

    match active {
        ActiveTask::Refresh(mut handle) => match drain(&mut handle, &mut state.progress) {
            Some(outcome) => finish_refresh(state, outcome),
            None => state.active = Some(ActiveTask::Refresh(handle)),
        },
        ActiveTask::Search { term, mut handle } => {
            match drain(&mut handle, &mut state.progress) {
                Some(outcome) => finish_search(state, term, outcome),
                None => state.active = Some(ActiveTask::Search { term, handle }),
            }
        }
        ActiveTask::Compress(mut handle) => match drain(&mut handle, &mut state.progress) {
            Some(outcome) => finish_compress(state, outcome),
            None => state.active = Some(ActiveTask::Compress(handle)),
        },
        ActiveTask::Delete(mut handle) => match drain(&mut handle, &mut state.progress) {
            Some(outcome) => finish_delete(state, outcome),
            None => state.active = Some(ActiveTask::Delete(handle)),
        },
    }
}

fn drain<T>(
    handle: &mut TaskHandle<T>,
    progress: &mut Option<TaskProgress>,
) -> Option<TaskOutcome<T>> {
    while let Some(event) = handle.try_next() {
        match event {
            TaskEvent::Progress(p) => *progress = Some(p),
            TaskEvent::Finished(outcome) => return Some(outcome),
        }
    }
    None
}

fn finish_refresh(state: &mut GuiState, outcome: TaskOutcome<Vec<FileRecord>>) {
    state.progress = None;
    match outcome {
        TaskOutcome::Completed(records) => {
            state.push_status(format!("Found {} files.", records.len()));
            state.set_records(records);
        }
        TaskOutcome::Cancelled(_) => state.push_status("Refresh cancelled."),
        TaskOutcome::Failed(err) => {
            warn!("Showing an empty list: {}", err);
            state.set_records(Vec::new());
            state.push_status(err.to_string());
        }
    }
}

fn finish_search(state: &mut GuiState, term: String, outcome: TaskOutcome<Vec<SearchResult>>) {
    state.progress = None;
    match outcome {
        TaskOutcome::Completed(results) => {
            let matched = results.iter().filter(|r| r.matched).count();
            state.push_status(format!("{} files match \"{}\".", matched, term));
            state.apply_search(term, results);
        }
        TaskOutcome::Cancelled(Some(results)) => {
            state.push_status("Search cancelled; showing the files searched so far.");
            state.apply_search(term, results);
        }
        TaskOutcome::Cancelled(None) => state.push_status("Search cancelled."),
        TaskOutcome::Failed(err) => report_failure(state, "Search", &err),
    }
}

fn finish_compress(state: &mut GuiState, outcome: TaskOutcome<PathBuf>) {
    state.progress = None;
    match outcome {
        TaskOutcome::Completed(path) => {
            state.push_status(format!("Archive written to {}.", path.display()));
            state.dialog = Some(Dialog::ArchiveReady(path));
        }
        TaskOutcome::Cancelled(_) => {
            state.push_status("Compression cancelled.");
            state.dialog = Some(Dialog::notice("Cancelled", "The task was cancelled."));
        }
        TaskOutcome::Failed(err) => report_failure(state, "Compress", &err),
    }
}

/// The folder changed whatever happened, so the list is always rescanned.
fn finish_delete(state: &mut GuiState, outcome: TaskOutcome<DeleteSummary>) {
    state.progress = None;
    match outcome {
        TaskOutcome::Completed(summary) => {
            state.push_status(format!(
                "Deleted {} files in {}.",
                summary.deleted,
                format_duration(summary.elapsed)
            ));
            state.dialog = Some(Dialog::notice("Delete", "The files were deleted."));
        }
        TaskOutcome::Cancelled(_) => {
            state.push_status("Deletion cancelled.");
            state.dialog = Some(Dialog::notice("Cancelled", "The task was cancelled."));
        }
        TaskOutcome::Failed(err) => report_failure(state, "Delete", &err),
    }
    spawn_refresh(state);
}

fn report_failure(state: &mut GuiState, title: &str, err: &TaskError) {
    state.push_status(format!("{} failed: {}", title, err));
    state.dialog = Some(Dialog::notice(title, err.to_string()));
}

/// Text shown next to the progress bar.
pub fn progress_label(kind: TaskKind, progress: Option<&TaskProgress>) -> String {
    let Some(p) = progress else {
        return match kind {
            TaskKind::Refresh => "Scanning files...".into(),
            TaskKind::Search => "Searching...".into(),
            TaskKind::Compress => "Compressing...".into(),
            TaskKind::Delete => "Deleting...".into(),
        };
    };
    match (kind, p.timing) {
        (TaskKind::Delete, Some(t)) => format!(
            "Deleted: {}/{}  {:.1}%\nElapsed: {} / Remaining: {}",
            p.completed,
            p.total,
            t.percent,
            format_duration(t.elapsed),
            format_duration(t.remaining)
        ),
        (TaskKind::Compress, _) => format!("Read: {}/{}", p.completed, p.total),
        _ => format!("{}: {}/{}", capitalize(kind.label()), p.completed, p.total),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
