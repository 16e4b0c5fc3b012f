//! Core data types shared across the application.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::format::{format_size, format_timestamp};

/// Placeholder shown when a size or timestamp could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

/// Metadata snapshot of one received file, taken at scan time.
#[derive(Clone, Debug, PartialEq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Path relative to the scanned root, e.g. `photos/a.jpg`.
    pub display_name: String,
    /// Extension with its leading dot, empty when the name has none.
    pub extension: String,
    pub size: Option<u64>,
    pub modified: Option<DateTime<Local>>,
}

impl FileRecord {
    /// Name the file is stored under inside an archive.
    pub fn archive_entry_name(&self) -> String {
        self.display_name.replace('\\', "/")
    }

    pub fn size_label(&self) -> String {
        self.size
            .map(format_size)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn modified_label(&self) -> String {
        self.modified
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

/// One matching line of a text file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineMatch {
    /// 1-indexed.
    pub line_number: u32,
    pub text: String,
}

/// Search outcome for a single file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub matched: bool,
    pub lines: Vec<LineMatch>,
}

/// Kind of background task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    Refresh,
    Search,
    Compress,
    Delete,
}

impl TaskKind {
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Refresh => "refresh",
            TaskKind::Search => "search",
            TaskKind::Compress => "compress",
            TaskKind::Delete => "delete",
        }
    }
}

/// Elapsed/remaining estimate attached to deletion progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaskTiming {
    pub elapsed: Duration,
    pub remaining: Duration,
    pub percent: f64,
}

impl TaskTiming {
    /// Average-rate projection: `remaining = elapsed / completed * (total - completed)`.
    /// Nothing completed yet projects zero remaining time.
    pub fn project(completed: usize, total: usize, elapsed: Duration) -> Self {
        let percent = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        let remaining = if completed == 0 {
            Duration::ZERO
        } else {
            let left = total.saturating_sub(completed) as f64;
            Duration::from_secs_f64(elapsed.as_secs_f64() / completed as f64 * left)
        };
        Self {
            elapsed,
            remaining,
            percent,
        }
    }
}

/// Progress update sent from a background task to the UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
    pub timing: Option<TaskTiming>,
}

impl TaskProgress {
    /// 0.0 ..= 1.0, for progress bars.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_uses_average_rate() {
        let t = TaskTiming::project(2, 6, Duration::from_secs(4));
        assert_eq!(t.remaining, Duration::from_secs(8));
        assert!((t.percent - 33.333).abs() < 0.01);
    }

    #[test]
    fn projection_before_first_completion_is_zero() {
        let t = TaskTiming::project(0, 5, Duration::from_millis(300));
        assert_eq!(t.remaining, Duration::ZERO);
        assert_eq!(t.percent, 0.0);
    }

    #[test]
    fn archive_entry_name_uses_forward_slashes() {
        let record = FileRecord {
            path: PathBuf::from("/tmp/x/sub/a.txt"),
            display_name: "sub\\a.txt".into(),
            extension: ".txt".into(),
            size: None,
            modified: None,
        };
        assert_eq!(record.archive_entry_name(), "sub/a.txt");
        assert_eq!(record.size_label(), NOT_AVAILABLE);
        assert_eq!(record.modified_label(), NOT_AVAILABLE);
    }
}
