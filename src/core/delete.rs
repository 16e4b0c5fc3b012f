use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::TaskError;
use crate::task::TaskContext;
use crate::types::TaskTiming;

/// How files leave the folder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalMode {
    #[default]
    Permanent,
    /// Move to the OS trash.
    Trash,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted: usize,
    pub elapsed: Duration,
}

/// Remove `paths` one at a time, in order.
///
/// Stops at the first failure; files removed before it stay removed.
pub fn delete_files(
    paths: &[PathBuf],
    mode: RemovalMode,
    ctx: &TaskContext,
) -> Result<DeleteSummary, TaskError> {
    let total = paths.len();
    let start = Instant::now();

    for (i, path) in paths.iter().enumerate() {
        if ctx.is_cancelled() {
            info!("Deletion cancelled after {} of {} files", i, total);
            return Err(TaskError::Cancelled);
        }
        remove_file(path, mode).map_err(|source| TaskError::Remove {
            path: path.clone(),
            source,
        })?;
        let completed = i + 1;
        ctx.report_timed(
            completed,
            total,
            TaskTiming::project(completed, total, start.elapsed()),
        );
    }

    Ok(DeleteSummary {
        deleted: total,
        elapsed: start.elapsed(),
    })
}

/// Move to the trash when asked, otherwise remove permanently.
///
/// A trash failure is returned as is; the file is never removed permanently
/// in its place.
pub fn remove_file(path: &Path, mode: RemovalMode) -> io::Result<()> {
    match mode {
        RemovalMode::Permanent => fs::remove_file(path),
        RemovalMode::Trash => trash::delete(path).map_err(|err| {
            debug!("Could not move {:?} to the trash: {}", path, err);
            io::Error::other(format!("could not move to trash: {}", err))
        }),
    }
}
