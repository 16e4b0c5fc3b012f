use std::io;
use std::path::PathBuf;

/// Errors produced by the scan/search/compress/delete engines.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("folder does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to delete {}: {}", .path.display(), .source)]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build archive {}: {}", .path.display(), .source)]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error("worker thread failed: {0}")]
    Worker(String),
}

impl TaskError {
    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }
}
