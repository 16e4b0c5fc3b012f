use chrono::{DateTime, Local};
use log::{info, warn};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::TaskError;
use crate::task::TaskContext;
use crate::types::FileRecord;

/// Folder KakaoTalk saves received files into, under the user's Documents.
pub const RECEIVED_FILES_DIR: &str = "카카오톡 받은 파일";

/// `<home>/Documents/카카오톡 받은 파일`
pub fn default_received_dir() -> PathBuf {
    home::home_dir()
        .unwrap_or_default()
        .join("Documents")
        .join(RECEIVED_FILES_DIR)
}

/// Walk `root` recursively and snapshot every regular file, including
/// symlinks that point at files.
///
/// Within a directory, files come before subdirectories and both are sorted
/// by name, so repeated scans of an unchanged tree yield the same order.
pub fn scan_folder(root: &Path, ctx: &TaskContext) -> Result<Vec<FileRecord>, TaskError> {
    if !root.is_dir() {
        return Err(TaskError::NotFound(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by(|a, b| files_first(a, b));

    let mut records = Vec::new();
    for entry in walker {
        if ctx.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, err);
                continue;
            }
        };
        if !is_file_or_file_link(&entry) {
            continue;
        }
        records.push(record_for(root, &entry));
    }

    info!("Scanned {} files under {:?}", records.len(), root);
    Ok(records)
}

/// Links are not followed into directories, but a link to a file is listed
/// like the file itself.
fn is_file_or_file_link(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn record_for(root: &Path, entry: &DirEntry) -> FileRecord {
    let path = entry.path().to_path_buf();
    let display_name = path
        .strip_prefix(root)
        .unwrap_or(&path)
        .to_string_lossy()
        .into_owned();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    // metadata failures degrade to N/A instead of dropping the file
    let meta = fs::metadata(&path).ok();
    let size = meta.as_ref().map(|m| m.len());
    let modified = meta
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Local>::from);

    FileRecord {
        path,
        display_name,
        extension,
        size,
        modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn lists_nested_files_with_relative_names() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("photos/2024")).unwrap();
        fs::write(dir.path().join("b.txt"), "bb").unwrap();
        fs::write(dir.path().join("a.pdf"), "a").unwrap();
        fs::write(dir.path().join("photos/2024/c.jpg"), "ccc").unwrap();
        fs::write(dir.path().join("photos/README"), "").unwrap();

        let records = scan_folder(dir.path(), &TaskContext::detached()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.archive_entry_name()).collect();
        assert_eq!(
            names,
            vec!["a.pdf", "b.txt", "photos/README", "photos/2024/c.jpg"]
        );

        let b = &records[1];
        assert_eq!(b.extension, ".txt");
        assert_eq!(b.size, Some(2));
        assert!(b.modified.is_some());
        assert_eq!(b.path, dir.path().join("b.txt"));
        assert_eq!(records[2].extension, "");
    }

    #[cfg(unix)]
    #[test]
    fn file_symlinks_are_listed_dir_symlinks_are_not() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::write(outside.path().join("target.txt"), "linked").unwrap();
        fs::create_dir(outside.path().join("sub")).unwrap();
        fs::write(outside.path().join("sub/inner.txt"), "x").unwrap();

        fs::write(dir.path().join("plain.txt"), "p").unwrap();
        symlink(outside.path().join("target.txt"), dir.path().join("link.txt")).unwrap();
        symlink(outside.path().join("sub"), dir.path().join("linked_dir")).unwrap();
        symlink(outside.path().join("gone.txt"), dir.path().join("dangling.txt")).unwrap();

        let records = scan_folder(dir.path(), &TaskContext::detached()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["link.txt", "plain.txt"]);
        assert_eq!(records[0].size, Some(6));
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = scan_folder(&missing, &TaskContext::detached()).unwrap_err();
        assert!(matches!(err, TaskError::NotFound(p) if p == missing));
    }

    #[test]
    fn empty_folder_yields_no_records() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let records = scan_folder(dir.path(), &TaskContext::detached()).unwrap();
        assert!(records.is_empty());
    }
}
