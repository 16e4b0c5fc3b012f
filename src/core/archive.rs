//! Compress a set of files into one ZIP archive.
//!
//! All sources are read into memory first, in parallel on the rayon pool.
//! The archive file is only created once every read succeeded.

use log::{info, warn};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::TaskError;
use crate::task::TaskContext;

/// A file to add and the name it gets inside the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    pub name: String,
}

/// Read every entry and write them to `dest`. Returns `dest` on success.
pub fn compress_files(
    entries: &[ArchiveEntry],
    dest: &Path,
    ctx: &TaskContext,
) -> Result<PathBuf, TaskError> {
    let contents = read_all(entries, ctx)?;
    if ctx.is_cancelled() {
        return Err(TaskError::Cancelled);
    }
    write_archive(dest, &contents, ctx)?;
    info!("Wrote {} entries to {:?}", contents.len(), dest);
    Ok(dest.to_path_buf())
}

/// Contents in read-completion order.
fn read_all(
    entries: &[ArchiveEntry],
    ctx: &TaskContext,
) -> Result<Vec<(String, Vec<u8>)>, TaskError> {
    let total = entries.len();
    let cancel = ctx.token();
    let abort = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel();

    let mut contents = Vec::with_capacity(total);
    let mut failure = None;

    thread::scope(|scope| {
        let abort = &abort;
        let cancel = &cancel;
        scope.spawn(move || {
            entries.par_iter().for_each_with(tx, |tx, entry| {
                if abort.load(Ordering::Relaxed) {
                    return;
                }
                if cancel.is_cancelled() {
                    let _ = tx.send(Err(TaskError::Cancelled));
                    return;
                }
                let read = fs::read(&entry.source)
                    .map(|bytes| (entry.name.clone(), bytes))
                    .map_err(|source| TaskError::Read {
                        path: entry.source.clone(),
                        source,
                    });
                let _ = tx.send(read);
            });
        });

        for read in rx {
            match read {
                Ok(item) => {
                    contents.push(item);
                    ctx.report(contents.len(), total);
                }
                Err(err) => {
                    abort.store(true, Ordering::Relaxed);
                    failure = Some(err);
                    break;
                }
            }
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(contents),
    }
}

fn write_archive(
    dest: &Path,
    contents: &[(String, Vec<u8>)],
    ctx: &TaskContext,
) -> Result<(), TaskError> {
    let file = File::create(dest).map_err(|source| TaskError::Write {
        path: dest.to_path_buf(),
        source,
    })?;
    let written = write_entries(file, dest, contents, ctx);
    if written.is_err() {
        if let Err(err) = fs::remove_file(dest) {
            warn!("Could not remove partial archive {:?}: {}", dest, err);
        }
    }
    written
}

fn write_entries(
    file: File,
    dest: &Path,
    contents: &[(String, Vec<u8>)],
    ctx: &TaskContext,
) -> Result<(), TaskError> {
    let zip_err = |source| TaskError::Archive {
        path: dest.to_path_buf(),
        source,
    };
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for (name, bytes) in contents {
        if ctx.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        let options = options.large_file(needs_zip64(bytes.len() as u64));
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        zip.write_all(bytes).map_err(|source| TaskError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    }

    let mut inner = zip.finish().map_err(zip_err)?;
    inner.flush().map_err(|source| TaskError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

/// Entries of 4 GiB and up need ZIP64 headers.
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{self, CancelToken, TaskEvent, TaskOutcome};
    use crate::types::TaskKind;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn extract(path: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut out = BTreeMap::new();
        for i in 0..archive.len() {
            let mut f = archive.by_index(i).unwrap();
            if f.name() == "big.bin" {
                assert_eq!(f.compression(), CompressionMethod::Deflated);
                assert!(f.compressed_size() < f.size());
            }
            let mut buf = Vec::new();
            f.read_to_end(&mut buf).unwrap();
            out.insert(f.name().to_string(), buf);
        }
        out
    }

    fn entries_in(dir: &Path, files: &[(&str, &[u8])]) -> Vec<ArchiveEntry> {
        files
            .iter()
            .map(|(name, data)| {
                let source = dir.join(name.replace('/', "_"));
                fs::write(&source, data).unwrap();
                ArchiveEntry {
                    source,
                    name: name.to_string(),
                }
            })
            .collect()
    }

    #[test]
    fn archive_round_trips_contents() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let big: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let files: Vec<(&str, &[u8])> = vec![
            ("a.txt", &b"hello world"[..]),
            ("photos/b.jpg", &[0xFFu8, 0xD8, 0x00, 0x01][..]),
            ("empty.dat", &b""[..]),
            ("big.bin", &big[..]),
        ];
        let entries = entries_in(src.path(), &files);
        let dest = out.path().join("out.zip");

        let written = compress_files(&entries, &dest, &TaskContext::detached()).unwrap();
        assert_eq!(written, dest);

        let extracted = extract(&dest);
        let expected: BTreeMap<String, Vec<u8>> = files
            .iter()
            .map(|(n, d)| (n.to_string(), d.to_vec()))
            .collect();
        assert_eq!(extracted, expected);
    }

    #[test]
    fn progress_counts_every_read() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let names: Vec<String> = (0..12).map(|i| format!("copy{i}.txt")).collect();
        let files: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"data"[..])).collect();
        let entries = entries_in(src.path(), &files);
        let dest = out.path().join("copies.zip");

        let mut handle = task::spawn(TaskKind::Compress, move |ctx| {
            compress_files(&entries, &dest, ctx)
        });
        let mut completed = Vec::new();
        let outcome = loop {
            match handle.next_blocking() {
                Some(TaskEvent::Progress(p)) => {
                    assert_eq!(p.total, 12);
                    completed.push(p.completed);
                }
                Some(TaskEvent::Finished(outcome)) => break outcome,
                None => panic!("no terminal event"),
            }
        };
        assert_eq!(completed, (1..=12).collect::<Vec<_>>());
        let path = match outcome {
            TaskOutcome::Completed(path) => path,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert_eq!(extract(&path).len(), 12);
    }

    #[test]
    fn read_failure_leaves_no_archive() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut entries = entries_in(src.path(), &[("a.txt", &b"a"[..])]);
        let missing = src.path().join("missing.txt");
        entries.push(ArchiveEntry {
            source: missing.clone(),
            name: "missing.txt".into(),
        });
        let dest = out.path().join("out.zip");

        let err = compress_files(&entries, &dest, &TaskContext::detached()).unwrap_err();
        assert!(matches!(err, TaskError::Read { ref path, .. } if *path == missing));
        assert!(err.to_string().contains("missing.txt"));
        assert!(!dest.exists());
    }

    #[test]
    fn cancelled_before_start_writes_nothing() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let entries = entries_in(src.path(), &[("a.txt", &b"a"[..]), ("b.txt", &b"b"[..])]);
        let dest = out.path().join("out.zip");

        let token = CancelToken::new();
        token.cancel();
        let err = compress_files(&entries, &dest, &TaskContext::with_token(token)).unwrap_err();
        assert!(err.is_cancelled());
        assert!(!dest.exists());
    }

    #[test]
    fn cancelling_during_reads_leaves_no_archive() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let names: Vec<String> = (0..16).map(|i| format!("part{i}.bin")).collect();
        let files: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &b"payload"[..])).collect();
        let entries = entries_in(src.path(), &files);
        let dest = out.path().join("cancelled.zip");
        let target = dest.clone();

        // cancel from the progress stream as soon as the first read lands
        let handle = task::spawn(TaskKind::Compress, move |ctx| {
            let token = ctx.token();
            let trigger = token.clone();
            let inner = TaskContext::new(
                token,
                Box::new(move |p| {
                    if p.completed == 1 {
                        trigger.cancel();
                    }
                }),
            );
            compress_files(&entries, &target, &inner)
        });

        assert!(matches!(handle.wait(), TaskOutcome::Cancelled(None)));
        assert!(!dest.exists());
    }

    #[test]
    fn zip64_only_for_entries_past_the_32_bit_limit() {
        assert!(!needs_zip64(0));
        assert!(!needs_zip64(200_000));
        assert!(!needs_zip64(u64::from(u32::MAX) - 1));
        assert!(needs_zip64(u64::from(u32::MAX)));
        assert!(needs_zip64(6 * 1024 * 1024 * 1024));
    }

    #[test]
    fn unwritable_destination_is_write_error() {
        let src = tempdir().unwrap();
        let entries = entries_in(src.path(), &[("a.txt", &b"a"[..])]);
        let dest = src.path().join("no_such_dir").join("out.zip");

        let err = compress_files(&entries, &dest, &TaskContext::detached()).unwrap_err();
        assert!(matches!(err, TaskError::Write { .. }));
    }
}
