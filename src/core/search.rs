//! Case-insensitive search over file names and text file contents, plus the
//! helpers the UI uses to render matched lines.

use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::task::TaskContext;
use crate::types::{FileRecord, LineMatch, SearchResult};

/// Matched lines are cut to this many characters before display.
pub const PREVIEW_MAX_CHARS: usize = 35;

const BUFFER_CAPACITY: usize = 64 * 1024;

/// Longer lines mean the file is not text worth searching.
const MAX_LINE_BYTES: u64 = 1024 * 1024;

/// Why a file's contents could not be searched. Never surfaced to the user:
/// such files simply have no line matches.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("not UTF-8 text")]
    NotText,
    #[error("line longer than {} bytes", MAX_LINE_BYTES)]
    LineTooLong,
}

/// Search every record for `term`, in list order.
///
/// Returns one result per record. If cancelled midway the files not yet
/// visited are reported as non-matching.
pub fn search_files(records: &[FileRecord], term: &str, ctx: &TaskContext) -> Vec<SearchResult> {
    let needle = term.to_lowercase();
    let total = records.len();
    let mut results = Vec::with_capacity(total);

    for (i, record) in records.iter().enumerate() {
        if ctx.is_cancelled() {
            break;
        }
        results.push(search_file(record, &needle));
        ctx.report(i + 1, total);
    }

    results.resize_with(total, SearchResult::default);
    results
}

fn search_file(record: &FileRecord, needle: &str) -> SearchResult {
    let name_matched = record.display_name.to_lowercase().contains(needle);
    let lines = match read_line_matches(&record.path, needle) {
        Ok(lines) => lines,
        Err(err) => {
            debug!("Not searching contents of {:?}: {}", record.path, err);
            Vec::new()
        }
    };
    SearchResult {
        matched: name_matched || !lines.is_empty(),
        lines,
    }
}

/// Lines of the file at `path` containing `needle` (already lowercased).
///
/// The file is streamed line by line and rejected at the first line that is
/// not UTF-8 or that runs past `MAX_LINE_BYTES`. `\n`, `\r\n` and a lone
/// `\r` all end a line.
pub fn read_line_matches(path: &Path, needle: &str) -> Result<Vec<LineMatch>, ReadError> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
    let mut chunk = Vec::with_capacity(256);
    let mut matches = Vec::new();
    let mut line_number = 0u32;

    loop {
        chunk.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES + 1)
            .read_until(b'\n', &mut chunk)?;
        if read == 0 {
            break;
        }
        if chunk.len() as u64 > MAX_LINE_BYTES {
            return Err(ReadError::LineTooLong);
        }
        let text = std::str::from_utf8(&chunk).map_err(|_| ReadError::NotText)?;
        let text = text.strip_suffix('\n').unwrap_or(text);
        let text = text.strip_suffix('\r').unwrap_or(text);

        for line in text.split('\r') {
            line_number += 1;
            if line.to_lowercase().contains(needle) {
                matches.push(LineMatch {
                    line_number,
                    text: line.trim_end().to_string(),
                });
            }
        }
    }
    Ok(matches)
}

/// Piece of a rendered line; emphasized pieces are occurrences of the term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub emphasized: bool,
}

/// Truncate `line` for display and mark every occurrence of `term`.
pub fn preview_spans(line: &str, term: &str, max_chars: usize) -> Vec<Span> {
    highlight_spans(&truncate_preview(line, max_chars), term)
}

/// Keep the first `max_chars` characters, appending `...` when cut.
pub fn truncate_preview(line: &str, max_chars: usize) -> String {
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

/// Split `text` into spans, emphasizing case-insensitive occurrences of
/// `term` scanned left to right without overlap.
pub fn highlight_spans(text: &str, term: &str) -> Vec<Span> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let needle: Vec<char> = term.chars().collect();
    let mut spans = Vec::new();
    if needle.is_empty() {
        push_span(&mut spans, text, false);
        return spans;
    }

    let mut plain_start = 0;
    let mut i = 0;
    while i + needle.len() <= chars.len() {
        let window = &chars[i..i + needle.len()];
        let hit = window
            .iter()
            .zip(&needle)
            .all(|((_, c), n)| c.to_lowercase().eq(n.to_lowercase()));
        if !hit {
            i += 1;
            continue;
        }
        let start = chars[i].0;
        let end = chars
            .get(i + needle.len())
            .map(|(b, _)| *b)
            .unwrap_or(text.len());
        push_span(&mut spans, &text[plain_start..start], false);
        push_span(&mut spans, &text[start..end], true);
        plain_start = end;
        i += needle.len();
    }
    push_span(&mut spans, &text[plain_start..], false);
    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, emphasized: bool) {
    if !text.is_empty() {
        spans.push(Span {
            text: text.to_string(),
            emphasized,
        });
    }
}
