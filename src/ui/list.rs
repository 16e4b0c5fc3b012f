//! File table building blocks: column sorting, the clickable name cell and
//! the rich text of matched lines.

use std::cmp::Ordering;

use eframe::emath::{Align2, Vec2};
use eframe::epaint::{Color32, FontId, StrokeKind};
use egui::text::LayoutJob;
use egui::{Response, Sense, TextFormat, Ui};

use crate::core::search::preview_spans;
use crate::style;
use crate::types::{FileRecord, LineMatch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Extension,
    Size,
    Modified,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Name,
        SortColumn::Extension,
        SortColumn::Size,
        SortColumn::Modified,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Extension => "Type",
            SortColumn::Size => "Size",
            SortColumn::Modified => "Modified",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub ascending: bool,
}

impl SortState {
    /// Header label with a direction arrow on the sorted column.
    pub fn header(sort: Option<SortState>, column: SortColumn) -> String {
        match sort {
            Some(s) if s.column == column => {
                format!("{} {}", column.label(), if s.ascending { "▲" } else { "▼" })
            }
            _ => column.label().to_string(),
        }
    }
}

/// Clicking the sorted column flips direction; another column starts ascending.
pub fn toggle(current: Option<SortState>, column: SortColumn) -> SortState {
    match current {
        Some(s) if s.column == column => SortState {
            column,
            ascending: !s.ascending,
        },
        _ => SortState {
            column,
            ascending: true,
        },
    }
}

/// Order `indices` for display. The records themselves are never moved;
/// unknown sizes and times sort before known ones.
pub fn sort_order(records: &[FileRecord], mut indices: Vec<usize>, sort: Option<SortState>) -> Vec<usize> {
    let Some(sort) = sort else {
        return indices;
    };
    indices.sort_by(|&a, &b| {
        let ord = compare(&records[a], &records[b], sort.column);
        if sort.ascending { ord } else { ord.reverse() }
    });
    indices
}

fn compare(a: &FileRecord, b: &FileRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a.display_name.to_lowercase().cmp(&b.display_name.to_lowercase()),
        SortColumn::Extension => a.extension.to_lowercase().cmp(&b.extension.to_lowercase()),
        SortColumn::Size => a.size.cmp(&b.size),
        SortColumn::Modified => a.modified.cmp(&b.modified),
    }
}

/// `Line N: <preview>` with every occurrence of `term` emphasized.
pub fn line_job(line: &LineMatch, term: &str, max_chars: usize) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.append(
        &format!("Line {}: ", line.line_number),
        0.0,
        TextFormat {
            color: style::MUTED,
            ..Default::default()
        },
    );
    for span in preview_spans(&line.text, term, max_chars) {
        let color = if span.emphasized {
            style::EMPHASIS
        } else {
            style::MATCH_LINE
        };
        job.append(
            &span.text,
            0.0,
            TextFormat {
                color,
                ..Default::default()
            },
        );
    }
    job
}

/// Background colors of a table row.
#[derive(Clone, Copy, Debug)]
pub struct RowColors {
    pub default: Color32,
    pub hover: Color32,
    pub checked: Color32,
}

impl Default for RowColors {
    fn default() -> Self {
        Self {
            default: Color32::TRANSPARENT,
            hover: Color32::from_rgb(245, 245, 247),
            checked: Color32::from_rgb(255, 246, 184),
        }
    }
}

/// Clickable, left-aligned name cell. Double-clicks open the file.
pub fn name_cell(ui: &mut Ui, text: &str, size: Vec2, checked: bool, colors: RowColors) -> Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        let visuals = ui.style().interact_selectable(&response, checked);
        let bg_color = if checked {
            colors.checked
        } else if response.hovered() {
            colors.hover
        } else {
            colors.default
        };

        let border_radius = 2.0;
        ui.painter().rect_filled(rect, border_radius, bg_color);
        if response.hovered() {
            ui.painter()
                .rect_stroke(rect, border_radius, visuals.bg_stroke, StrokeKind::Middle);
        }

        let text_pos = rect.left_center() + Vec2::new(4.0, 0.0);
        ui.painter().text(
            text_pos,
            Align2::LEFT_CENTER,
            text,
            FontId::default(),
            ui.visuals().text_color(),
        );
    }

    response.on_hover_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn record(name: &str, ext: &str, size: Option<u64>, day: u32) -> FileRecord {
        FileRecord {
            path: PathBuf::from(name),
            display_name: name.into(),
            extension: ext.into(),
            size,
            modified: Some(Local.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
        }
    }

    fn records() -> Vec<FileRecord> {
        vec![
            record("b.txt", ".txt", Some(30), 2),
            record("A.jpg", ".jpg", None, 3),
            record("c.pdf", ".pdf", Some(10), 1),
        ]
    }

    #[test]
    fn toggling_flips_only_the_same_column() {
        let first = toggle(None, SortColumn::Size);
        assert!(first.ascending);
        let second = toggle(Some(first), SortColumn::Size);
        assert!(!second.ascending);
        let other = toggle(Some(second), SortColumn::Name);
        assert_eq!(other, SortState { column: SortColumn::Name, ascending: true });
    }

    #[test]
    fn sorting_reorders_indices_only() {
        let recs = records();
        let all = vec![0, 1, 2];
        assert_eq!(sort_order(&recs, all.clone(), None), vec![0, 1, 2]);

        let by_name = Some(SortState { column: SortColumn::Name, ascending: true });
        assert_eq!(sort_order(&recs, all.clone(), by_name), vec![1, 0, 2]);

        let by_size = Some(SortState { column: SortColumn::Size, ascending: true });
        assert_eq!(sort_order(&recs, all.clone(), by_size), vec![1, 2, 0]);

        let newest = Some(SortState { column: SortColumn::Modified, ascending: false });
        assert_eq!(sort_order(&recs, all, newest), vec![1, 0, 2]);

        // a filtered view stays filtered
        assert_eq!(sort_order(&recs, vec![0, 2], by_size), vec![2, 0]);
    }

    #[test]
    fn header_marks_sorted_column() {
        let sort = Some(SortState { column: SortColumn::Size, ascending: false });
        assert_eq!(SortState::header(sort, SortColumn::Size), "Size ▼");
        assert_eq!(SortState::header(sort, SortColumn::Name), "Name");
    }

    #[test]
    fn line_job_emphasizes_term() {
        let line = LineMatch {
            line_number: 7,
            text: "say Hello and hello again, then keep talking for a while".into(),
        };
        let job = line_job(&line, "hello", 19);
        assert_eq!(job.text, "Line 7: say Hello and hello...");

        let emphasized: Vec<&str> = job
            .sections
            .iter()
            .filter(|s| s.format.color == style::EMPHASIS)
            .map(|s| &job.text[s.byte_range.clone()])
            .collect();
        assert_eq!(emphasized, vec!["Hello", "hello"]);
    }
}
