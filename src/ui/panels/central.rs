use std::path::PathBuf;

use eframe::egui;

use crate::core::launch::{open_at_line, open_path};
use crate::ui::list::{self, RowColors, SortColumn, SortState};
use crate::ui::GuiState;

const NAME_WIDTH: f32 = 420.0;
const ROW_HEIGHT: f32 = 20.0;

/// What a double-click asked for; carried out after the table is drawn.
enum OpenRequest {
    File(PathBuf),
    Line(PathBuf, u32),
}

/// Render the file table.
pub fn show(ctx: &egui::Context, state: &mut GuiState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if state.records.is_empty() {
            ui.centered_and_justified(|ui| {
                if state.task_running() {
                    ui.label("Scanning files...");
                } else {
                    ui.label(format!("No files in {}", state.root_dir.display()));
                }
            });
            return;
        }

        let idle = !state.task_running();
        let order = list::sort_order(&state.records, state.visible_indices(), state.sort);
        let mut request = None;

        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                egui::Grid::new("files")
                    .num_columns(5)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for column in SortColumn::ALL {
                            let header = egui::Button::new(
                                egui::RichText::new(SortState::header(state.sort, column)).strong(),
                            )
                            .frame(false);
                            if ui.add(header).clicked() {
                                state.sort = Some(list::toggle(state.sort, column));
                            }
                        }
                        ui.end_row();

                        for i in order {
                            let mut checked = state.checked[i];
                            if ui
                                .add_enabled(idle, egui::Checkbox::without_text(&mut checked))
                                .changed()
                            {
                                state.checked[i] = checked;
                            }

                            let record = &state.records[i];
                            let name = list::name_cell(
                                ui,
                                &record.display_name,
                                egui::vec2(NAME_WIDTH, ROW_HEIGHT),
                                checked,
                                RowColors::default(),
                            );
                            if name.double_clicked() {
                                request = Some(OpenRequest::File(record.path.clone()));
                            }
                            ui.label(&record.extension);
                            ui.label(record.size_label());
                            ui.label(record.modified_label());
                            ui.end_row();

                            let (Some(term), Some(result)) =
                                (state.search_term.as_deref(), state.search_result(i))
                            else {
                                continue;
                            };
                            for line in &result.lines {
                                ui.label("");
                                let job = list::line_job(line, term, state.config.preview_chars);
                                let row = ui.add(
                                    egui::Label::new(job)
                                        .extend()
                                        .sense(egui::Sense::click()),
                                );
                                if row.double_clicked() {
                                    request = Some(OpenRequest::Line(
                                        record.path.clone(),
                                        line.line_number,
                                    ));
                                }
                                ui.end_row();
                            }
                        }
                    });
            });

        let opened = match request {
            Some(OpenRequest::File(path)) => open_path(&path),
            Some(OpenRequest::Line(path, line)) => {
                open_at_line(&path, line, state.config.editor.as_ref())
            }
            None => Ok(()),
        };
        if let Err(e) = opened {
            state.push_status(format!("{:#}", e));
        }
    });
}
