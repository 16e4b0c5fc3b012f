//! Modal windows: delete confirmation, archive destination, completion and
//! plain notices.

use std::mem;
use std::path::PathBuf;

use chrono::Local;
use eframe::egui;

use crate::config::AppConfig;
use crate::core::archive::ArchiveEntry;
use crate::core::launch::open_path;
use crate::style;
use crate::ui::tasks;
use crate::ui::GuiState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteScope {
    /// Every file currently shown.
    All,
    /// Checked files.
    Selected,
}

#[derive(Debug)]
pub enum Dialog {
    ConfirmDelete {
        paths: Vec<PathBuf>,
        scope: DeleteScope,
    },
    /// Nothing was checked; offer to compress everything shown.
    ConfirmCompressAll { entries: Vec<ArchiveEntry> },
    ArchiveDestination {
        entries: Vec<ArchiveEntry>,
        dest: String,
    },
    ArchiveReady(PathBuf),
    Notice { title: String, body: String },
}

impl Dialog {
    pub fn notice(title: impl Into<String>, body: impl Into<String>) -> Self {
        Dialog::Notice {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Destination prompt prefilled with a timestamped archive name.
    pub fn destination(entries: Vec<ArchiveEntry>, config: &AppConfig) -> Self {
        let dest = config.default_archive_path(Local::now());
        Dialog::ArchiveDestination {
            entries,
            dest: dest.display().to_string(),
        }
    }
}

/// First dialog of a delete action, or a notice when there is nothing to do.
pub fn delete_dialog(state: &GuiState, scope: DeleteScope) -> Dialog {
    let paths = match scope {
        DeleteScope::All => state.visible_paths(),
        DeleteScope::Selected => state.checked_paths(),
    };
    if paths.is_empty() {
        return match scope {
            DeleteScope::All => Dialog::notice("Delete", "There are no files to delete."),
            DeleteScope::Selected => Dialog::notice("Delete", "No files are selected."),
        };
    }
    Dialog::ConfirmDelete { paths, scope }
}

/// Checked and shown files go straight to the destination prompt; with
/// nothing checked the user confirms compressing every shown file first.
pub fn compress_dialog(state: &GuiState) -> Dialog {
    let checked = state.checked_visible_entries();
    if !checked.is_empty() {
        return Dialog::destination(checked, &state.config);
    }
    let visible = state.visible_entries();
    if visible.is_empty() {
        return Dialog::notice("Compress", "There are no files to compress.");
    }
    Dialog::ConfirmCompressAll { entries: visible }
}

enum DialogAction {
    Keep,
    Close,
    Delete(Vec<PathBuf>),
    AskDestination(Vec<ArchiveEntry>),
    Compress(Vec<ArchiveEntry>, PathBuf),
    Open(PathBuf),
}

/// Render the pending dialog, if any, and carry out what the user chose.
pub fn show(ctx: &egui::Context, state: &mut GuiState) {
    let Some(mut dialog) = state.dialog.take() else {
        return;
    };

    match render(ctx, &mut dialog) {
        DialogAction::Keep => state.dialog = Some(dialog),
        DialogAction::Close => {}
        DialogAction::Delete(paths) => tasks::spawn_delete(state, paths),
        DialogAction::AskDestination(entries) => {
            state.dialog = Some(Dialog::destination(entries, &state.config));
        }
        DialogAction::Compress(entries, dest) => tasks::spawn_compress(state, entries, dest),
        DialogAction::Open(path) => {
            if let Err(e) = open_path(&path) {
                state.push_status(format!("{:#}", e));
            }
        }
    }
}

fn window(title: &str) -> egui::Window<'static> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

fn render(ctx: &egui::Context, dialog: &mut Dialog) -> DialogAction {
    let mut action = DialogAction::Keep;
    match dialog {
        Dialog::ConfirmDelete { paths, scope } => {
            let question = match scope {
                DeleteScope::All => format!("Delete all {} shown files?", paths.len()),
                DeleteScope::Selected => format!("Delete the {} selected files?", paths.len()),
            };
            window("Confirm Deletion").show(ctx, |ui| {
                ui.label(question);
                ui.add_space(8.0);
                egui::ScrollArea::vertical()
                    .max_height(220.0)
                    .show(ui, |scroll| {
                        for path in paths.iter() {
                            scroll.label(path.display().to_string());
                        }
                    });
                ui.add_space(12.0);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        action = DialogAction::Close;
                    }
                    let delete = egui::Button::new(
                        egui::RichText::new("Delete").color(egui::Color32::WHITE),
                    )
                    .fill(style::DANGER);
                    if ui.add(delete).clicked() {
                        action = DialogAction::Delete(mem::take(paths));
                    }
                });
            });
        }
        Dialog::ConfirmCompressAll { entries } => {
            window("Compress").show(ctx, |ui| {
                ui.label(format!(
                    "No files are selected. Compress all {} shown files?",
                    entries.len()
                ));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("No").clicked() {
                        action = DialogAction::Close;
                    }
                    if ui.button("Yes").clicked() {
                        action = DialogAction::AskDestination(mem::take(entries));
                    }
                });
            });
        }
        Dialog::ArchiveDestination { entries, dest } => {
            window("Save Archive").show(ctx, |ui| {
                ui.label(format!("{} files will be compressed to:", entries.len()));
                ui.add(egui::TextEdit::singleline(&mut *dest).desired_width(420.0));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        action = DialogAction::Close;
                    }
                    let ready = !dest.trim().is_empty();
                    if ui.add_enabled(ready, egui::Button::new("Compress")).clicked() {
                        action = DialogAction::Compress(
                            mem::take(entries),
                            PathBuf::from(dest.trim()),
                        );
                    }
                });
            });
        }
        Dialog::ArchiveReady(path) => {
            window("Compression Complete").show(ctx, |ui| {
                ui.label("The archive was written to:");
                ui.monospace(path.display().to_string());
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Open").clicked() {
                        action = DialogAction::Open(path.clone());
                    }
                    if ui.button("Close").clicked() {
                        action = DialogAction::Close;
                    }
                });
            });
        }
        Dialog::Notice { title, body } => {
            window(title.as_str()).show(ctx, |ui| {
                ui.label(body.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    action = DialogAction::Close;
                }
            });
        }
    }
    action
}
