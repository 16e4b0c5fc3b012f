use eframe::egui;

use crate::core::launch::open_path;
use crate::style;
use crate::ui::dialogs::{self, DeleteScope};
use crate::ui::tasks;
use crate::ui::GuiState;

const BUTTON_SIZE: [f32; 2] = [180.0, 28.0];

/// Render the right-hand action panel and, while a task runs, its progress.
pub fn show(ctx: &egui::Context, state: &mut GuiState) {
    egui::SidePanel::right("actions")
        .resizable(false)
        .exact_width(200.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("ACTIONS").strong().size(16.0));
            ui.separator();

            let idle = !state.task_running();

            let mut all = state.all_checked();
            if ui
                .add_enabled(
                    idle && !state.records.is_empty(),
                    egui::Checkbox::new(&mut all, "Select all"),
                )
                .changed()
            {
                state.set_all_checked(all);
            }
            ui.add_space(6.0);

            if danger_button(ui, idle, "Delete all").clicked() {
                state.dialog = Some(dialogs::delete_dialog(state, DeleteScope::All));
            }
            if danger_button(ui, idle, "Delete selected").clicked() {
                state.dialog = Some(dialogs::delete_dialog(state, DeleteScope::Selected));
            }
            if action_button(ui, true, "Open selected").clicked() {
                open_selected(state);
            }
            if action_button(ui, idle, "Compress").clicked() {
                state.dialog = Some(dialogs::compress_dialog(state));
            }
            if action_button(ui, idle, "Refresh").clicked() {
                tasks::spawn_refresh(state);
            }

            let running = state
                .active
                .as_ref()
                .map(|a| (a.kind(), a.is_cancel_requested()));
            if let Some((kind, cancelling)) = running {
                ui.add_space(12.0);
                ui.separator();
                let fraction = state.progress.map(|p| p.fraction()).unwrap_or(0.0);

                ui.label(tasks::progress_label(kind, state.progress.as_ref()));
                ui.add(
                    egui::ProgressBar::new(fraction)
                        .desired_height(6.0)
                        .animate(state.progress.is_none()),
                );
                ui.add_space(4.0);
                let label = if cancelling { "Cancelling..." } else { "Cancel" };
                if action_button(ui, !cancelling, label).clicked() {
                    tasks::cancel_active(state);
                }
            }
        });
}

fn action_button(ui: &mut egui::Ui, enabled: bool, label: &str) -> egui::Response {
    ui.add_enabled(enabled, egui::Button::new(label).min_size(BUTTON_SIZE.into()))
}

fn danger_button(ui: &mut egui::Ui, enabled: bool, label: &str) -> egui::Response {
    ui.add_enabled(
        enabled,
        egui::Button::new(egui::RichText::new(label).color(egui::Color32::WHITE))
            .fill(style::DANGER)
            .min_size(BUTTON_SIZE.into()),
    )
}

fn open_selected(state: &mut GuiState) {
    let paths = state.checked_paths();
    if paths.is_empty() {
        state.dialog = Some(dialogs::Dialog::notice("Open", "No files are selected."));
        return;
    }
    for path in paths {
        if let Err(e) = open_path(&path) {
            state.push_status(format!("{:#}", e));
        }
    }
}
