use crate::style;
use crate::ui::GuiState;
use eframe::egui;

/// Render the bottom status bar.
pub fn show(ctx: &egui::Context, state: &GuiState) {
    egui::TopBottomPanel::bottom("bottom_status")
        .resizable(false)
        .show(ctx, |ui| {
            let total = state.records.len();
            let shown = state.visible_indices().len();
            let checked = state.checked_count();
            let last = state.status_msgs.last().map(String::as_str).unwrap_or("Ready.");

            ui.horizontal(|ui| {
                ui.set_height(28.0);
                ui.label(
                    egui::RichText::new(format!(
                        "Files: {}  •  Shown: {}  •  Selected: {}",
                        total, shown, checked
                    ))
                    .color(style::MUTED)
                    .monospace(),
                );
                ui.separator();
                ui.label(egui::RichText::new(last).color(style::MUTED));
            });
        });
}
