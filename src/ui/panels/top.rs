use eframe::egui;

use crate::ui::tasks;
use crate::ui::GuiState;

/// Render the header with the search bar.
pub fn show(ctx: &egui::Context, state: &mut GuiState) {
    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.heading(format!("Talk Cleaner v{}", env!("CARGO_PKG_VERSION")));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(state.root_dir.display().to_string())
                        .color(crate::style::MUTED),
                );
            });
        });
        ui.add_space(6.0);

        let idle = !state.task_running();
        ui.horizontal(|ui| {
            ui.label("Search:");
            let field = ui.add_enabled(
                idle,
                egui::TextEdit::singleline(&mut state.search_input)
                    .hint_text("file name or text")
                    .desired_width(320.0),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.add_enabled(idle, egui::Button::new("Search")).clicked() || submitted {
                let term = state.search_input.clone();
                tasks::spawn_search(state, &term);
            }
            if ui.add_enabled(idle, egui::Button::new("Reset")).clicked() {
                state.reset_search();
            }
        });
        ui.add_space(6.0);
    });
}
