//! Light theme and fonts for the egui window.

use eframe::{egui, epaint};
use std::fs;
use std::sync::Arc;

/// Emphasized search-term color inside matched lines.
pub const EMPHASIS: epaint::Color32 = epaint::Color32::from_rgb(214, 92, 0);
/// Matched-line rows under a file.
pub const MATCH_LINE: epaint::Color32 = epaint::Color32::from_rgb(90, 94, 110);
/// Destructive buttons.
pub const DANGER: epaint::Color32 = epaint::Color32::from_rgb(220, 68, 68);
pub const MUTED: epaint::Color32 = epaint::Color32::from_rgb(110, 112, 124);

/// Apply the light theme to the current egui Context.
pub fn apply_theme(ctx: &egui::Context) {
    use egui::Visuals;

    let mut visuals = Visuals::light();
    visuals.window_fill = epaint::Color32::from_rgb(236, 236, 236);
    visuals.panel_fill = epaint::Color32::from_rgb(255, 255, 255);
    visuals.faint_bg_color = epaint::Color32::from_rgb(246, 247, 249);
    visuals.widgets.active.bg_fill = epaint::Color32::from_rgb(254, 229, 0);
    visuals.widgets.active.fg_stroke = epaint::Stroke::new(1.0, epaint::Color32::BLACK);
    visuals.widgets.hovered.bg_fill = epaint::Color32::from_rgb(245, 245, 247);
    visuals.widgets.noninteractive.bg_fill = epaint::Color32::from_rgb(255, 255, 255);
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    ctx.set_style(style);
}

/// File names are mostly Korean; egui's bundled fonts have no Hangul, so
/// fall back to a system font when one is found.
pub fn install_fonts(ctx: &egui::Context) {
    let Some(bytes) = HANGUL_FONTS.iter().find_map(|p| fs::read(p).ok()) else {
        log::warn!("No Hangul font found; Korean names may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("hangul".into(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("hangul".into());
    }
    ctx.set_fonts(fonts);
}

const HANGUL_FONTS: &[&str] = &[
    r"C:\Windows\Fonts\malgun.ttf",
    r"C:\Windows\Fonts\gulim.ttc",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
];
