//! Top bar UI: app title, projection center, and status.

use crate::state::AppState;
use crate::ui::colors;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new(&state.config.title)
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                let center_text = match state.session.center() {
                    Some(c) => format!(
                        "center ({:.3}, {:.3})",
                        c.point().lon,
                        c.point().lat
                    ),
                    None => "no projection center".to_string(),
                };
                ui.label(
                    RichText::new(center_text)
                        .monospace()
                        .size(12.0)
                        .color(colors::LABEL),
                );

                ui.separator();

                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });
}
