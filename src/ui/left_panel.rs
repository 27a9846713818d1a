//! Left panel UI: selection dropdowns, overlay list, center and export
//! controls.

use crate::export;
use crate::overlay::OverlayId;
use crate::state::AppState;
use crate::ui::colors;
use eframe::egui::{self, RichText};

pub fn render_left_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::left("left_panel")
        .resizable(true)
        .default_width(260.0)
        .min_width(220.0)
        .max_width(400.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Selection");
                ui.separator();
                render_selection_section(ui, state);

                ui.add_space(10.0);
                ui.heading("On canvas");
                ui.separator();
                render_overlay_list(ui, state);

                ui.add_space(10.0);
                render_center_section(ui, state);

                ui.add_space(10.0);
                ui.checkbox(&mut state.view.labels, "Show overlay labels");

                ui.add_space(10.0);
                render_export_section(ui, state);
            });
        });
}

fn render_selection_section(ui: &mut egui::Ui, state: &mut AppState) {
    let categories = state.catalog.categories();
    if categories.is_empty() {
        ui.label("No categories configured.");
        return;
    }

    let mut category_index = state.selection.category_index.min(categories.len() - 1);
    egui::ComboBox::from_id_salt("category_selector")
        .selected_text(categories[category_index].name.clone())
        .width(200.0)
        .show_ui(ui, |ui| {
            for (i, category) in categories.iter().enumerate() {
                ui.selectable_value(&mut category_index, i, &category.name);
            }
        });
    state.selection.select_category(category_index);

    let sub_items = &state.catalog.categories()[state.selection.category_index].sub_items;
    if sub_items.is_empty() {
        ui.label(RichText::new("No features matched this category").color(colors::LABEL));
        return;
    }

    let selection = &mut state.selection;
    selection.sub_item_index = selection.sub_item_index.min(sub_items.len() - 1);
    egui::ComboBox::from_id_salt("sub_item_selector")
        .selected_text(sub_items[selection.sub_item_index].display_name.clone())
        .width(200.0)
        .show_ui(ui, |ui| {
            for (i, sub_item) in sub_items.iter().enumerate() {
                ui.selectable_value(&mut selection.sub_item_index, i, &sub_item.display_name);
            }
        });

    ui.add_space(5.0);
    if ui.button("Add to canvas").clicked() {
        match state.add_selected() {
            Ok(id) => {
                let name = state
                    .session
                    .get(id)
                    .map(|e| e.identity().display_name.clone())
                    .unwrap_or_default();
                state.status_message = format!("Added {name}");
                log::info!("added overlay {id}: {name}");
            }
            Err(e) => {
                state.status_message = e.to_string();
                log::warn!("add failed: {e}");
            }
        }
    }
}

fn render_overlay_list(ui: &mut egui::Ui, state: &mut AppState) {
    if state.session.is_empty() {
        ui.label(RichText::new("Nothing added yet").color(colors::LABEL));
        return;
    }

    let mut to_remove: Option<OverlayId> = None;
    for entry in state.session.list() {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("\u{25CF}").color(colors::parse_hex_color(entry.color())),
            );
            ui.label(&entry.identity().display_name);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{2715}").clicked() {
                    to_remove = Some(entry.id());
                }
            });
        });
    }

    if let Some(id) = to_remove {
        match state.remove_overlay(id) {
            Ok(()) => {
                state.status_message = "Removed overlay".to_string();
                log::info!("removed overlay {id}");
            }
            Err(e) => {
                state.status_message = e.to_string();
                log::warn!("remove failed: {e}");
            }
        }
    }
}

fn render_center_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Projection center").strong())
        .default_open(false)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Lon");
                ui.add(
                    egui::TextEdit::singleline(&mut state.center_lon_input)
                        .desired_width(80.0),
                );
                ui.label("Lat");
                ui.add(
                    egui::TextEdit::singleline(&mut state.center_lat_input)
                        .desired_width(80.0),
                );
            });

            if ui.button("Re-center and re-project").clicked() {
                match state.apply_center() {
                    Ok(()) => {
                        state.status_message = "Re-projected all overlays".to_string();
                        log::info!(
                            "re-centered to ({}, {})",
                            state.center_lon_input,
                            state.center_lat_input
                        );
                    }
                    Err(e) => {
                        state.status_message = e.to_string();
                        log::warn!("re-center failed: {e}");
                    }
                }
            }
        });
}

fn render_export_section(ui: &mut egui::Ui, state: &mut AppState) {
    let can_export = !state.session.is_empty();
    ui.add_enabled_ui(can_export, |ui| {
        if ui.button("Export HTML\u{2026}").clicked() {
            let picked = rfd::FileDialog::new()
                .set_title("Export overlay")
                .set_file_name("overlay.html")
                .save_file();

            if let Some(path) = picked {
                let html = export::export_html(&state.session, &state.config.title);
                match std::fs::write(&path, html) {
                    Ok(()) => {
                        state.status_message = format!("Wrote {}", path.display());
                        log::info!("exported overlay to {}", path.display());
                    }
                    Err(e) => {
                        state.status_message = format!("Export failed: {e}");
                        log::warn!("export failed: {e}");
                    }
                }
            }
        }
    });
}
