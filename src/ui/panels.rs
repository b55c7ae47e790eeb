use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::config::DashboardConfig;
use crate::data::filter::{DateRange, Epoch, Frequency};
use crate::state::{AppState, Panel};

// ---------------------------------------------------------------------------
// Left side panel – shared widgets
// ---------------------------------------------------------------------------

/// Render the left panel: series, dates, frequency, epoch and panel toggles.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No hay datos cargados.");
        return;
    };
    let columns = table.columns.clone();
    let bounds = table.date_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Series ----
            let header = format!("Series  ({}/{})", state.selected.len(), columns.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("series")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });
                    for (i, col) in columns.iter().enumerate() {
                        let swatch = crate::color::series_color(col, i, columns.len());
                        let mut checked = state.is_selected(col);
                        if ui
                            .checkbox(&mut checked, RichText::new(col).color(swatch))
                            .changed()
                        {
                            state.toggle_series(col);
                        }
                    }
                });
            ui.separator();

            // ---- Date range ----
            if let (Some(bounds), Some(range)) = (bounds, state.range) {
                ui.strong("Rango de fechas");
                let mut start = range.start;
                let mut end = range.end;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Desde");
                    ui.add(DatePickerButton::new(&mut start).id_salt("range_start"));
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("Hasta");
                    ui.add(DatePickerButton::new(&mut end).id_salt("range_end"));
                });
                if start != range.start || end != range.end {
                    state.set_range(DateRange::new(start, end));
                }
                if ui.small_button("Reset").clicked() {
                    state.reset_range();
                }
                ui.label(
                    RichText::new(format!("Datos: {} .. {}", bounds.0, bounds.1))
                        .small()
                        .color(Color32::GRAY),
                );
                ui.separator();
            }

            // ---- Frequency / epoch ----
            ui.strong("Frecuencia");
            ui.horizontal(|ui: &mut Ui| {
                for freq in Frequency::ALL {
                    ui.radio_value(&mut state.frequency, freq, freq.label());
                }
            });
            ui.strong("Época");
            ui.horizontal(|ui: &mut Ui| {
                for epoch in Epoch::ALL {
                    ui.radio_value(&mut state.epoch, epoch, epoch.label());
                }
            });
            ui.separator();

            // ---- Panel visibility ----
            egui::CollapsingHeader::new(RichText::new("Paneles").strong())
                .id_salt("panels")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for panel in Panel::ALL {
                        let mut visible = state.is_visible(panel);
                        if ui.checkbox(&mut visible, panel.title()).changed() {
                            state.set_visible(panel, visible);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });
        ui.menu_button("View", |ui: &mut Ui| {
            if ui.button("Save defaults").clicked() {
                save_defaults(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let span = table
                .date_bounds()
                .map(|(s, e)| format!("{s} .. {e}"))
                .unwrap_or_default();
            ui.label(format!(
                "{} filas, {} series, {span}",
                table.len(),
                table.columns.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir datos de combustibles")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn save_defaults(state: &mut AppState) {
    let path = DashboardConfig::path();
    match state.to_config().save(&path) {
        Ok(()) => state.status_message = Some(format!("Guardado en {}", path.display())),
        Err(e) => {
            log::error!("Failed to save config: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
