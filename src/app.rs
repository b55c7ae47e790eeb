use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::{AppState, Panel};
use crate::ui::{panels, plot, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FuelDashboardApp {
    pub state: AppState,
}

impl FuelDashboardApp {
    /// Build the app from the loaded config, opening `csv` right away if given.
    pub fn new(config: &DashboardConfig, csv: Option<std::path::PathBuf>) -> Self {
        let mut state = AppState::from_config(config);
        if let Some(path) = csv {
            state.load_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for FuelDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: shared widgets ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart sections ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.table.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Abre un CSV para ver el tablero  (File → Open…)");
                });
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    for panel in Panel::ALL {
                        if !self.state.is_visible(panel) {
                            continue;
                        }
                        ui.push_id(panel.title(), |ui: &mut Ui| {
                            plot::card(ui, |ui: &mut Ui| views::show(panel, ui, &mut self.state));
                        });
                        ui.add_space(10.0);
                    }
                });
        });
    }
}
