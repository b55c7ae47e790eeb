//! One module per chart section. Each renders from the shared [`AppState`]
//! and falls back to a placeholder when there is nothing to draw.

pub mod anomalies;
pub mod bars;
pub mod distribution;
pub mod forecast;
pub mod heatmap;
pub mod metrics_table;
pub mod panorama;
pub mod performance;
pub mod seasonality;

use eframe::egui::Ui;

use crate::data::model::TimeSeriesTable;
use crate::state::{AppState, Panel};
use crate::ui::plot;

pub const NO_SELECTION: &str = "Selecciona al menos una serie.";
pub const NO_DATA: &str = "No hay datos en el rango seleccionado.";

/// Render one chart section.
pub fn show(panel: Panel, ui: &mut Ui, state: &mut AppState) {
    plot::section_header(ui, panel.title());
    match panel {
        Panel::Panorama => panorama::show(ui, state),
        Panel::Seasonality => seasonality::show(ui, state),
        Panel::Heatmap => heatmap::show(ui, state),
        Panel::Bars => bars::show(ui, state),
        Panel::Distribution => distribution::show(ui, state),
        Panel::Anomalies => anomalies::show(ui, state),
        Panel::RealVsPredicted => forecast::show(ui, state),
        Panel::Performance => performance::show(ui, state),
        Panel::Metrics => metrics_table::show(ui, state),
    }
}

/// The range-sliced table, or a placeholder and `None` when the selection
/// or the slice is empty.
pub(crate) fn sliced_or_placeholder(ui: &mut Ui, state: &AppState) -> Option<TimeSeriesTable> {
    if state.selected.is_empty() {
        plot::placeholder(ui, NO_SELECTION);
        return None;
    }
    match state.sliced() {
        Some(t) if !t.is_empty() && !t.all_missing(&state.selected) => Some(t),
        _ => {
            plot::placeholder(ui, NO_DATA);
            None
        }
    }
}

pub const ROWS_PER_PAGE: usize = 10;

/// Clamp `page` to the rows available and return the `start..end` slice it
/// covers together with the page count.
pub(crate) fn page_bounds(total: usize, page: &mut usize, per_page: usize) -> (usize, usize, usize) {
    let pages = total.div_ceil(per_page.max(1)).max(1);
    *page = (*page).min(pages - 1);
    let start = *page * per_page;
    (start, (start + per_page).min(total), pages)
}

/// Previous / next buttons under a paginated table.
pub(crate) fn pager(ui: &mut Ui, page: &mut usize, pages: usize) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.add_enabled(*page > 0, eframe::egui::Button::new("◀")).clicked() {
            *page -= 1;
        }
        ui.label(format!("Página {} / {pages}", *page + 1));
        if ui.add_enabled(*page + 1 < pages, eframe::egui::Button::new("▶")).clicked() {
            *page += 1;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_clamped() {
        let mut page = 7;
        assert_eq!(page_bounds(25, &mut page, 10), (20, 25, 3));
        assert_eq!(page, 2);
        let mut page = 0;
        assert_eq!(page_bounds(0, &mut page, 10), (0, 0, 1));
    }
}
