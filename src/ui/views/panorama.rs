use eframe::egui::Ui;
use egui_plot::{Legend, LineStyle, Plot, VLine};

use crate::color;
use crate::data::filter::resample;
use crate::state::AppState;
use crate::ui::plot::{self, date_to_x};

use super::{NO_DATA, NO_SELECTION};

/// Trend panel: epoch cut, resample, then slice by the selected range.
/// Dates flagged by the anomaly scan are marked with vertical lines.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    if state.selected.is_empty() {
        plot::placeholder(ui, NO_SELECTION);
        return;
    }
    let marked = state.anomalies();
    let (Some(table), Some(range)) = (&state.table, state.range) else {
        plot::placeholder(ui, NO_DATA);
        return;
    };

    let agg = resample(&state.epoch.apply(table), state.frequency).slice(&range);
    if agg.is_empty() {
        plot::placeholder(ui, NO_DATA);
        return;
    }

    ui.label(format!(
        "{} · {} · {} anomalías marcadas",
        state.frequency.label(),
        state.epoch.label(),
        marked.dates.len()
    ));

    let columns = &table.columns;
    Plot::new("panorama_plot")
        .height(320.0)
        .legend(Legend::default())
        .y_axis_label("Importación")
        .x_axis_formatter(plot::date_axis_formatter)
        .y_axis_formatter(plot::thousands_axis_formatter)
        .label_formatter(plot::date_value_label)
        .show(ui, |plot_ui| {
            for name in &state.selected {
                let idx = columns.iter().position(|c| c == name).unwrap_or(0);
                let Some(values) = agg.column(name) else {
                    continue;
                };
                let line = plot::date_line(agg.dates.iter().copied().zip(values.iter().copied()))
                    .name(name)
                    .color(color::series_color(name, idx, columns.len()))
                    .width(2.0);
                plot_ui.line(line);
            }

            for date in marked.dates.iter().filter(|d| range.contains(**d)) {
                plot_ui.vline(
                    VLine::new(date_to_x(*date))
                        .color(color::ANOMALY.gamma_multiply(0.5))
                        .style(LineStyle::dotted_loose())
                        .width(1.0),
                );
            }
        });
}
