use eframe::egui::Ui;
use egui_plot::{Legend, Plot, PlotPoints, Points};

use crate::color;
use crate::state::AppState;
use crate::ui::plot::{self, date_to_x};

/// Every selected series as line + points in one chart; colour by fuel,
/// dash by flow.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };
    let columns = &sub.columns;

    Plot::new("seasonality_plot")
        .height(400.0)
        .legend(Legend::default().position(egui_plot::Corner::LeftTop))
        .y_axis_label("Valor")
        .x_axis_formatter(plot::date_axis_formatter)
        .y_axis_formatter(plot::thousands_axis_formatter)
        .label_formatter(plot::date_value_label)
        .show(ui, |plot_ui| {
            for name in &state.selected {
                let idx = columns.iter().position(|c| c == name).unwrap_or(0);
                let color = color::series_color(name, idx, columns.len());
                let series = sub.series(name);
                if series.is_empty() {
                    continue;
                }

                plot_ui.line(
                    plot::date_line(series.iter().copied())
                        .name(name)
                        .color(color)
                        .style(color::series_line_style(name))
                        .width(2.0),
                );
                let pts: PlotPoints = series.iter().map(|(d, v)| [date_to_x(*d), *v]).collect();
                plot_ui.points(Points::new(pts).radius(2.5).color(color.gamma_multiply(0.85)));
            }
        });
}
