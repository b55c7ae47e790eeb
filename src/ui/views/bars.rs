use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color;
use crate::data::filter::{group_by_period, to_shares, PeriodKind};
use crate::state::{AppState, BarMode};
use crate::ui::plot;

const ALL_PRODUCTS: &str = "(Todos)";

/// Stacked bars of the selected series by year or quarter.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        for mode in [BarMode::Value, BarMode::Share] {
            ui.radio_value(&mut state.bars.mode, mode, mode.label());
        }
        ui.separator();
        for kind in PeriodKind::ALL {
            ui.radio_value(&mut state.bars.kind, kind, kind.label());
        }
        ui.separator();

        let current = state.bars.active_product.clone();
        let mut picked = None;
        egui::ComboBox::from_id_salt("active_product")
            .selected_text(current.as_deref().unwrap_or(ALL_PRODUCTS))
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(current.is_none(), ALL_PRODUCTS).clicked() {
                    picked = Some(None);
                }
                for name in &state.selected {
                    if ui
                        .selectable_label(current.as_deref() == Some(name.as_str()), name)
                        .clicked()
                    {
                        picked = Some(Some(name.clone()));
                    }
                }
            });
        ui.label("Producto activo");
        if let Some(product) = picked {
            state.set_active_product(product);
        }
    });

    let selected = state.selected.clone();
    let mut periods = group_by_period(&sub, &selected, state.bars.kind);
    if state.bars.mode == BarMode::Share {
        periods = to_shares(&periods);
    }
    if periods.is_empty() {
        plot::placeholder(ui, super::NO_DATA);
        return;
    }

    let labels: Vec<String> = periods.iter().map(|p| p.label.clone()).collect();
    let share = state.bars.mode == BarMode::Share;
    let columns = &sub.columns;

    Plot::new("bars_plot")
        .height(380.0)
        .legend(Legend::default())
        .y_axis_label(if share { "% del total" } else { "Valor" })
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .y_axis_formatter(move |mark, _range| {
            if share {
                format!("{:.0}%", mark.value)
            } else {
                plot::fmt_thousands(mark.value)
            }
        })
        .show(ui, |plot_ui| {
            let mut charts: Vec<BarChart> = Vec::with_capacity(selected.len());
            for (s, name) in selected.iter().enumerate() {
                let idx = columns.iter().position(|c| c == name).unwrap_or(s);
                let fill = color::series_color(name, idx, columns.len());
                let bars: Vec<Bar> = periods
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Bar::new(i as f64, p.totals[s]).width(0.7).name(&p.label))
                    .collect();
                let mut chart = BarChart::new(bars).name(name).color(fill);
                if !charts.is_empty() {
                    let below: Vec<&BarChart> = charts.iter().collect();
                    chart = chart.stack_on(&below);
                }
                charts.push(chart);
            }
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
