use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoint, Polygon};

use crate::color;
use crate::data::filter::{month_year_pivot, MonthYearGrid};
use crate::state::AppState;
use crate::ui::plot;

const MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// One month × year heatmap per selected series.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };
    ui.checkbox(&mut state.shared_heatmap_scale, "Escala de color compartida");

    let grids: Vec<(String, Option<MonthYearGrid>)> = state
        .selected
        .iter()
        .map(|name| (name.clone(), month_year_pivot(&sub, name)))
        .collect();

    let shared = if state.shared_heatmap_scale {
        grids
            .iter()
            .filter_map(|(_, g)| g.as_ref()?.value_range())
            .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)))
    } else {
        None
    };

    for (name, grid) in &grids {
        ui.label(RichText::new(name).strong());
        let Some((grid, (lo, hi))) = grid
            .as_ref()
            .and_then(|g| Some((g, shared.or_else(|| g.value_range())?)))
        else {
            plot::placeholder(ui, &format!("Sin datos para {name} en el rango."));
            continue;
        };
        heatmap_plot(ui, name, grid, lo, hi);
        plot::color_bar(ui, lo, hi);
        ui.add_space(8.0);
    }
}

fn heatmap_plot(ui: &mut Ui, name: &str, grid: &MonthYearGrid, lo: f64, hi: f64) {
    let years = grid.years.clone();
    let hover_grid = grid.clone();
    let span = if hi > lo { hi - lo } else { 1.0 };

    Plot::new(format!("heatmap_{name}"))
        .height(300.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_grid(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            years.get(i as usize).map(|y| y.to_string()).unwrap_or_default()
        })
        .y_axis_formatter(|mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || !(0.0..12.0).contains(&i) {
                return String::new();
            }
            MONTHS[i as usize].to_string()
        })
        .label_formatter(move |_name, value| cell_label(&hover_grid, value))
        .show(ui, |plot_ui| {
            for (m, row) in grid.cells.iter().enumerate() {
                for (y, v) in row.iter().enumerate() {
                    let fill = if v.is_nan() {
                        Color32::TRANSPARENT
                    } else {
                        color::heat_color((v - lo) / span)
                    };
                    let (x0, y0) = (y as f64 - 0.5, m as f64 - 0.5);
                    let cell = vec![[x0, y0], [x0 + 1.0, y0], [x0 + 1.0, y0 + 1.0], [x0, y0 + 1.0]];
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, egui::Color32::from_gray(250))),
                    );
                }
            }
        });
}

fn cell_label(grid: &MonthYearGrid, at: &PlotPoint) -> String {
    let (col, row) = (at.x.round(), at.y.round());
    if col < 0.0 || !(0.0..12.0).contains(&row) {
        return String::new();
    }
    let Some(year) = grid.years.get(col as usize) else {
        return String::new();
    };
    let value = grid.cells[row as usize][col as usize];
    format!("Año {year}\nMes {}\n{}", MONTHS[row as usize], plot::fmt_thousands(value))
}
