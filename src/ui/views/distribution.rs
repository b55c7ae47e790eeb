use chrono::Datelike;
use eframe::egui::{RichText, Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Plot, PlotPoints, Points, Polygon};

use crate::color;
use crate::state::{AppState, DistributionKind};
use crate::stats::describe::{gaussian_kde, BoxSummary};
use crate::ui::plot;

const MONTH_LABELS: [&str; 12] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"];
const VIOLIN_HALF_WIDTH: f64 = 0.4;

/// Box or violin of each selected series by calendar month.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut state.distribution, DistributionKind::Box, "Caja");
        ui.radio_value(&mut state.distribution, DistributionKind::Violin, "Violín");
    });

    let columns = &sub.columns;
    let mut drawn = 0;
    for name in &state.selected {
        let mut by_month: Vec<Vec<f64>> = vec![Vec::new(); 12];
        for (date, v) in sub.series(name) {
            by_month[date.month0() as usize].push(v);
        }
        if by_month.iter().all(Vec::is_empty) {
            continue;
        }
        drawn += 1;

        let idx = columns.iter().position(|c| c == name).unwrap_or(0);
        let color = color::series_color(name, idx, columns.len());
        ui.label(RichText::new(name).strong());

        Plot::new(format!("distribution_{name}"))
            .height(300.0)
            .x_axis_label("Mes")
            .y_axis_label("Valor")
            .x_axis_formatter(|mark, _range| {
                let i = mark.value.round();
                if (mark.value - i).abs() > 1e-6 || !(1.0..=12.0).contains(&i) {
                    return String::new();
                }
                MONTH_LABELS[i as usize - 1].to_string()
            })
            .y_axis_formatter(plot::thousands_axis_formatter)
            .show(ui, |plot_ui| match state.distribution {
                DistributionKind::Box => {
                    for (m, values) in by_month.iter().enumerate() {
                        let Some(summary) = BoxSummary::from_values(values) else {
                            continue;
                        };
                        let x = (m + 1) as f64;
                        let elem = BoxElem::new(
                            x,
                            BoxSpread::new(
                                summary.lower_whisker,
                                summary.q1,
                                summary.median,
                                summary.q3,
                                summary.upper_whisker,
                            ),
                        )
                        .box_width(0.5)
                        .fill(color.gamma_multiply(0.3))
                        .stroke(Stroke::new(1.5, color));
                        plot_ui.box_plot(BoxPlot::new(vec![elem]).name(format!("Mes {}", m + 1)));

                        if !summary.outliers.is_empty() {
                            let pts: PlotPoints = summary.outliers.iter().map(|v| [x, *v]).collect();
                            plot_ui.points(Points::new(pts).radius(2.5).color(color));
                        }
                    }
                }
                DistributionKind::Violin => {
                    for (m, values) in by_month.iter().enumerate() {
                        if let Some(outline) = violin_outline((m + 1) as f64, values) {
                            plot_ui.polygon(
                                Polygon::new(outline)
                                    .fill_color(color.gamma_multiply(0.35))
                                    .stroke(Stroke::new(1.0, color)),
                            );
                        }
                    }
                }
            });
    }

    if drawn == 0 {
        plot::placeholder(ui, "Sin datos para las series seleccionadas.");
    }
}

/// Mirrored KDE around `x`, scaled so the widest point spans
/// `2 * VIOLIN_HALF_WIDTH`. Months with a single distinct value get no violin.
fn violin_outline(x: f64, values: &[f64]) -> Option<Vec<[f64; 2]>> {
    let curve = gaussian_kde(values, 64)?;
    let peak = curve.iter().map(|(_, d)| *d).fold(0.0, f64::max);
    if peak <= 0.0 {
        return None;
    }
    let scale = VIOLIN_HALF_WIDTH / peak;
    let right = curve.iter().map(|(y, d)| [x + d * scale, *y]);
    let left = curve.iter().rev().map(|(y, d)| [x - d * scale, *y]);
    Some(right.chain(left).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violin_is_symmetric_and_bounded() {
        let values: Vec<f64> = (0..40).map(|i| (i % 7) as f64 * 3.0).collect();
        let outline = violin_outline(5.0, &values).unwrap();
        assert_eq!(outline.len(), 128);
        assert!(outline
            .iter()
            .all(|[x, _]| (x - 5.0).abs() <= VIOLIN_HALF_WIDTH + 1e-9));
        assert!((outline[0][0] - 5.0 + (outline[127][0] - 5.0)).abs() < 1e-9);
        assert!(violin_outline(1.0, &[2.0]).is_none());
    }
}
