use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{HLine, Legend, LineStyle, MarkerShape, Plot, PlotPoints, Points};

use crate::color;
use crate::config::{THRESHOLD_MAX, THRESHOLD_MIN};
use crate::state::AppState;
use crate::stats::rolling::{flag_anomalies, zscores, AnomalyRow, WINDOW_OPTIONS};
use crate::ui::plot::{self, date_to_x};

/// Rows kept in the anomaly table.
const TABLE_LIMIT: usize = 200;

/// Rolling z-score vs time with anomaly markers, an optional rolling-mean
/// panel and the table of flagged points.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Ventana (meses)");
        for w in WINDOW_OPTIONS {
            ui.radio_value(&mut state.anomaly.window, w, w.to_string());
        }
        ui.separator();
        ui.add(
            egui::Slider::new(&mut state.anomaly.threshold, THRESHOLD_MIN..=THRESHOLD_MAX)
                .step_by(0.1)
                .text("Umbral |z|"),
        );
        ui.separator();
        ui.checkbox(&mut state.anomaly.show_rolling_mean, "Mostrar media móvil");
    });

    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };

    let window = state.anomaly.window;
    let threshold = state.anomaly.threshold;
    let columns = &sub.columns;
    let scan = state.anomalies();
    let per_series = &scan.series;
    let rows = &scan.rows;
    if per_series.is_empty() {
        plot::placeholder(ui, "Sin datos modelables para las series seleccionadas.");
        return;
    }

    Plot::new("anomaly_z_plot")
        .height(380.0)
        .legend(Legend::default())
        .y_axis_label("z-score")
        .x_axis_formatter(plot::date_axis_formatter)
        .label_formatter(|name, value| {
            let date = plot::x_to_date(value.x).map(|d| d.to_string()).unwrap_or_default();
            format!("{name}\n{date}\nz = {:.2}", value.y)
        })
        .show(ui, |plot_ui| {
            for (name, points) in per_series {
                let idx = columns.iter().position(|c| c == name).unwrap_or(0);
                let color = color::series_color(name, idx, columns.len());
                let z = zscores(points, window);
                let pts: PlotPoints = z.iter().map(|p| [date_to_x(p.date), p.z]).collect();
                plot_ui.points(Points::new(pts).radius(2.5).color(color).name(name));

                let flagged = flag_anomalies(&z, threshold);
                if !flagged.is_empty() {
                    let marks: PlotPoints =
                        flagged.iter().map(|p| [date_to_x(p.date), p.z]).collect();
                    plot_ui.points(
                        Points::new(marks)
                            .shape(MarkerShape::Up)
                            .filled(true)
                            .radius(5.0)
                            .color(color::ANOMALY)
                            .name(format!("{name} anomalías")),
                    );
                }
            }
            plot_ui.hline(HLine::new(0.0).color(color::GUIDE).style(LineStyle::dotted_dense()));
            for y in [threshold, -threshold] {
                plot_ui.hline(HLine::new(y).color(color::GUIDE).style(LineStyle::dashed_loose()));
            }
        });

    if state.anomaly.show_rolling_mean {
        Plot::new("anomaly_mean_plot")
            .height(160.0)
            .y_axis_label("Media móvil")
            .x_axis_formatter(plot::date_axis_formatter)
            .y_axis_formatter(plot::thousands_axis_formatter)
            .label_formatter(plot::date_value_label)
            .show(ui, |plot_ui| {
                for (name, points) in per_series {
                    let idx = columns.iter().position(|c| c == name).unwrap_or(0);
                    let means = zscores(points, window).into_iter().map(|p| (p.date, p.mean));
                    plot_ui.line(
                        plot::date_line(means)
                            .name(name)
                            .color(color::series_color(name, idx, columns.len()))
                            .style(LineStyle::dashed_dense()),
                    );
                }
            });
    }

    ui.label(RichText::new("Anomalías detectadas (|z| ≥ umbral)").strong());
    if rows.is_empty() {
        ui.label(RichText::new("Sin anomalías con el umbral actual.").italics());
        return;
    }
    let shown = &rows[..rows.len().min(TABLE_LIMIT)];
    let (start, end, pages) = super::page_bounds(shown.len(), &mut state.anomaly.page, super::ROWS_PER_PAGE);
    ui.push_id("anomaly_table", |ui: &mut Ui| anomaly_rows(ui, &shown[start..end]));
    super::pager(ui, &mut state.anomaly.page, pages);
}

fn anomaly_rows(ui: &mut Ui, rows: &[AnomalyRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(110.0))
        .columns(Column::auto().at_least(80.0), 4)
        .header(20.0, |mut header| {
            for title in ["fecha", "serie", "valor", "media", "resid", "z"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for r in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(r.date.to_string());
                    });
                    row.col(|ui| {
                        ui.label(&r.series);
                    });
                    for v in [r.value, r.mean, r.resid] {
                        row.col(|ui| {
                            ui.label(plot::fmt_thousands(v));
                        });
                    }
                    row.col(|ui| {
                        ui.label(format!("{:.2}", r.z));
                    });
                });
            }
        });
}
