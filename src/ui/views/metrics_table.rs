use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::forecast::evaluate::{metrics_table, MetricsRow};
use crate::forecast::Model;
use crate::state::AppState;
use crate::ui::plot;

/// Series × model accuracy over the selected range.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };

    let selected = state.selected.clone();
    let rows = metrics_table(&sub, &selected, &Model::available(), |name, model| {
        state.model_run(name, model)
    });
    if rows.is_empty() {
        plot::placeholder(ui, "Ningún modelo pudo ajustarse en el rango seleccionado.");
        return;
    }
    let (start, end, pages) = super::page_bounds(rows.len(), &mut state.metrics_page, super::ROWS_PER_PAGE);
    ui.push_id("metrics_table", |ui: &mut Ui| table(ui, &rows[start..end]));
    super::pager(ui, &mut state.metrics_page, pages);
}

fn table(ui: &mut Ui, rows: &[MetricsRow]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(110.0))
        .column(Column::auto().at_least(100.0))
        .columns(Column::auto().at_least(80.0), 3)
        .header(20.0, |mut header| {
            for title in ["Serie", "Modelo", "MAE", "RMSE", "MAPE (%)"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for r in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&r.series);
                    });
                    row.col(|ui| {
                        ui.label(r.model.label());
                    });
                    row.col(|ui| {
                        ui.label(plot::fmt_thousands(r.mae));
                    });
                    row.col(|ui| {
                        ui.label(plot::fmt_thousands(r.rmse));
                    });
                    row.col(|ui| {
                        ui.label(if r.mape.is_finite() {
                            format!("{:.2}", r.mape)
                        } else {
                            "–".to_string()
                        });
                    });
                });
            }
        });
}
