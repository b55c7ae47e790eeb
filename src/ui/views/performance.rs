use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color;
use crate::forecast::evaluate::{horizon_errors, mean_curve, residuals, MAX_HORIZON};
use crate::forecast::Model;
use crate::state::{AppState, PerfMetric, ResidualPlot};
use crate::stats::describe::{gaussian_kde, histogram};
use crate::stats::rolling::{centered_smooth, cumulative_mean};
use crate::ui::plot;

const RESIDUAL_BINS: usize = 40;

struct ModelCurves {
    model: Model,
    horizons: Vec<usize>,
    /// Metric per horizon after accumulation and smoothing.
    curve: Vec<f64>,
    residuals: Vec<f64>,
}

/// Error by horizon for the models chosen in the real-vs-predicted panel,
/// plus one residual panel per model.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    let opts = &mut state.performance;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut opts.metric, PerfMetric::Rmse, "RMSE");
        ui.radio_value(&mut opts.metric, PerfMetric::Mae, "MAE");
        ui.separator();
        ui.toggle_value(&mut opts.accumulated, "Acumulado");
        ui.separator();
        ui.add(egui::Slider::new(&mut opts.smoothing, 0..=6).text("Suavizado"));
        ui.separator();
        ui.radio_value(&mut opts.residual_plot, ResidualPlot::Histogram, "Histograma");
        ui.radio_value(&mut opts.residual_plot, ResidualPlot::Density, "Densidad");
    });

    if state.models.is_empty() {
        plot::placeholder(ui, "Marca al menos un modelo en Real vs predicho.");
        return;
    }
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };

    let opts = state.performance.clone();
    let models: Vec<Model> = state.models.iter().copied().collect();
    let selected = state.selected.clone();
    let mut results = Vec::with_capacity(models.len());
    for model in models {
        let mut curves = Vec::new();
        let mut resid = Vec::new();
        for name in &selected {
            let values: Vec<f64> = sub.series(name).into_iter().map(|(_, v)| v).collect();
            let Ok(run) = state.model_run(name, model) else {
                continue;
            };
            curves.push(horizon_errors(&run, &values, MAX_HORIZON));
            resid.extend(residuals(&run, &values));
        }
        if curves.is_empty() {
            continue;
        }

        let mean = mean_curve(&curves);
        let raw: Vec<f64> = mean
            .iter()
            .map(|e| match opts.metric {
                PerfMetric::Rmse => e.rmse,
                PerfMetric::Mae => e.mae,
            })
            .collect();
        let accumulated = if opts.accumulated { cumulative_mean(&raw) } else { raw };
        results.push(ModelCurves {
            model,
            horizons: mean.iter().map(|e| e.h).collect(),
            curve: centered_smooth(&accumulated, opts.smoothing),
            residuals: resid,
        });
    }
    if results.is_empty() {
        plot::placeholder(ui, "Ningún modelo pudo ajustarse en el rango seleccionado.");
        return;
    }

    let metric_label = match opts.metric {
        PerfMetric::Rmse => "RMSE",
        PerfMetric::Mae => "MAE",
    };
    Plot::new("performance_plot")
        .height(320.0)
        .legend(Legend::default().position(egui_plot::Corner::LeftTop))
        .x_axis_label("Horizonte (pasos)")
        .y_axis_label(metric_label)
        .y_axis_formatter(plot::thousands_axis_formatter)
        .show(ui, |plot_ui| {
            for r in &results {
                let c = color::model_color(r.model);
                let pts: Vec<[f64; 2]> = r
                    .horizons
                    .iter()
                    .zip(&r.curve)
                    .filter(|(_, v)| v.is_finite())
                    .map(|(h, v)| [*h as f64, *v])
                    .collect();
                plot_ui.line(Line::new(PlotPoints::from(pts.clone())).name(r.model.label()).color(c).width(3.0));
                plot_ui.points(Points::new(pts).radius(3.0).color(c));
            }
        });

    for r in &results {
        ui.label(RichText::new(format!("Residual · {}", r.model.label())).strong());
        residual_plot(ui, r, opts.residual_plot);
    }
}

fn residual_plot(ui: &mut Ui, r: &ModelCurves, kind: ResidualPlot) {
    let c = color::model_color(r.model);
    if r.residuals.is_empty() {
        plot::placeholder(ui, "Sin residuales.");
        return;
    }
    Plot::new(format!("residuals_{}", r.model.label()))
        .height(220.0)
        .x_axis_label("Residual")
        .y_axis_label(match kind {
            ResidualPlot::Histogram => "Frecuencia",
            ResidualPlot::Density => "Densidad",
        })
        .x_axis_formatter(plot::thousands_axis_formatter)
        .show(ui, |plot_ui| match kind {
            ResidualPlot::Histogram => {
                let bars: Vec<Bar> = histogram(&r.residuals, RESIDUAL_BINS)
                    .into_iter()
                    .map(|(lo, hi, n)| Bar::new((lo + hi) / 2.0, n as f64).width(hi - lo))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(c.gamma_multiply(0.65)));
            }
            ResidualPlot::Density => {
                if let Some(curve) = gaussian_kde(&r.residuals, 200) {
                    let pts: PlotPoints = curve.into_iter().map(|(x, d)| [x, d]).collect();
                    plot_ui.line(Line::new(pts).color(c).width(2.0));
                }
            }
        });
}
