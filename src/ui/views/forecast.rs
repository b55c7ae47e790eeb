use eframe::egui::{RichText, Ui};
use egui_plot::{Legend, Plot};

use crate::color;
use crate::forecast::Model;
use crate::state::AppState;
use crate::ui::plot;

/// Model checkboxes shared with the performance panel.
pub fn model_selector(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Modelos");
        for model in Model::available() {
            let mut checked = state.models.contains(&model);
            if ui.checkbox(&mut checked, model.label()).changed() {
                state.toggle_model(model);
            }
        }
    });
}

/// Actual values with in-sample fitted overlays of the selected models.
pub fn show(ui: &mut Ui, state: &mut AppState) {
    model_selector(ui, state);
    let Some(sub) = super::sliced_or_placeholder(ui, state) else {
        return;
    };

    let columns = sub.columns.clone();
    let selected = state.selected.clone();
    let models: Vec<Model> = state.models.iter().copied().collect();

    // (name, colour, actual, [(model, fitted)])
    let mut layers = Vec::new();
    let mut skipped = Vec::new();
    for name in &selected {
        let actual = sub.series(name);
        if actual.is_empty() {
            continue;
        }
        let idx = columns.iter().position(|c| c == name).unwrap_or(0);
        let mut fits = Vec::new();
        for &model in &models {
            match state.model_run(name, model) {
                Ok(run) => fits.push((model, run)),
                Err(e) => skipped.push(format!("{} · {name}: {e}", model.label())),
            }
        }
        let color = color::series_color(name, idx, columns.len());
        layers.push((name.clone(), color, actual, fits));
    }
    if layers.is_empty() {
        plot::placeholder(ui, "No hay datos modelables para las series seleccionadas.");
        return;
    }

    Plot::new("real_vs_predicted_plot")
        .height(400.0)
        .legend(Legend::default().position(egui_plot::Corner::LeftTop))
        .y_axis_label("Valor")
        .x_axis_formatter(plot::date_axis_formatter)
        .y_axis_formatter(plot::thousands_axis_formatter)
        .label_formatter(plot::date_value_label)
        .show(ui, |plot_ui| {
            for (name, color, actual, fits) in &layers {
                plot_ui.line(
                    plot::date_line(actual.iter().copied())
                        .name(format!("{name} (Real)"))
                        .color(*color)
                        .width(2.0),
                );
                for (model, run) in fits {
                    let fitted = actual.iter().map(|(d, _)| *d).zip(run.fitted.iter().copied());
                    plot_ui.line(
                        plot::date_line(fitted)
                            .name(format!("{name} · {}", model.label()))
                            .color(color.gamma_multiply(0.9))
                            .style(color::model_line_style(*model))
                            .width(1.5),
                    );
                }
            }
        });

    for (name, _, _, fits) in &layers {
        for (model, run) in fits {
            if let Some((a, b, g)) = run.smoothing_params() {
                ui.label(
                    RichText::new(format!("{} · {name}: α={a:.3} β={b:.3} γ={g:.3}", model.label()))
                        .small()
                        .weak(),
                );
            }
        }
    }
    for note in skipped {
        ui.label(RichText::new(note).small().weak());
    }
}
