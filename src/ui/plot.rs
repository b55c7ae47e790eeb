use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{GridMark, Line, PlotPoint, PlotPoints};

use crate::color;

// ---------------------------------------------------------------------------
// Date axis
// ---------------------------------------------------------------------------

/// Plot x coordinate of a date (days since 0001-01-01).
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Tick labels for a date x axis.
pub fn date_axis_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    x_to_date(mark.value)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Tick labels with thousands separators.
pub fn thousands_axis_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    fmt_thousands(mark.value)
}

/// Hover text `name\nYYYY-MM-DD: 12,345`.
pub fn date_value_label(name: &str, value: &PlotPoint) -> String {
    let date = x_to_date(value.x)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    if name.is_empty() {
        format!("{date}: {}", fmt_thousands(value.y))
    } else {
        format!("{name}\n{date}: {}", fmt_thousands(value.y))
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Round to an integer and group digits by thousands: `1234567.8` → `1,234,568`.
pub fn fmt_thousands(v: f64) -> String {
    if !v.is_finite() {
        return "–".to_string();
    }
    let rounded = v.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

/// Line through `(date, value)` points, skipping `NaN` values.
pub fn date_line<'a>(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Line<'a> {
    let pts: PlotPoints = points
        .into_iter()
        .filter(|(_, v)| !v.is_nan())
        .map(|(d, v)| [date_to_x(d), v])
        .collect();
    Line::new(pts)
}

/// Heading of a chart section.
pub fn section_header(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).heading().strong());
    ui.add_space(4.0);
}

/// Centered grey message shown instead of a chart.
pub fn placeholder(ui: &mut Ui, text: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(12.0);
        ui.label(RichText::new(text).italics().color(Color32::GRAY));
        ui.add_space(12.0);
    });
}

/// Card frame around one chart section.
pub fn card<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> R {
    egui::Frame::group(ui.style())
        .fill(ui.visuals().extreme_bg_color)
        .inner_margin(egui::Margin::same(10))
        .show(ui, add_contents)
        .inner
}

/// Horizontal colour bar from `lo` to `hi` for the heatmaps.
pub fn color_bar(ui: &mut Ui, lo: f64, hi: f64) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(fmt_thousands(lo));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 12.0), egui::Sense::hover());
        let steps = 32;
        let w = rect.width() / steps as f32;
        for i in 0..steps {
            let t = i as f64 / (steps - 1) as f64;
            let cell = egui::Rect::from_min_size(
                egui::pos2(rect.left() + i as f32 * w, rect.top()),
                egui::vec2(w + 0.5, rect.height()),
            );
            ui.painter().rect_filled(cell, 0.0, color::heat_color(t));
        }
        ui.label(fmt_thousands(hi));
    });
}
