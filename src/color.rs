use eframe::egui::Color32;
use egui_plot::LineStyle;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::{base_of, flow_of, Flow};
use crate::forecast::Model;

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

pub const REGULAR: Color32 = Color32::from_rgb(0x00, 0x72, 0xB2);
pub const SUPERIOR: Color32 = Color32::from_rgb(0xD5, 0x5E, 0x00);
pub const DIESEL: Color32 = Color32::from_rgb(0x00, 0x9E, 0x73);

pub const ANOMALY: Color32 = Color32::from_rgb(0xC0, 0x00, 0x00);
pub const GUIDE: Color32 = Color32::from_rgb(0xBD, 0xBD, 0xBD);

/// Colour of a model's curves in the performance panel.
pub fn model_color(model: Model) -> Color32 {
    match model {
        Model::Naive => Color32::from_rgb(0x9E, 0x9E, 0x9E),
        Model::SeasonalNaive => Color32::from_rgb(0x6E, 0x6E, 0x6E),
        Model::HoltWinters => Color32::from_rgb(0x4B, 0x4B, 0x4B),
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Series styling: colour by fuel base, dash by flow
// ---------------------------------------------------------------------------

/// Colour of a series column. Known fuels have fixed colours; anything else
/// takes the `index`-th of `count` generated hues.
pub fn series_color(column: &str, index: usize, count: usize) -> Color32 {
    match base_of(column) {
        "Regular" => REGULAR,
        "Superior" => SUPERIOR,
        "Diesel" => DIESEL,
        _ => generate_palette(count.max(index + 1))[index],
    }
}

/// Solid for imports, dashed for consumption.
pub fn series_line_style(column: &str) -> LineStyle {
    match flow_of(column) {
        Flow::Consumption => LineStyle::dashed_loose(),
        Flow::Import | Flow::Other => LineStyle::Solid,
    }
}

/// Line style of a model's fitted values in the real-vs-predicted panel.
pub fn model_line_style(model: Model) -> LineStyle {
    match model {
        Model::Naive => LineStyle::dashed_dense(),
        Model::SeasonalNaive => LineStyle::dotted_dense(),
        Model::HoltWinters => LineStyle::Dashed { length: 14.0 },
    }
}

// ---------------------------------------------------------------------------
// Sequential ramp for the heatmap
// ---------------------------------------------------------------------------

const RAMP: [(f32, f32, f32); 5] = [
    (0.267, 0.005, 0.329),
    (0.230, 0.322, 0.546),
    (0.128, 0.567, 0.551),
    (0.369, 0.789, 0.383),
    (0.993, 0.906, 0.144),
];

/// Map `t` in `[0, 1]` onto a dark-purple → yellow ramp, mixing in linear RGB.
/// `NaN` gives a neutral grey.
pub fn heat_color(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::from_gray(230);
    }
    let scaled = (t.clamp(0.0, 1.0) as f32) * (RAMP.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(RAMP.len() - 2);
    let frac = scaled - lo as f32;

    let stop = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };
    let mixed = stop(RAMP[lo]).mix(stop(RAMP[lo + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}
