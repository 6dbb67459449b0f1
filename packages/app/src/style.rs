//! Marker and heat-layer styling.
//!
//! Colors are CSS color strings the renderer can use as-is.

use bike_map_accident_models::{AccidentPoint, CategoryKey, Severity};
use serde::Serialize;

/// Marker fill when no color-by category is selected.
pub const DEFAULT_COLOR: &str = "#666";

/// Weather fill colors, indexed by code modulo the palette length.
pub const WEATHER_PALETTE: [&str; 10] = [
    "#00ff00", "#66ff66", "#ccff66", "#ffff66", "#ffcc66", "#ff9966", "#ff6666", "#cc66ff",
    "#9966ff", "#6666ff",
];

/// Lighting fill colors, indexed by code modulo the palette length.
pub const LIGHTING_PALETTE: [&str; 4] = ["#ffff66", "#ffcc66", "#ff9966", "#ff6666"];

/// Fixed marker drawing options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Circle radius in pixels.
    pub radius: u32,
    /// Outline color.
    pub stroke_color: &'static str,
    /// Outline width in pixels.
    pub stroke_weight: u32,
    /// Fill opacity.
    pub fill_opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 4,
            stroke_color: "#000",
            stroke_weight: 1,
            fill_opacity: 0.9,
        }
    }
}

/// Heat layer drawing options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatLayerStyle {
    /// Point radius in pixels.
    pub radius: u32,
    /// Blur in pixels.
    pub blur: u32,
    /// Minimum layer opacity.
    pub min_opacity: f64,
}

impl Default for HeatLayerStyle {
    fn default() -> Self {
        Self {
            radius: 25,
            blur: 20,
            min_opacity: 0.3,
        }
    }
}

/// Fill color for a point under the selected color-by category.
#[must_use]
pub fn marker_color(point: &AccidentPoint, color_by: Option<CategoryKey>) -> &'static str {
    match color_by {
        None => DEFAULT_COLOR,
        Some(CategoryKey::Severity) => match point.severity() {
            Severity::FatalOrHospitalization => "red",
            Severity::Injury => "yellow",
            Severity::NoInjury => "green",
        },
        Some(CategoryKey::Weather) => palette_color(&WEATHER_PALETTE, &point.weather_code),
        Some(CategoryKey::Lighting) => palette_color(&LIGHTING_PALETTE, &point.lighting_code),
        Some(CategoryKey::BikeLane) => {
            if point.on_bike_lane {
                "green"
            } else {
                "red"
            }
        }
    }
}

/// Picks `palette[code mod len]`. A code that isn't an integer uses the
/// first entry.
fn palette_color(palette: &[&'static str], code: &str) -> &'static str {
    let value = code.parse::<i64>().unwrap_or(0);
    let len = i64::try_from(palette.len()).unwrap_or(1);
    usize::try_from(value.rem_euclid(len))
        .ok()
        .and_then(|i| palette.get(i))
        .copied()
        .unwrap_or(DEFAULT_COLOR)
}
