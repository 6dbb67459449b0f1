//! Property and coordinate parsing shared by accident and lane ingestion.

use bike_map_accident_models::{LngLat, RawCode};
use serde_json::Value;

/// Converts a JSON property value into a [`RawCode`].
#[must_use]
pub fn raw_code_from_json(value: Option<&Value>) -> RawCode {
    match value {
        None | Some(Value::Null) => RawCode::Missing,
        Some(Value::Number(n)) => n.as_f64().map_or(RawCode::Missing, RawCode::Number),
        Some(Value::String(s)) => RawCode::Text(s.clone()),
        Some(other) => RawCode::Text(other.to_string()),
    }
}

/// Reads a property as text. Numbers and booleans are stringified; empty
/// strings and `null` are `None`.
#[must_use]
pub fn text_property(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Parses a `GeoJSON` position (`[lng, lat, ...]`). Returns `None` for
/// short, non-finite or out-of-range positions.
#[must_use]
pub fn parse_position(position: &[f64]) -> Option<LngLat> {
    let [lng, lat, ..] = position else {
        return None;
    };
    let parsed = LngLat::new(*lng, *lat);
    parsed.is_valid().then_some(parsed)
}

/// Parses a `GeoJSON` line, dropping invalid positions.
#[must_use]
pub fn parse_line(positions: &[Vec<f64>]) -> Vec<LngLat> {
    positions.iter().filter_map(|p| parse_position(p)).collect()
}
