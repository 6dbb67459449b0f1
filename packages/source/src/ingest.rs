//! Converts `GeoJSON` feature collections into accident points and lane
//! segments.
//!
//! Ingestion never aborts on a bad record. Accidents without a usable
//! point geometry are kept (they still count toward totals) with
//! `position: None`; lanes without a usable geometry are dropped and
//! counted.

use bike_map_accident_models::{AccidentPoint, LaneSegment, LngLat, normalize_code};
use geojson::{Feature, FeatureCollection, Value};
use serde::Serialize;

use crate::SourceError;
use crate::parsing::{parse_line, parse_position, raw_code_from_json, text_property};
use crate::progress::ProgressCallback;
use crate::source_def::FieldMapping;

/// Progress is reported once per this many features.
const PROGRESS_BATCH: usize = 1_000;

/// Counts from accident ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Features read.
    pub total: usize,
    /// Features without a usable point geometry.
    pub skipped_geometry: usize,
}

/// Counts from lane ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneIngestReport {
    /// Features read.
    pub total: usize,
    /// Segments produced.
    pub segments: usize,
    /// Features dropped for missing or unsupported geometry.
    pub skipped: usize,
}

/// Builds one [`AccidentPoint`] per feature, in input order.
#[must_use]
pub fn ingest_accidents(
    collection: &FeatureCollection,
    fields: &FieldMapping,
    progress: &dyn ProgressCallback,
) -> (Vec<AccidentPoint>, IngestReport) {
    let mut report = IngestReport {
        total: collection.features.len(),
        ..IngestReport::default()
    };
    progress.set_total(collection.features.len() as u64);

    let mut points = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.iter().enumerate() {
        let point = accident_from_feature(feature, fields);
        if point.position.is_none() {
            report.skipped_geometry += 1;
        }
        points.push(point);

        if (i + 1) % PROGRESS_BATCH == 0 {
            progress.inc(PROGRESS_BATCH as u64);
        }
    }
    progress.inc((collection.features.len() % PROGRESS_BATCH) as u64);

    if report.skipped_geometry > 0 {
        log::warn!(
            "{} of {} accident records have no usable position",
            report.skipped_geometry,
            report.total
        );
    }

    (points, report)
}

fn accident_from_feature(feature: &Feature, fields: &FieldMapping) -> AccidentPoint {
    let property = |name: &str| feature.properties.as_ref().and_then(|p| p.get(name));

    let position = feature.geometry.as_ref().and_then(|g| match &g.value {
        Value::Point(p) => parse_position(p),
        _ => None,
    });

    AccidentPoint {
        id: text_property(property(&fields.id)),
        position,
        severity_text: text_property(property(&fields.severity)),
        weather_code: normalize_code(&raw_code_from_json(property(&fields.weather))),
        lighting_code: normalize_code(&raw_code_from_json(property(&fields.lighting))),
        on_bike_lane: false,
    }
}

/// Builds one [`LaneSegment`] per line-like feature.
///
/// Lines and multi-lines are taken as-is, polygon rings become closed
/// polylines and points become degenerate single-position segments.
///
/// # Errors
///
/// In `strict` mode, returns [`SourceError::UnsupportedGeometry`] for the
/// first feature whose geometry can't be read as a polyline. Otherwise
/// such features are skipped.
pub fn ingest_lanes(
    collection: &FeatureCollection,
    strict: bool,
) -> Result<(Vec<LaneSegment>, LaneIngestReport), SourceError> {
    let mut report = LaneIngestReport {
        total: collection.features.len(),
        ..LaneIngestReport::default()
    };
    let mut segments = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            report.skipped += 1;
            continue;
        };

        let mut parts = Vec::new();
        if !collect_parts(&geometry.value, &mut parts) {
            if strict {
                return Err(SourceError::UnsupportedGeometry {
                    index,
                    geometry_type: geometry_type_name(&geometry.value).to_string(),
                });
            }
            log::debug!(
                "Skipping lane feature {index}: unsupported {} geometry",
                geometry_type_name(&geometry.value)
            );
            report.skipped += 1;
            continue;
        }

        parts.retain(|p: &Vec<LngLat>| !p.is_empty());
        if parts.is_empty() {
            report.skipped += 1;
            continue;
        }

        segments.push(LaneSegment {
            id: feature_id(feature),
            parts,
        });
    }

    report.segments = segments.len();
    if report.skipped > 0 {
        log::warn!(
            "Skipped {} of {} lane features without usable geometry",
            report.skipped,
            report.total
        );
    }

    Ok((segments, report))
}

/// Appends every polyline in `value` to `parts`. Returns `false` for
/// geometry types that are not line-like.
fn collect_parts(value: &Value, parts: &mut Vec<Vec<LngLat>>) -> bool {
    match value {
        Value::LineString(line) => parts.push(parse_line(line)),
        Value::MultiLineString(lines) => parts.extend(lines.iter().map(|l| parse_line(l))),
        Value::Polygon(rings) => parts.extend(rings.iter().map(|r| parse_line(r))),
        Value::MultiPolygon(polygons) => {
            parts.extend(polygons.iter().flatten().map(|r| parse_line(r)));
        }
        Value::Point(p) => parts.extend(parse_position(p).map(|p| vec![p])),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                if !collect_parts(&geometry.value, parts) {
                    return false;
                }
            }
        }
        Value::MultiPoint(_) => return false,
    }
    true
}

const fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn feature_id(feature: &Feature) -> Option<String> {
    match feature.id.as_ref()? {
        geojson::feature::Id::String(s) => Some(s.clone()),
        geojson::feature::Id::Number(n) => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    fn collection(json: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn ingests_accident_attributes() {
        let fc = collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-73.5650, 45.5100]},
                "properties": {
                    "NO_SEQ_COLL": "SPVM _ 2019 _ 1",
                    "GRAVITE": "Léger",
                    "CD_COND_METEO": "11.0",
                    "CD_ECLRM": 3
                }
            }]
        }));

        let (points, report) = ingest_accidents(&fc, &FieldMapping::default(), &NullProgress);

        assert_eq!(report, IngestReport { total: 1, skipped_geometry: 0 });
        let point = &points[0];
        assert_eq!(point.id.as_deref(), Some("SPVM _ 2019 _ 1"));
        assert_eq!(point.weather_code, "11");
        assert_eq!(point.lighting_code, "3");
        assert!(!point.on_bike_lane);
        assert!((point.position.unwrap().lng - -73.565).abs() < 1e-12);
    }

    #[test]
    fn keeps_accidents_without_geometry_but_counts_them() {
        let fc = collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": {"GRAVITE": "Mortel"}},
                {
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
                    "properties": null
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-73.56, 45.5]},
                    "properties": {}
                }
            ]
        }));

        let (points, report) = ingest_accidents(&fc, &FieldMapping::default(), &NullProgress);

        assert_eq!(points.len(), 3);
        assert_eq!(report.skipped_geometry, 2);
        assert!(points[0].position.is_none());
        assert_eq!(points[2].weather_code, "");
    }

    #[test]
    fn ingests_line_like_lanes() {
        let fc = collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": 7,
                    "geometry": {"type": "LineString", "coordinates": [[-73.57, 45.51], [-73.56, 45.51]]},
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "MultiLineString", "coordinates": [
                        [[-73.60, 45.50], [-73.59, 45.50]],
                        [[-73.58, 45.50], [-73.57, 45.50]]
                    ]},
                    "properties": {}
                },
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        }));

        let (segments, report) = ingest_lanes(&fc, false).unwrap();

        assert_eq!(report, LaneIngestReport { total: 3, segments: 2, skipped: 1 });
        assert_eq!(segments[0].id.as_deref(), Some("7"));
        assert_eq!(segments[1].parts.len(), 2);
        assert_eq!(segments[1].position_count(), 4);
    }

    #[test]
    fn strict_mode_rejects_multipoint_lanes() {
        let fc = collection(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "MultiPoint", "coordinates": [[-73.57, 45.51]]},
                "properties": {}
            }]
        }));

        assert!(matches!(
            ingest_lanes(&fc, true),
            Err(SourceError::UnsupportedGeometry { index: 0, .. })
        ));
        let (segments, report) = ingest_lanes(&fc, false).unwrap();
        assert!(segments.is_empty());
        assert_eq!(report.skipped, 1);
    }
}
