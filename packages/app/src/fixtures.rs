//! Shared test data: three accidents on or near a lane, one far away.

use bike_map_source::ingest::{ingest_accidents, ingest_lanes};
use bike_map_source::loader::Dataset;
use bike_map_source::progress::NullProgress;
use bike_map_source::source_def::{SourceDefinition, parse_source_toml};
use geojson::FeatureCollection;

pub fn definition() -> SourceDefinition {
    parse_source_toml(
        "id = \"t\"\nname = \"T\"\naccidents = \"bikes.geojson\"\nlanes = \"lanes.json\"\n",
    )
    .unwrap()
}

fn accident(id: &str, lng: f64, lat: f64, severity: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lng, lat]},
        "properties": {
            "NO_SEQ_COLL": id,
            "GRAVITE": severity,
            "CD_COND_METEO": "11.0",
            "CD_ECLRM": 1
        }
    })
}

pub fn dataset() -> Dataset {
    let accident_features: FeatureCollection = serde_json::from_value(serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            accident("A1", -73.5650, 45.5100, "Mortel"),
            accident("A2", -73.5651, 45.5101, "Léger"),
            accident("A3", -73.5652, 45.5100, "Léger"),
            accident("A4", -73.6200, 45.5500, "Grave"),
        ]
    }))
    .unwrap();
    let lane_features: FeatureCollection = serde_json::from_value(serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[-73.5700, 45.5100], [-73.5600, 45.5100]]},
            "properties": {}
        }]
    }))
    .unwrap();

    let definition = definition();
    let (accidents, accident_report) =
        ingest_accidents(&accident_features, &definition.fields, &NullProgress);
    let (lanes, lane_report) = ingest_lanes(&lane_features, false).unwrap();

    Dataset {
        accident_features,
        accidents,
        accident_report,
        lanes,
        lane_report,
    }
}
