//! One-shot asynchronous load of the accident and lane collections.
//!
//! Both collections are fetched concurrently. There is no retry: a failure
//! is returned to the caller, which decides whether to disable analysis.

use bike_map_accident_models::{AccidentPoint, LaneSegment};
use geojson::{FeatureCollection, GeoJson};

use crate::SourceError;
use crate::ingest::{IngestReport, LaneIngestReport, ingest_accidents, ingest_lanes};
use crate::progress::ProgressCallback;
use crate::source_def::{Location, SourceDefinition};

/// Everything read from a source, ready for classification.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Raw accident collection. `accidents[i]` comes from `features[i]`.
    pub accident_features: FeatureCollection,
    /// Normalized accidents, untagged.
    pub accidents: Vec<AccidentPoint>,
    /// Accident ingestion counts.
    pub accident_report: IngestReport,
    /// Lane segments.
    pub lanes: Vec<LaneSegment>,
    /// Lane ingestion counts.
    pub lane_report: LaneIngestReport,
}

/// Reads the raw text at a location.
///
/// # Errors
///
/// Returns [`SourceError`] if the file can't be read or the request fails
/// or returns a non-success status.
pub async fn read_location(location: &Location) -> Result<String, SourceError> {
    match location {
        Location::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Read {
                location: location.to_string(),
                source,
            }),
        Location::Url(url) => {
            let response = reqwest::get(url).await?.error_for_status()?;
            Ok(response.text().await?)
        }
    }
}

/// Parses text as a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`SourceError`] if the text isn't `GeoJSON` or isn't a
/// `FeatureCollection`.
pub fn parse_feature_collection(
    text: &str,
    location: &Location,
) -> Result<FeatureCollection, SourceError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(SourceError::NotFeatureCollection {
            location: location.to_string(),
        }),
    }
}

async fn fetch_collection(location: Location) -> Result<FeatureCollection, SourceError> {
    log::info!("Loading {location}...");
    let text = read_location(&location).await?;
    let fc = parse_feature_collection(&text, &location)?;
    log::info!("Loaded {} features from {location}", fc.features.len());
    Ok(fc)
}

/// Loads and ingests both collections of a source definition.
///
/// # Errors
///
/// Returns [`SourceError`] if either collection fails to load or parse, or
/// if strict lane ingestion meets an unsupported geometry.
pub async fn load_dataset(
    definition: &SourceDefinition,
    progress: &dyn ProgressCallback,
) -> Result<Dataset, SourceError> {
    let (accident_features, lane_features) = tokio::try_join!(
        fetch_collection(definition.accidents_location()),
        fetch_collection(definition.lanes_location()),
    )?;

    progress.set_message(format!("Ingesting {} accidents", accident_features.features.len()));
    let (accidents, accident_report) =
        ingest_accidents(&accident_features, &definition.fields, progress);
    let (lanes, lane_report) = ingest_lanes(&lane_features, definition.strict)?;
    progress.finish(format!(
        "Ingested {} accidents and {} lane segments",
        accidents.len(),
        lanes.len()
    ));

    Ok(Dataset {
        accident_features,
        accidents,
        accident_report,
        lanes,
        lane_report,
    })
}
