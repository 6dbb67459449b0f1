#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident and bike-lane data sources.
//!
//! A [`source_def::SourceDefinition`] names where the two `GeoJSON`
//! collections live and how accident properties are spelled. The
//! [`loader`] reads both once at startup and [`ingest`] turns them into
//! normalized accident points and lane segments.

pub mod ingest;
pub mod loader;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod source_def;

/// Errors that can occur while loading a source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading a collection file failed.
    #[error("Failed to read {location}: {source}")]
    Read {
        /// The location that couldn't be read.
        location: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// I/O error (config file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input was not valid `GeoJSON`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Input was valid `GeoJSON` but not a `FeatureCollection`.
    #[error("{location} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection {
        /// The offending location.
        location: String,
    },

    /// A lane geometry couldn't be read as a polyline (strict mode only).
    #[error("Lane feature {index} has unsupported geometry type {geometry_type}")]
    UnsupportedGeometry {
        /// Feature index in the lane collection.
        index: usize,
        /// `GeoJSON` geometry type name.
        geometry_type: String,
    },

    /// Source definition TOML was malformed.
    #[error("Invalid source definition: {0}")]
    Config(#[from] toml::de::Error),

    /// No embedded source with this ID.
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The requested ID.
        id: String,
    },
}
