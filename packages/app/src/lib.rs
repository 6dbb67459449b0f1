#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Application state for the bike accident map.
//!
//! [`AppState`] owns everything loaded at startup (tagged accidents, the
//! lane buffer index) plus the user's current filter and color-by choice.
//! Every query re-derives its answer from that state; nothing derived is
//! cached across filter changes.

pub mod export;
#[cfg(test)]
mod fixtures;
pub mod state;
pub mod style;
pub mod view;

pub use state::{AppState, AppStatus, LoadedData};
pub use view::{MapView, Marker, PopupFields};

use thiserror::Error;

/// Errors from application queries.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading failed at startup, so analysis is unavailable.
    #[error("Analysis disabled: {reason}")]
    Disabled {
        /// Why loading failed.
        reason: String,
    },

    /// Source loading error.
    #[error(transparent)]
    Source(#[from] bike_map_source::SourceError),

    /// Lane index error.
    #[error(transparent)]
    Spatial(#[from] bike_map_spatial::SpatialError),

    /// Density configuration error.
    #[error(transparent)]
    Analytics(#[from] bike_map_analytics::AnalyticsError),

    /// Filter parse error.
    #[error(transparent)]
    Filter(#[from] bike_map_filter::FilterError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
