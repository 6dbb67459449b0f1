#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analysis over the filtered accident set.
//!
//! Everything here is recomputed from scratch whenever the filter
//! changes: the densest cluster, heat-map weights, and per-label counts
//! for legends.

pub mod density;
pub mod heat;
pub mod summary;

pub use density::{
    AutoDensity, DensityStrategy, GridBinning, PairwiseRadius, densest_cluster, strategy_for,
};
pub use heat::{constant_weight, heat_points};
pub use summary::summarize;

use thiserror::Error;

/// Errors configuring an analysis.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Grid cells must have a finite positive size.
    #[error("Invalid grid cell size {size}: expected a positive number")]
    InvalidCellSize {
        /// The rejected size.
        size: f64,
    },

    /// Neighbor radius must be finite and positive.
    #[error("Invalid neighbor radius {radius}: expected a positive number of meters")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// Projection setup failed.
    #[error(transparent)]
    Spatial(#[from] bike_map_spatial::SpatialError),
}
