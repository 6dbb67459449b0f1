#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for density analysis over the filtered accident set.
//!
//! These are the values handed to the map renderer: the densest cluster,
//! heat-map weights and per-label counts for legends. [`AnalysisConfig`]
//! holds the tuning that produces them.

use bike_map_accident_models::{CategoryKey, LngLat};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which densest-cluster algorithm to run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DensityStrategyKind {
    /// Fixed-size grid binning, O(n).
    #[default]
    Grid,
    /// Neighbor counting within a ground radius, O(n²).
    Pairwise,
    /// Pairwise for small inputs, grid otherwise.
    Auto,
}

/// Distances and tuning for classification and density analysis.
///
/// All distances are ground meters. They are converted to degrees with a
/// single local projection anchored at the reference position.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Radius of the buffer drawn around each bike lane.
    pub buffer_radius_meters: f64,
    /// Longitude the local projection is anchored at.
    pub reference_longitude: f64,
    /// Latitude the local projection is anchored at.
    pub reference_latitude: f64,
    /// Edge length of a density grid cell.
    pub grid_cell_meters: f64,
    /// Neighbor radius for pairwise density.
    pub pairwise_radius_meters: f64,
    /// Largest input `auto` still runs pairwise on.
    pub pairwise_max_points: usize,
    /// Heat weight given to every accident.
    pub heat_weight: f64,
    /// Densest-cluster algorithm.
    pub density_strategy: DensityStrategyKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            buffer_radius_meters: 5.0,
            reference_longitude: -73.561_668,
            reference_latitude: 45.508_888,
            grid_cell_meters: 150.0,
            pairwise_radius_meters: 200.0,
            pairwise_max_points: 2_000,
            heat_weight: 0.7,
            density_strategy: DensityStrategyKind::Grid,
        }
    }
}

/// The location and size of the largest concentration of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensestCluster {
    /// Representative hotspot location.
    pub center: LngLat,
    /// Number of points in the cluster.
    pub count: u64,
}

/// A weighted point for the heat-map renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    /// Point position.
    pub position: LngLat,
    /// Heat intensity contributed by this point.
    pub weight: f64,
}

/// Number of accidents carrying one label of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Machine-readable label (`snake_case`).
    pub label: String,
    /// Human-readable label.
    pub display: String,
    /// Number of accidents.
    pub count: u64,
}

/// Label counts for one category over a filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// The category counted.
    pub category: CategoryKey,
    /// Accidents considered.
    pub total: u64,
    /// Per-label counts, in label order.
    pub counts: Vec<CategoryCount>,
}
