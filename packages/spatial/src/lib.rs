#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for bike-lane attribution.
//!
//! Buffers each lane segment once at startup in a local metric
//! projection, builds an R-tree over the buffers, and provides fast
//! point-in-buffer lookups for tagging accidents as on or off the lane
//! network.

pub mod classifier;
pub mod geometry;
pub mod lanes;

pub use classifier::{TagReport, tag_all};
pub use geometry::LocalProjection;
pub use lanes::LaneBufferIndex;

/// Errors from building spatial structures.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// Buffer radius must be finite and positive.
    #[error("Invalid buffer radius {radius}: expected a positive number of meters")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// Projection origin must be a valid position away from the poles.
    #[error("Invalid projection origin ({lng}, {lat})")]
    InvalidOrigin {
        /// Origin longitude.
        lng: f64,
        /// Origin latitude.
        lat: f64,
    },
}
