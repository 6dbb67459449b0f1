#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Category filtering for accident points.
//!
//! Pure functions only: a [`FilterSelection`] says which labels of which
//! categories are shown, and [`passes_filter`] decides a single point.

pub mod label;
pub mod selection;

use bike_map_accident_models::CategoryKey;

pub use label::{CategoryLabel, label_of};
pub use selection::{FilterSelection, apply, passes_filter};

/// Errors parsing a filter selection.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A clause had no `=`.
    #[error("Malformed filter clause '{clause}': expected category=label,label")]
    Malformed {
        /// The offending clause.
        clause: String,
    },

    /// Category name not recognized.
    #[error("Unknown filter category '{name}'")]
    UnknownCategory {
        /// The unrecognized name.
        name: String,
    },

    /// Label not valid for its category.
    #[error("Unknown {category} label '{label}'")]
    UnknownLabel {
        /// The category being parsed.
        category: CategoryKey,
        /// The unrecognized label.
        label: String,
    },
}
