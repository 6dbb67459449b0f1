//! Typed labels across all filterable categories.

use bike_map_accident_models::{
    AccidentPoint, BikeLaneStatus, CategoryKey, Lighting, Severity, Weather,
};
use serde::{Deserialize, Serialize};

use crate::FilterError;

/// One label value of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryLabel {
    /// A [`Severity`] label.
    Severity(Severity),
    /// A [`Weather`] label.
    Weather(Weather),
    /// A [`Lighting`] label.
    Lighting(Lighting),
    /// A [`BikeLaneStatus`] label.
    BikeLane(BikeLaneStatus),
}

impl CategoryLabel {
    /// The category this label belongs to.
    #[must_use]
    pub const fn key(self) -> CategoryKey {
        match self {
            Self::Severity(_) => CategoryKey::Severity,
            Self::Weather(_) => CategoryKey::Weather,
            Self::Lighting(_) => CategoryKey::Lighting,
            Self::BikeLane(_) => CategoryKey::BikeLane,
        }
    }

    /// Machine-readable label (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Severity(v) => v.into(),
            Self::Weather(v) => v.into(),
            Self::Lighting(v) => v.into(),
            Self::BikeLane(v) => v.into(),
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn display(self) -> &'static str {
        match self {
            Self::Severity(v) => v.label(),
            Self::Weather(v) => v.label(),
            Self::Lighting(v) => v.label(),
            Self::BikeLane(v) => v.label(),
        }
    }

    /// Parses a label of the given category.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownLabel`] if `value` isn't a label of
    /// `key`.
    pub fn parse(key: CategoryKey, value: &str) -> Result<Self, FilterError> {
        let value = value.trim();
        let parsed = match key {
            CategoryKey::Severity => value.parse().map(Self::Severity).ok(),
            CategoryKey::Weather => value.parse().map(Self::Weather).ok(),
            CategoryKey::Lighting => value.parse().map(Self::Lighting).ok(),
            CategoryKey::BikeLane => value.parse().map(Self::BikeLane).ok(),
        };
        parsed.ok_or_else(|| FilterError::UnknownLabel {
            category: key,
            label: value.to_string(),
        })
    }

    /// Every label of a category, in display order.
    #[must_use]
    pub fn all_for(key: CategoryKey) -> Vec<Self> {
        match key {
            CategoryKey::Severity => Severity::all().iter().copied().map(Self::Severity).collect(),
            CategoryKey::Weather => Weather::all().iter().copied().map(Self::Weather).collect(),
            CategoryKey::Lighting => Lighting::all().iter().copied().map(Self::Lighting).collect(),
            CategoryKey::BikeLane => BikeLaneStatus::all()
                .iter()
                .copied()
                .map(Self::BikeLane)
                .collect(),
        }
    }
}

/// The label a point carries for a category.
#[must_use]
pub fn label_of(point: &AccidentPoint, key: CategoryKey) -> CategoryLabel {
    match key {
        CategoryKey::Severity => CategoryLabel::Severity(point.severity()),
        CategoryKey::Weather => CategoryLabel::Weather(point.weather()),
        CategoryKey::Lighting => CategoryLabel::Lighting(point.lighting()),
        CategoryKey::BikeLane => CategoryLabel::BikeLane(point.bike_lane_status()),
    }
}
