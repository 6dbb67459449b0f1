#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bicycle accident record types and categorical code tables.
//!
//! Defines the canonical [`AccidentPoint`] produced by ingestion and the
//! closed label sets ([`Severity`], [`Weather`], [`Lighting`],
//! [`BikeLaneStatus`]) every filter, legend and density query is keyed on.
//! The numeric code tables match the SAAQ collision exports published by
//! the City of Montreal.

pub mod code;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

pub use code::{RawCode, normalize_code};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
}

impl LngLat {
    /// Creates a new position.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Whether both coordinates are finite and inside the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

/// Injury outcome of an accident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    /// Fatal accident or one requiring hospitalization.
    #[strum(serialize = "fatal")]
    FatalOrHospitalization,
    /// Minor injury.
    #[strum(serialize = "injury")]
    Injury,
    /// Property damage only, or no severity recorded.
    #[strum(serialize = "no_injury")]
    NoInjury,
}

/// Tokens that mark a fatal or serious outcome. Checked before
/// [`MINOR_TOKENS`] because the free-text field can contain both.
const FATAL_TOKENS: &[&str] = &["mortel", "grave", "fatal", "serious"];

/// Tokens that mark a minor-injury outcome.
const MINOR_TOKENS: &[&str] = &["léger", "leger", "minor"];

impl Severity {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FatalOrHospitalization => "Fatal/Hospitalization",
            Self::Injury => "Injury",
            Self::NoInjury => "No Injury",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::FatalOrHospitalization, Self::Injury, Self::NoInjury]
    }
}

/// Classifies a free-text severity field.
///
/// Matching is a case-insensitive substring search. Empty, missing and
/// unrecognized values are [`Severity::NoInjury`].
#[must_use]
pub fn classify_severity(raw: Option<&str>) -> Severity {
    let Some(raw) = raw else {
        return Severity::NoInjury;
    };
    let lower = raw.to_lowercase();

    if contains_any(&lower, FATAL_TOKENS) {
        return Severity::FatalOrHospitalization;
    }
    if contains_any(&lower, MINOR_TOKENS) {
        return Severity::Injury;
    }
    Severity::NoInjury
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Weather condition at the time of the accident (`CD_COND_METEO`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Weather {
    /// Code 11
    Clear,
    /// Code 12
    PartlyCloudy,
    /// Code 13
    Cloudy,
    /// Code 14
    Rain,
    /// Code 15
    Snow,
    /// Code 16
    FreezingRain,
    /// Code 17
    Fog,
    /// Code 18
    HighWinds,
    /// Code 19
    OtherPrecipitation,
    /// Code 99
    OtherUnspecified,
    /// Any code not in the table, including missing values.
    Undefined,
}

impl Weather {
    /// Maps a normalized code (see [`normalize_code`]) to its label.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "11" => Self::Clear,
            "12" => Self::PartlyCloudy,
            "13" => Self::Cloudy,
            "14" => Self::Rain,
            "15" => Self::Snow,
            "16" => Self::FreezingRain,
            "17" => Self::Fog,
            "18" => Self::HighWinds,
            "19" => Self::OtherPrecipitation,
            "99" => Self::OtherUnspecified,
            _ => Self::Undefined,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::FreezingRain => "Freezing rain",
            Self::Fog => "Fog",
            Self::HighWinds => "High winds",
            Self::OtherPrecipitation => "Other precip",
            Self::OtherUnspecified => "Other / Unspecified",
            Self::Undefined => "Undefined",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Clear,
            Self::PartlyCloudy,
            Self::Cloudy,
            Self::Rain,
            Self::Snow,
            Self::FreezingRain,
            Self::Fog,
            Self::HighWinds,
            Self::OtherPrecipitation,
            Self::OtherUnspecified,
            Self::Undefined,
        ]
    }
}

/// Lighting condition at the time of the accident (`CD_ECLRM`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Lighting {
    /// Code 1
    DaytimeBright,
    /// Code 2
    DaytimeSemiObscure,
    /// Code 3
    NightLit,
    /// Code 4
    NightUnlit,
    /// Any code not in the table, including missing values.
    Undefined,
}

impl Lighting {
    /// Maps a normalized code (see [`normalize_code`]) to its label.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "1" => Self::DaytimeBright,
            "2" => Self::DaytimeSemiObscure,
            "3" => Self::NightLit,
            "4" => Self::NightUnlit,
            _ => Self::Undefined,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DaytimeBright => "Daytime – bright",
            Self::DaytimeSemiObscure => "Daytime – semi-obscure",
            Self::NightLit => "Night – lit",
            Self::NightUnlit => "Night – unlit",
            Self::Undefined => "Undefined",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::DaytimeBright,
            Self::DaytimeSemiObscure,
            Self::NightLit,
            Self::NightUnlit,
            Self::Undefined,
        ]
    }
}

/// Whether an accident falls within the buffered bike-lane network.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BikeLaneStatus {
    /// Inside the lane buffer.
    OnLane,
    /// Outside the lane buffer, or position unknown.
    OffLane,
}

impl BikeLaneStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnLane => "On bike lane",
            Self::OffLane => "Off bike lane",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::OnLane, Self::OffLane]
    }
}

impl From<bool> for BikeLaneStatus {
    fn from(on_lane: bool) -> Self {
        if on_lane { Self::OnLane } else { Self::OffLane }
    }
}

/// The categorical attributes an accident can be filtered or colored by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CategoryKey {
    /// [`Severity`]
    Severity,
    /// [`Weather`]
    Weather,
    /// [`Lighting`]
    Lighting,
    /// [`BikeLaneStatus`]
    BikeLane,
}

impl CategoryKey {
    /// Human-readable name, as shown in the variable menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Severity => "Accident Type",
            Self::Weather => "Weather",
            Self::Lighting => "Lighting",
            Self::BikeLane => "Bike Lane",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Severity, Self::Weather, Self::Lighting, Self::BikeLane]
    }
}

/// A bicycle accident normalized for analysis.
///
/// Codes are normalized once at ingestion; `on_bike_lane` is `false` until
/// the classifier tags the collection and is never touched by filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentPoint {
    /// Source record identifier (`NO_SEQ_COLL`), if present.
    pub id: Option<String>,
    /// Position, or `None` when the record has no usable geometry.
    pub position: Option<LngLat>,
    /// Raw severity text (`GRAVITE`).
    pub severity_text: Option<String>,
    /// Normalized weather code.
    pub weather_code: String,
    /// Normalized lighting code.
    pub lighting_code: String,
    /// Derived: within the buffered lane network.
    pub on_bike_lane: bool,
}

impl AccidentPoint {
    /// Position if present and valid WGS84.
    #[must_use]
    pub fn valid_position(&self) -> Option<LngLat> {
        self.position.filter(LngLat::is_valid)
    }

    /// Classified severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        classify_severity(self.severity_text.as_deref())
    }

    /// Weather label.
    #[must_use]
    pub fn weather(&self) -> Weather {
        Weather::from_code(&self.weather_code)
    }

    /// Lighting label.
    #[must_use]
    pub fn lighting(&self) -> Lighting {
        Lighting::from_code(&self.lighting_code)
    }

    /// Bike-lane status label.
    #[must_use]
    pub fn bike_lane_status(&self) -> BikeLaneStatus {
        self.on_bike_lane.into()
    }
}

/// One bike-lane feature: a polyline, or several for multi-part lanes.
///
/// A part with a single position is a degenerate (zero-length) lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneSegment {
    /// Source feature identifier, if present.
    pub id: Option<String>,
    /// Polyline parts, each an ordered list of positions.
    pub parts: Vec<Vec<LngLat>>,
}

impl LaneSegment {
    /// Number of positions across all parts.
    #[must_use]
    pub fn position_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }
}
