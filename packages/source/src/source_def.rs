//! Config-driven source definition.
//!
//! [`SourceDefinition`] captures where the accident and lane collections
//! live, which property names carry each attribute, and the analysis
//! parameters that turn real-world distances into the engine's settings.

use std::path::{Path, PathBuf};

pub use bike_map_analytics_models::AnalysisConfig;
use serde::Deserialize;

/// A complete dataset definition, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"montreal"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// File path or HTTP(S) URL of the accident `FeatureCollection`.
    pub accidents: String,
    /// File path or HTTP(S) URL of the bike-lane `FeatureCollection`.
    pub lanes: String,
    /// Fail the load on lane geometries that are not line-like instead of
    /// skipping them.
    #[serde(default)]
    pub strict: bool,
    /// Property names for accident attributes.
    #[serde(default)]
    pub fields: FieldMapping,
    /// Analysis parameters.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Directory relative file locations are resolved against. Set when
    /// the definition is read from disk; `None` means the working directory.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Accident property names.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Record identifier.
    pub id: String,
    /// Free-text severity.
    pub severity: String,
    /// Weather code.
    pub weather: String,
    /// Lighting code.
    pub lighting: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            id: "NO_SEQ_COLL".to_string(),
            severity: "GRAVITE".to_string(),
            weather: "CD_COND_METEO".to_string(),
            lighting: "CD_ECLRM".to_string(),
        }
    }
}

/// Where a collection is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Local file.
    File(PathBuf),
    /// Remote URL.
    Url(String),
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

impl SourceDefinition {
    /// Resolved location of the accident collection.
    #[must_use]
    pub fn accidents_location(&self) -> Location {
        self.resolve(&self.accidents)
    }

    /// Resolved location of the lane collection.
    #[must_use]
    pub fn lanes_location(&self) -> Location {
        self.resolve(&self.lanes)
    }

    fn resolve(&self, raw: &str) -> Location {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Location::Url(raw.to_string());
        }
        let path = Path::new(raw);
        match &self.base_dir {
            Some(base) if path.is_relative() => Location::File(base.join(path)),
            _ => Location::File(path.to_path_buf()),
        }
    }
}

/// Parses a TOML source definition string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, toml::de::Error> {
    toml::de::from_str(toml_str)
}
