//! Source registry: the embedded default definition plus on-disk overrides.
//!
//! The Montreal definition in `packages/source/sources/` is baked into the
//! binary via [`include_str!`]. A different definition can be supplied by
//! path, either on the command line or through `BIKE_MAP_CONFIG`.

use std::path::Path;

use crate::SourceError;
use crate::source_def::{SourceDefinition, parse_source_toml};

/// Environment variable naming a source definition file.
pub const CONFIG_ENV_VAR: &str = "BIKE_MAP_CONFIG";

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[("montreal", include_str!("../sources/montreal.toml"))];

/// Returns all embedded source definitions.
///
/// # Panics
///
/// Panics if an embedded TOML config is malformed. These are compile-time
/// constants, so a failure here is a development error caught by tests.
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the embedded definition with the given ID.
#[must_use]
pub fn find_source(id: &str) -> Option<SourceDefinition> {
    all_sources().into_iter().find(|s| s.id == id)
}

/// Reads a source definition from a TOML file. Relative collection paths
/// inside it are resolved against the file's directory.
///
/// # Errors
///
/// Returns [`SourceError`] if the file can't be read or parsed.
pub fn load_definition_file(path: &Path) -> Result<SourceDefinition, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut def = parse_source_toml(&contents)?;
    def.base_dir = path.parent().map(Path::to_path_buf);
    log::debug!("Loaded source definition '{}' from {}", def.id, path.display());
    Ok(def)
}

/// Picks the active definition: an explicit path first, then
/// `BIKE_MAP_CONFIG`, then the embedded Montreal default.
///
/// # Errors
///
/// Returns [`SourceError`] if a configured file can't be read or parsed.
pub fn resolve_definition(explicit: Option<&Path>) -> Result<SourceDefinition, SourceError> {
    if let Some(path) = explicit {
        return load_definition_file(path);
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return load_definition_file(Path::new(&path));
    }
    find_source("montreal").ok_or_else(|| SourceError::UnknownSource {
        id: "montreal".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_sources() {
        let sources = all_sources();
        assert_eq!(sources.len(), SOURCE_TOMLS.len());
    }

    #[test]
    fn montreal_uses_saaq_field_names() {
        let def = find_source("montreal").unwrap();
        assert_eq!(def.fields.id, "NO_SEQ_COLL");
        assert_eq!(def.fields.weather, "CD_COND_METEO");
        assert_eq!(def.fields.lighting, "CD_ECLRM");
        assert!((def.analysis.buffer_radius_meters - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn definition_file_sets_base_dir() {
        let dir = std::env::temp_dir().join("bike_map_registry_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("city.toml");
        std::fs::write(
            &path,
            "id = \"city\"\nname = \"City\"\naccidents = \"a.geojson\"\nlanes = \"l.geojson\"\n",
        )
        .unwrap();

        let def = resolve_definition(Some(&path)).unwrap();
        assert_eq!(def.id, "city");
        assert_eq!(def.base_dir.as_deref(), Some(dir.as_path()));
    }

    #[test]
    fn missing_definition_file_is_an_error() {
        let path = std::env::temp_dir().join("bike_map_registry_missing.toml");
        assert!(matches!(
            load_definition_file(&path),
            Err(SourceError::Io(_))
        ));
    }
}
