//! The user's active filter and its evaluation.
//!
//! Values selected within one category are OR'ed; active categories are
//! AND'ed. A category that is active with no values selected rejects
//! everything, which is how "uncheck all" shows an empty map.

use std::collections::{BTreeMap, BTreeSet};

use bike_map_accident_models::{AccidentPoint, CategoryKey};
use serde::{Deserialize, Serialize};

use crate::FilterError;
use crate::label::{CategoryLabel, label_of};

/// Allowed label values per active category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    active: BTreeMap<CategoryKey, BTreeSet<CategoryLabel>>,
}

impl FilterSelection {
    /// A selection with no active category. Every point passes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every category active with every label selected.
    #[must_use]
    pub fn all_values() -> Self {
        CategoryKey::all()
            .iter()
            .fold(Self::new(), |s, key| s.with(*key, CategoryLabel::all_for(*key)))
    }

    /// Activates `key` with exactly `labels`. Labels of other categories
    /// are ignored.
    #[must_use]
    pub fn with(mut self, key: CategoryKey, labels: impl IntoIterator<Item = CategoryLabel>) -> Self {
        self.set(key, labels);
        self
    }

    /// Activates `key` with exactly `labels`, replacing any previous set.
    pub fn set(&mut self, key: CategoryKey, labels: impl IntoIterator<Item = CategoryLabel>) {
        let labels = labels.into_iter().filter(|l| l.key() == key).collect();
        self.active.insert(key, labels);
    }

    /// Adds a label, activating its category if needed.
    pub fn allow(&mut self, label: CategoryLabel) {
        self.active.entry(label.key()).or_default().insert(label);
    }

    /// Removes a label. Its category stays active, even if now empty.
    pub fn deny(&mut self, label: CategoryLabel) {
        if let Some(labels) = self.active.get_mut(&label.key()) {
            labels.remove(&label);
        }
    }

    /// Deactivates a category so it no longer constrains.
    pub fn clear(&mut self, key: CategoryKey) {
        self.active.remove(&key);
    }

    /// Whether a category constrains the selection.
    #[must_use]
    pub fn is_active(&self, key: CategoryKey) -> bool {
        self.active.contains_key(&key)
    }

    /// Selected labels of a category, or `None` if it's inactive.
    #[must_use]
    pub fn selected(&self, key: CategoryKey) -> Option<&BTreeSet<CategoryLabel>> {
        self.active.get(&key)
    }

    /// Active categories and their selected labels.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryKey, &BTreeSet<CategoryLabel>)> {
        self.active.iter().map(|(k, v)| (*k, v))
    }

    /// Parses `category=label,label;category=...`.
    ///
    /// `*` selects every label of a category and an empty value list
    /// activates the category with nothing selected. Whitespace and
    /// case are ignored; an empty string is the empty selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for a clause without `=`, an unknown
    /// category, or a label that doesn't belong to its category.
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let mut selection = Self::new();

        for clause in input.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let (name, values) = clause.split_once('=').ok_or_else(|| FilterError::Malformed {
                clause: clause.to_string(),
            })?;
            let key: CategoryKey =
                name.trim()
                    .parse()
                    .map_err(|_| FilterError::UnknownCategory {
                        name: name.trim().to_string(),
                    })?;

            let values = values.trim();
            let labels = if values == "*" {
                CategoryLabel::all_for(key)
            } else {
                values
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| CategoryLabel::parse(key, v))
                    .collect::<Result<Vec<_>, _>>()?
            };
            selection.set(key, labels);
        }

        Ok(selection)
    }
}

impl std::fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clauses: Vec<String> = self
            .iter()
            .map(|(key, labels)| {
                let values: Vec<&str> = labels.iter().map(|l| l.as_str()).collect();
                format!("{}={}", key.as_ref(), values.join(","))
            })
            .collect();
        write!(f, "{}", clauses.join(";"))
    }
}

/// Whether a point satisfies every active category of the selection.
#[must_use]
pub fn passes_filter(point: &AccidentPoint, selection: &FilterSelection) -> bool {
    selection
        .iter()
        .all(|(key, labels)| labels.contains(&label_of(point, key)))
}

/// The points passing `selection`, in input order.
#[must_use]
pub fn apply<'a>(points: &'a [AccidentPoint], selection: &FilterSelection) -> Vec<&'a AccidentPoint> {
    points.iter().filter(|p| passes_filter(p, selection)).collect()
}

#[cfg(test)]
mod tests {
    use bike_map_accident_models::{BikeLaneStatus, Lighting, Severity, Weather};

    use super::*;

    fn point(severity: &str, weather: &str, lighting: &str, on_lane: bool) -> AccidentPoint {
        AccidentPoint {
            id: None,
            position: None,
            severity_text: Some(severity.to_string()),
            weather_code: weather.to_string(),
            lighting_code: lighting.to_string(),
            on_bike_lane: on_lane,
        }
    }

    fn sample() -> Vec<AccidentPoint> {
        vec![
            point("Mortel", "14", "3", true),
            point("Léger", "11", "1", false),
            point("", "15", "4", true),
            point("Grave", "11", "1", false),
        ]
    }

    #[test]
    fn empty_selection_passes_everything() {
        let points = sample();
        assert_eq!(apply(&points, &FilterSelection::new()).len(), points.len());
        assert_eq!(apply(&points, &FilterSelection::all_values()).len(), points.len());
    }

    #[test]
    fn empty_value_set_rejects_everything() {
        for key in CategoryKey::all() {
            let selection = FilterSelection::new().with(*key, []);
            for p in &sample() {
                assert!(!passes_filter(p, &selection), "{key:?} with no values let a point through");
            }
        }
    }

    #[test]
    fn values_within_category_are_ored() {
        let selection = FilterSelection::new().with(
            CategoryKey::Weather,
            [
                CategoryLabel::Weather(Weather::Rain),
                CategoryLabel::Weather(Weather::Snow),
            ],
        );
        let points = sample();
        let passed = apply(&points, &selection);
        assert_eq!(passed.len(), 2);
        assert_eq!(passed[0].weather_code, "14");
        assert_eq!(passed[1].weather_code, "15");
    }

    #[test]
    fn categories_are_anded() {
        let selection = FilterSelection::new()
            .with(
                CategoryKey::Severity,
                [CategoryLabel::Severity(Severity::FatalOrHospitalization)],
            )
            .with(
                CategoryKey::Lighting,
                [CategoryLabel::Lighting(Lighting::DaytimeBright)],
            );

        let points = sample();
        let passed = apply(&points, &selection);
        assert_eq!(passed.len(), 1);
        assert_eq!(passed[0].severity_text.as_deref(), Some("Grave"));
    }

    #[test]
    fn deny_keeps_category_active() {
        let mut selection = FilterSelection::new();
        selection.allow(CategoryLabel::BikeLane(BikeLaneStatus::OnLane));
        assert_eq!(apply(&sample(), &selection).len(), 2);

        selection.deny(CategoryLabel::BikeLane(BikeLaneStatus::OnLane));
        assert!(selection.is_active(CategoryKey::BikeLane));
        assert!(apply(&sample(), &selection).is_empty());

        selection.clear(CategoryKey::BikeLane);
        assert_eq!(apply(&sample(), &selection).len(), 4);
    }

    #[test]
    fn with_ignores_labels_of_other_categories() {
        let selection = FilterSelection::new().with(
            CategoryKey::Weather,
            [CategoryLabel::Severity(Severity::Injury)],
        );
        assert!(selection.selected(CategoryKey::Weather).unwrap().is_empty());
    }

    #[test]
    fn parses_selection_strings() {
        let selection = FilterSelection::parse("severity=fatal, injury; bike_lane=on_lane").unwrap();
        assert_eq!(selection.selected(CategoryKey::Severity).unwrap().len(), 2);
        assert!(!selection.is_active(CategoryKey::Weather));
        assert_eq!(apply(&sample(), &selection).len(), 1);

        let all_weather = FilterSelection::parse("weather=*").unwrap();
        assert_eq!(
            all_weather.selected(CategoryKey::Weather).unwrap().len(),
            Weather::all().len()
        );

        let nothing = FilterSelection::parse("lighting=").unwrap();
        assert!(apply(&sample(), &nothing).is_empty());

        assert_eq!(FilterSelection::parse("").unwrap(), FilterSelection::new());
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            FilterSelection::parse("severity"),
            Err(FilterError::Malformed { .. })
        ));
        assert!(matches!(
            FilterSelection::parse("season=winter"),
            Err(FilterError::UnknownCategory { .. })
        ));
        assert!(matches!(
            FilterSelection::parse("weather=fatal"),
            Err(FilterError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        let selection = FilterSelection::parse("weather=rain,snow;severity=fatal").unwrap();
        let reparsed = FilterSelection::parse(&selection.to_string()).unwrap();
        assert_eq!(selection, reparsed);
    }

    #[test]
    fn json_encoding_tags_labels_with_their_category() {
        let selection = FilterSelection::new()
            .with(
                CategoryKey::Severity,
                [CategoryLabel::Severity(Severity::Injury)],
            )
            .with(CategoryKey::Lighting, [])
            .with(
                CategoryKey::BikeLane,
                [CategoryLabel::BikeLane(BikeLaneStatus::OnLane)],
            );

        let value = serde_json::to_value(&selection).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "active": {
                    "SEVERITY": [{ "category": "SEVERITY", "value": "INJURY" }],
                    "LIGHTING": [],
                    "BIKE_LANE": [{ "category": "BIKE_LANE", "value": "ON_LANE" }],
                }
            })
        );

        let decoded: FilterSelection = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, selection);
        assert!(decoded.is_active(CategoryKey::Lighting));
        assert!(!decoded.is_active(CategoryKey::Weather));
    }
}
