//! Renderer-ready snapshot of the current map.

use bike_map_accident_models::{AccidentPoint, CategoryKey, LngLat};
use bike_map_analytics::summarize;
use bike_map_analytics_models::{CategoryBreakdown, DensestCluster, HeatPoint};
use serde::Serialize;

use crate::AppError;
use crate::state::AppState;
use crate::style::{HeatLayerStyle, MarkerStyle, marker_color};

/// Text shown when a marker is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupFields {
    /// Source record identifier.
    pub id: Option<String>,
    /// Accident type label.
    pub accident: &'static str,
    /// Weather label.
    pub weather: &'static str,
    /// Lighting label.
    pub lighting: &'static str,
    /// `"Yes"` or `"No"`.
    pub bike_lane: &'static str,
}

impl PopupFields {
    /// Popup text for one accident.
    #[must_use]
    pub fn of(point: &AccidentPoint) -> Self {
        Self {
            id: point.id.clone(),
            accident: point.severity().label(),
            weather: point.weather().label(),
            lighting: point.lighting().label(),
            bike_lane: if point.on_bike_lane { "Yes" } else { "No" },
        }
    }
}

/// One accident marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Marker position.
    pub position: LngLat,
    /// Fill color for the active color-by category.
    pub color: &'static str,
    /// Popup text.
    pub popup: PopupFields,
}

/// Everything a renderer needs to draw the current state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Category markers are colored by.
    pub color_by: Option<CategoryKey>,
    /// Active filter, in `category=label,...` form.
    pub filter: String,
    /// Accidents loaded.
    pub total: usize,
    /// Accidents passing the filter.
    pub shown: usize,
    /// One marker per shown accident with a usable position.
    pub markers: Vec<Marker>,
    /// Marker drawing options.
    pub marker_style: MarkerStyle,
    /// Heat points for the shown accidents.
    pub heat: Vec<HeatPoint>,
    /// Heat layer drawing options.
    pub heat_style: HeatLayerStyle,
    /// Densest cluster of the shown accidents.
    pub densest: Option<DensestCluster>,
    /// Counts per label of the color-by category.
    pub legend: Option<CategoryBreakdown>,
}

impl AppState {
    /// Snapshot of the map under the current filter and color-by choice.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed, or
    /// [`AppError::Analytics`] if the density settings are invalid.
    pub fn view(&self) -> Result<MapView, AppError> {
        let total = self.accidents()?.len();
        let filtered = self.filtered()?;
        let color_by = self.color_by();

        let markers = filtered
            .iter()
            .filter_map(|point| {
                point.valid_position().map(|position| Marker {
                    position,
                    color: marker_color(point, color_by),
                    popup: PopupFields::of(point),
                })
            })
            .collect();

        Ok(MapView {
            color_by,
            filter: self.selection().to_string(),
            total,
            shown: filtered.len(),
            markers,
            marker_style: MarkerStyle::default(),
            heat: self.heat()?,
            heat_style: HeatLayerStyle::default(),
            densest: self.densest()?,
            legend: color_by.map(|key| summarize(filtered.iter().copied(), key)),
        })
    }
}

#[cfg(test)]
mod tests {
    use bike_map_accident_models::Severity;
    use bike_map_filter::{CategoryLabel, FilterSelection};

    use super::*;
    use crate::fixtures::{dataset, definition};

    #[test]
    fn snapshot_reflects_color_by() {
        let mut state = AppState::from_dataset(definition(), dataset()).unwrap();
        state.set_color_by(Some(CategoryKey::BikeLane));

        let view = state.view().unwrap();

        assert_eq!(view.total, 4);
        assert_eq!(view.shown, 4);
        assert_eq!(view.markers.len(), 4);
        assert_eq!(view.markers[0].color, "green");
        assert_eq!(view.markers[3].color, "red");
        assert_eq!(view.heat.len(), 4);
        assert_eq!(view.densest.unwrap().count, 3);

        let legend = view.legend.unwrap();
        assert_eq!(legend.counts[0].count, 2);
        assert_eq!(legend.counts[1].count, 2);
    }

    #[test]
    fn popup_fields() {
        let state = AppState::from_dataset(definition(), dataset()).unwrap();
        let view = state.view().unwrap();

        let popup = &view.markers[0].popup;
        assert_eq!(popup.id.as_deref(), Some("A1"));
        assert_eq!(popup.accident, "Fatal/Hospitalization");
        assert_eq!(popup.weather, "Clear");
        assert_eq!(popup.lighting, "Daytime – bright");
        assert_eq!(popup.bike_lane, "Yes");
        assert_eq!(view.markers[0].color, "#666");
        assert!(view.legend.is_none());
    }

    #[test]
    fn filter_narrows_every_layer() {
        let mut state = AppState::from_dataset(definition(), dataset()).unwrap();
        state.set_selection(FilterSelection::new().with(
            CategoryKey::Severity,
            [CategoryLabel::Severity(Severity::Injury)],
        ));

        let view = state.view().unwrap();

        assert_eq!(view.filter, "severity=injury");
        assert_eq!(view.shown, 2);
        assert_eq!(view.markers.len(), 2);
        assert_eq!(view.heat.len(), 2);
        assert_eq!(view.densest.unwrap().count, 2);
    }

    #[test]
    fn serializes_for_the_renderer() {
        let state = AppState::from_dataset(definition(), dataset()).unwrap();
        let json = serde_json::to_value(state.view().unwrap()).unwrap();
        assert_eq!(json["markers"][0]["popup"]["bikeLane"], "Yes");
        assert_eq!(json["heatStyle"]["radius"], 25);
        assert!((json["heat"][0]["weight"].as_f64().unwrap() - 0.7).abs() < 1e-12);
    }
}
