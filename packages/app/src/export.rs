//! Tagged `GeoJSON` output.

use geojson::FeatureCollection;

use crate::AppError;
use crate::state::AppState;

/// Property holding the bike-lane tag.
pub const ON_BIKELANE_PROPERTY: &str = "ON_BIKELANE";
/// Property holding the accident type label.
pub const ACCIDENT_TYPE_PROPERTY: &str = "ACCIDENT_TYPE";
/// Property holding the weather label.
pub const WEATHER_LABEL_PROPERTY: &str = "WEATHER_LABEL";
/// Property holding the lighting label.
pub const LIGHTING_LABEL_PROPERTY: &str = "LIGHTING_LABEL";

impl AppState {
    /// The accident collection as loaded, with each feature's original
    /// properties plus its bike-lane tag and derived labels.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed.
    pub fn tagged_collection(&self) -> Result<FeatureCollection, AppError> {
        let data = self.data()?;
        let mut collection = data.dataset.accident_features.clone();

        for (feature, point) in collection
            .features
            .iter_mut()
            .zip(&data.dataset.accidents)
        {
            feature.set_property(ON_BIKELANE_PROPERTY, point.on_bike_lane);
            feature.set_property(ACCIDENT_TYPE_PROPERTY, point.severity().label());
            feature.set_property(WEATHER_LABEL_PROPERTY, point.weather().label());
            feature.set_property(LIGHTING_LABEL_PROPERTY, point.lighting().label());
        }

        Ok(collection)
    }
}
