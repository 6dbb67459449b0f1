//! The application's single source of truth.

use bike_map_accident_models::{AccidentPoint, CategoryKey, LngLat};
use bike_map_analytics::{constant_weight, densest_cluster, heat_points, strategy_for, summarize};
use bike_map_analytics_models::{
    CategoryBreakdown, DensestCluster, DensityStrategyKind, HeatPoint,
};
use bike_map_filter::{FilterSelection, apply};
use bike_map_source::loader::{Dataset, load_dataset};
use bike_map_source::progress::ProgressCallback;
use bike_map_source::source_def::{AnalysisConfig, SourceDefinition};
use bike_map_spatial::{LaneBufferIndex, LocalProjection, TagReport, tag_all};

use crate::AppError;

/// Whether analysis can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppStatus {
    /// Data loaded and tagged.
    Ready,
    /// Loading failed; every query returns [`AppError::Disabled`].
    Disabled {
        /// Why loading failed.
        reason: String,
    },
}

/// Data available once loading succeeds.
#[derive(Debug)]
pub struct LoadedData {
    /// Loaded collections. `dataset.accidents` are tagged.
    pub dataset: Dataset,
    /// Buffered lane network.
    pub index: LaneBufferIndex,
    /// Tagging counts.
    pub tag_report: TagReport,
}

/// Loaded data plus the user's current view choices.
#[derive(Debug)]
pub struct AppState {
    definition: SourceDefinition,
    data: Option<LoadedData>,
    status: AppStatus,
    selection: FilterSelection,
    color_by: Option<CategoryKey>,
    strategy: DensityStrategyKind,
}

impl AppState {
    /// Loads the source and tags every accident.
    ///
    /// Never fails: a load or index error leaves the state
    /// [`AppStatus::Disabled`] with the error as its reason.
    pub async fn load(definition: SourceDefinition, progress: &dyn ProgressCallback) -> Self {
        match load_dataset(&definition, progress).await {
            Ok(dataset) => match Self::from_dataset(definition.clone(), dataset) {
                Ok(state) => state,
                Err(e) => Self::disabled(definition, e.to_string()),
            },
            Err(e) => Self::disabled(definition, e.to_string()),
        }
    }

    /// Builds the lane index from an already-loaded dataset and tags its
    /// accidents.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Spatial`] if the configured radius or reference
    /// position is invalid.
    pub fn from_dataset(definition: SourceDefinition, mut dataset: Dataset) -> Result<Self, AppError> {
        let analysis = &definition.analysis;
        let projection = LocalProjection::new(LngLat::new(
            analysis.reference_longitude,
            analysis.reference_latitude,
        ))?;
        let index = LaneBufferIndex::build(&dataset.lanes, analysis.buffer_radius_meters, projection)?;
        let tag_report = tag_all(&mut dataset.accidents, &index);

        let strategy = analysis.density_strategy;
        Ok(Self {
            definition,
            data: Some(LoadedData {
                dataset,
                index,
                tag_report,
            }),
            status: AppStatus::Ready,
            selection: FilterSelection::new(),
            color_by: None,
            strategy,
        })
    }

    /// A state with no data.
    #[must_use]
    pub fn disabled(definition: SourceDefinition, reason: String) -> Self {
        log::warn!("Analysis disabled: {reason}");
        let strategy = definition.analysis.density_strategy;
        Self {
            definition,
            data: None,
            status: AppStatus::Disabled { reason },
            selection: FilterSelection::new(),
            color_by: None,
            strategy,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> &AppStatus {
        &self.status
    }

    /// The source this state was loaded from.
    #[must_use]
    pub const fn definition(&self) -> &SourceDefinition {
        &self.definition
    }

    /// Analysis settings in effect.
    #[must_use]
    pub const fn analysis(&self) -> &AnalysisConfig {
        &self.definition.analysis
    }

    /// Loaded data.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed.
    pub fn data(&self) -> Result<&LoadedData, AppError> {
        match (&self.status, &self.data) {
            (AppStatus::Ready, Some(data)) => Ok(data),
            (AppStatus::Disabled { reason }, _) => Err(AppError::Disabled {
                reason: reason.clone(),
            }),
            (AppStatus::Ready, None) => Err(AppError::Disabled {
                reason: "no data loaded".to_string(),
            }),
        }
    }

    /// Every tagged accident, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed.
    pub fn accidents(&self) -> Result<&[AccidentPoint], AppError> {
        Ok(&self.data()?.dataset.accidents)
    }

    /// Active filter.
    #[must_use]
    pub const fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Replaces the active filter.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        log::debug!("Filter set to '{selection}'");
        self.selection = selection;
    }

    /// Edits the active filter in place.
    pub const fn selection_mut(&mut self) -> &mut FilterSelection {
        &mut self.selection
    }

    /// Category markers are colored by, if any.
    #[must_use]
    pub const fn color_by(&self) -> Option<CategoryKey> {
        self.color_by
    }

    /// Sets the color-by category.
    pub const fn set_color_by(&mut self, key: Option<CategoryKey>) {
        self.color_by = key;
    }

    /// Densest-cluster algorithm in use.
    #[must_use]
    pub const fn strategy(&self) -> DensityStrategyKind {
        self.strategy
    }

    /// Switches the densest-cluster algorithm.
    pub const fn set_strategy(&mut self, strategy: DensityStrategyKind) {
        self.strategy = strategy;
    }

    /// Accidents passing the active filter, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed.
    pub fn filtered(&self) -> Result<Vec<&AccidentPoint>, AppError> {
        Ok(apply(self.accidents()?, &self.selection))
    }

    /// Densest cluster of the filtered accidents.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed, or
    /// [`AppError::Analytics`] if the density settings are invalid.
    pub fn densest(&self) -> Result<Option<DensestCluster>, AppError> {
        let positions: Vec<LngLat> = self
            .filtered()?
            .iter()
            .filter_map(|p| p.valid_position())
            .collect();
        let strategy = strategy_for(self.strategy, self.analysis())?;
        Ok(densest_cluster(strategy.as_ref(), &positions))
    }

    /// Heat points for the filtered accidents at the configured weight.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed.
    pub fn heat(&self) -> Result<Vec<HeatPoint>, AppError> {
        Ok(heat_points(
            self.filtered()?,
            constant_weight(self.analysis().heat_weight),
        ))
    }

    /// Per-label counts of the filtered accidents.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Disabled`] if loading failed.
    pub fn summary(&self, key: CategoryKey) -> Result<CategoryBreakdown, AppError> {
        Ok(summarize(self.filtered()?, key))
    }
}
