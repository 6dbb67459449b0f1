//! Densest-cluster estimation.
//!
//! Two interchangeable strategies: [`GridBinning`] bins points into
//! fixed-size cells in O(n) and is the default; [`PairwiseRadius`]
//! counts ground-distance neighbors in O(n²) and suits small inputs.
//! [`AutoDensity`] picks between them by input size.
//!
//! All strategies skip points with invalid coordinates, return `None`
//! when nothing usable remains, and break ties in favor of the cell or
//! point seen first in input order.

use std::collections::HashMap;

use bike_map_accident_models::LngLat;
use bike_map_analytics_models::{AnalysisConfig, DensestCluster, DensityStrategyKind};
use bike_map_spatial::LocalProjection;
use bike_map_spatial::geometry::haversine_meters;

use crate::AnalyticsError;

/// Finds the densest cluster in a set of positions.
pub trait DensityStrategy: Send + Sync {
    /// The densest cluster, or `None` if no position is usable.
    fn densest(&self, points: &[LngLat]) -> Option<DensestCluster>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Accumulated members of one grid cell.
#[derive(Debug, Clone, Copy)]
struct Cell {
    /// Input index of the cell's first member.
    first: usize,
    count: u64,
    lng_sum: f64,
    lat_sum: f64,
}

impl Cell {
    /// More members wins; equal counts go to the earlier first member.
    const fn beats(&self, other: &Self) -> bool {
        self.count > other.count || (self.count == other.count && self.first < other.first)
    }
}

/// Grid shifts as fractions of a cell, tried in this order.
const HALF_CELL_SHIFTS: [(f64, f64); 4] = [(0.0, 0.0), (0.0, 0.5), (0.5, 0.0), (0.5, 0.5)];

/// Fixed-size grid binning.
///
/// A point's cell is `floor((lat - shift_lat) / cell_lat)` and
/// `floor((lng - shift_lng) / cell_lng)`. Binning runs once for each
/// combination of a zero or half-cell shift per axis and keeps the fullest
/// cell of all four runs, so any cluster spanning less than half a cell on
/// each axis lands whole in at least one run regardless of where cell
/// edges fall. The reported center is the mean of the cell's members
/// rather than the cell's midpoint.
///
/// Equal counts go to the cell whose first member comes earliest in the
/// input, then to the earlier run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBinning {
    cell_lat_degrees: f64,
    cell_lng_degrees: f64,
}

impl GridBinning {
    /// Cells of the given size in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCellSize`] if either size isn't
    /// finite and positive.
    pub fn from_degrees(cell_lat_degrees: f64, cell_lng_degrees: f64) -> Result<Self, AnalyticsError> {
        for size in [cell_lat_degrees, cell_lng_degrees] {
            if !size.is_finite() || size <= 0.0 {
                return Err(AnalyticsError::InvalidCellSize { size });
            }
        }
        Ok(Self {
            cell_lat_degrees,
            cell_lng_degrees,
        })
    }

    /// Square cells of `cell_meters` on a side, converted to degrees at the
    /// projection's anchor latitude.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidCellSize`] if `cell_meters` isn't
    /// finite and positive.
    pub fn from_meters(cell_meters: f64, projection: &LocalProjection) -> Result<Self, AnalyticsError> {
        if !cell_meters.is_finite() || cell_meters <= 0.0 {
            return Err(AnalyticsError::InvalidCellSize { size: cell_meters });
        }
        Self::from_degrees(
            projection.meters_to_lat_degrees(cell_meters),
            projection.meters_to_lng_degrees(cell_meters),
        )
    }

    /// Cell height in degrees of latitude.
    #[must_use]
    pub const fn cell_lat_degrees(&self) -> f64 {
        self.cell_lat_degrees
    }

    /// Cell width in degrees of longitude.
    #[must_use]
    pub const fn cell_lng_degrees(&self) -> f64 {
        self.cell_lng_degrees
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, shift: LngLat, p: LngLat) -> (i64, i64) {
        (
            ((p.lat - shift.lat) / self.cell_lat_degrees).floor() as i64,
            ((p.lng - shift.lng) / self.cell_lng_degrees).floor() as i64,
        )
    }

    /// Bins `points` on the grid shifted by `shift` degrees and returns
    /// its fullest cell.
    fn fullest_cell(&self, points: &[LngLat], shift: LngLat) -> Option<Cell> {
        let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
        let mut cells: Vec<Cell> = Vec::new();

        for (i, p) in points.iter().enumerate() {
            let slot = *slots.entry(self.cell_of(shift, *p)).or_insert_with(|| {
                cells.push(Cell {
                    first: i,
                    count: 0,
                    lng_sum: 0.0,
                    lat_sum: 0.0,
                });
                cells.len() - 1
            });
            let cell = &mut cells[slot];
            cell.count += 1;
            cell.lng_sum += p.lng;
            cell.lat_sum += p.lat;
        }

        cells.into_iter().reduce(|best, cell| if cell.beats(&best) { cell } else { best })
    }
}

impl DensityStrategy for GridBinning {
    #[allow(clippy::cast_precision_loss)]
    fn densest(&self, points: &[LngLat]) -> Option<DensestCluster> {
        let valid: Vec<LngLat> = points.iter().copied().filter(LngLat::is_valid).collect();

        let best = HALF_CELL_SHIFTS
            .iter()
            .filter_map(|(lat_frac, lng_frac)| {
                let shift = LngLat::new(
                    lng_frac * self.cell_lng_degrees,
                    lat_frac * self.cell_lat_degrees,
                );
                self.fullest_cell(&valid, shift)
            })
            .reduce(|best, cell| if cell.beats(&best) { cell } else { best })?;

        Some(DensestCluster {
            center: LngLat::new(
                best.lng_sum / best.count as f64,
                best.lat_sum / best.count as f64,
            ),
            count: best.count,
        })
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

/// Neighbor counting within a ground radius.
///
/// The densest point is the one with the most other points within
/// `radius_meters`; its count includes itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseRadius {
    radius_meters: f64,
}

impl PairwiseRadius {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidRadius`] if the radius isn't finite
    /// and positive.
    pub fn new(radius_meters: f64) -> Result<Self, AnalyticsError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(AnalyticsError::InvalidRadius {
                radius: radius_meters,
            });
        }
        Ok(Self { radius_meters })
    }

    /// Neighbor radius in meters.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}

impl DensityStrategy for PairwiseRadius {
    fn densest(&self, points: &[LngLat]) -> Option<DensestCluster> {
        let valid: Vec<LngLat> = points.iter().copied().filter(LngLat::is_valid).collect();

        let mut best: Option<(LngLat, u64)> = None;
        for (i, p) in valid.iter().enumerate() {
            let neighbors = valid
                .iter()
                .enumerate()
                .filter(|(j, q)| *j != i && haversine_meters(*p, **q) <= self.radius_meters)
                .count() as u64;

            if best.is_none_or(|(_, n)| neighbors > n) {
                best = Some((*p, neighbors));
            }
        }

        best.map(|(center, neighbors)| DensestCluster {
            center,
            count: neighbors + 1,
        })
    }

    fn name(&self) -> &'static str {
        "pairwise"
    }
}

/// Pairwise for inputs up to `max_pairwise_points`, grid otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoDensity {
    grid: GridBinning,
    pairwise: PairwiseRadius,
    max_pairwise_points: usize,
}

impl AutoDensity {
    /// Creates an auto strategy from its two delegates.
    #[must_use]
    pub const fn new(grid: GridBinning, pairwise: PairwiseRadius, max_pairwise_points: usize) -> Self {
        Self {
            grid,
            pairwise,
            max_pairwise_points,
        }
    }

    fn pick(&self, len: usize) -> &dyn DensityStrategy {
        if len <= self.max_pairwise_points {
            &self.pairwise
        } else {
            &self.grid
        }
    }
}

impl DensityStrategy for AutoDensity {
    fn densest(&self, points: &[LngLat]) -> Option<DensestCluster> {
        let strategy = self.pick(points.len());
        log::debug!(
            "Auto density picked {} for {} points",
            strategy.name(),
            points.len()
        );
        strategy.densest(points)
    }

    fn name(&self) -> &'static str {
        "auto"
    }
}

/// Builds the strategy named by `kind` from the analysis configuration.
///
/// # Errors
///
/// Returns an error if the configured cell size, radius, or reference
/// position is invalid.
pub fn strategy_for(
    kind: DensityStrategyKind,
    config: &AnalysisConfig,
) -> Result<Box<dyn DensityStrategy>, AnalyticsError> {
    let projection = LocalProjection::new(LngLat::new(
        config.reference_longitude,
        config.reference_latitude,
    ))?;

    Ok(match kind {
        DensityStrategyKind::Grid => {
            Box::new(GridBinning::from_meters(config.grid_cell_meters, &projection)?)
        }
        DensityStrategyKind::Pairwise => Box::new(PairwiseRadius::new(config.pairwise_radius_meters)?),
        DensityStrategyKind::Auto => Box::new(AutoDensity::new(
            GridBinning::from_meters(config.grid_cell_meters, &projection)?,
            PairwiseRadius::new(config.pairwise_radius_meters)?,
            config.pairwise_max_points,
        )),
    })
}

/// Runs `strategy` and logs the outcome.
pub fn densest_cluster(strategy: &dyn DensityStrategy, points: &[LngLat]) -> Option<DensestCluster> {
    let cluster = strategy.densest(points);
    match &cluster {
        Some(c) => log::info!(
            "Densest cluster ({}): {} accidents around ({:.6}, {:.6})",
            strategy.name(),
            c.count,
            c.center.lng,
            c.center.lat
        ),
        None => log::info!("No densest cluster: {} points, none usable", points.len()),
    }
    cluster
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster_and_outlier() -> Vec<LngLat> {
        vec![
            LngLat::new(-73.564_55, 45.500_55),
            LngLat::new(-73.564_45, 45.500_65),
            LngLat::new(-73.564_35, 45.500_75),
            LngLat::new(-73.564_25, 45.500_85),
            LngLat::new(-73.600_00, 45.550_00),
        ]
    }

    fn grid() -> GridBinning {
        GridBinning::from_degrees(0.001, 0.001).unwrap()
    }

    fn pairwise() -> PairwiseRadius {
        PairwiseRadius::new(200.0).unwrap()
    }

    #[test]
    fn grid_finds_cluster_over_outlier() {
        let cluster = grid().densest(&cluster_and_outlier()).unwrap();
        assert_eq!(cluster.count, 4);
        assert!((cluster.center.lng - -73.5644).abs() < 1e-9);
        assert!((cluster.center.lat - 45.5007).abs() < 1e-9);
    }

    #[test]
    fn grid_keeps_a_cluster_on_cell_edges_together() {
        // Straddles both 0.001° edges through (-73.5600, 45.5000).
        let cluster = [
            LngLat::new(-73.5600, 45.5000),
            LngLat::new(-73.5601, 45.5001),
            LngLat::new(-73.5599, 45.4999),
            LngLat::new(-73.5601, 45.4999),
        ];

        for outlier in [
            LngLat::new(-73.7000, 45.6000),
            LngLat::new(-73.6000, 45.5505),
            LngLat::new(-73.612_345, 45.543_21),
        ] {
            let mut points = vec![outlier];
            points.extend(cluster);
            let found = grid().densest(&points).unwrap();
            assert_eq!(found.count, 4, "outlier first at {outlier:?}");
            assert!((found.center.lng - -73.560_025).abs() < 1e-9);
            assert!((found.center.lat - 45.499_975).abs() < 1e-9);

            points.rotate_left(1);
            assert_eq!(grid().densest(&points).unwrap().count, 4);
        }
    }

    #[test]
    fn grid_result_ignores_input_order() {
        let mut points = cluster_and_outlier();
        let forward = grid().densest(&points).unwrap();
        points.reverse();
        let backward = grid().densest(&points).unwrap();
        assert_eq!(forward.count, backward.count);
        assert!((forward.center.lng - backward.center.lng).abs() < 1e-9);
        assert!((forward.center.lat - backward.center.lat).abs() < 1e-9);
    }

    #[test]
    fn pairwise_finds_cluster_over_outlier() {
        let cluster = pairwise().densest(&cluster_and_outlier()).unwrap();
        assert_eq!(cluster.count, 4);
        assert_eq!(cluster.center, cluster_and_outlier()[0]);
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(grid().densest(&[]).is_none());
        assert!(pairwise().densest(&[]).is_none());
        let auto = AutoDensity::new(grid(), pairwise(), 10);
        assert!(auto.densest(&[]).is_none());
    }

    #[test]
    fn invalid_points_are_skipped() {
        let points = [
            LngLat::new(f64::NAN, 45.5),
            LngLat::new(-73.5, f64::INFINITY),
            LngLat::new(200.0, 45.5),
        ];
        assert!(grid().densest(&points).is_none());
        assert!(pairwise().densest(&points).is_none());

        let mut mixed = cluster_and_outlier();
        mixed.insert(0, LngLat::new(f64::NAN, f64::NAN));
        assert_eq!(grid().densest(&mixed).unwrap().count, 4);
        assert_eq!(pairwise().densest(&mixed).unwrap().count, 4);
    }

    #[test]
    fn single_point_is_its_own_cluster() {
        let p = LngLat::new(-73.57, 45.51);
        let g = grid().densest(&[p]).unwrap();
        assert_eq!(g.count, 1);
        assert!((g.center.lng - p.lng).abs() < 1e-12);
        assert_eq!(pairwise().densest(&[p]).unwrap(), DensestCluster { center: p, count: 1 });
    }

    #[test]
    fn grid_ties_go_to_first_cell() {
        let points = [
            LngLat::new(-73.600_5, 45.550_5),
            LngLat::new(-73.564_5, 45.500_5),
            LngLat::new(-73.600_4, 45.550_4),
            LngLat::new(-73.564_4, 45.500_4),
        ];
        let cluster = grid().densest(&points).unwrap();
        assert_eq!(cluster.count, 2);
        assert!((cluster.center.lng - -73.600_45).abs() < 1e-9);
    }

    #[test]
    fn pairwise_ties_go_to_first_point() {
        let far_apart = [
            LngLat::new(-73.70, 45.60),
            LngLat::new(-73.50, 45.40),
            LngLat::new(-73.60, 45.50),
        ];
        let cluster = pairwise().densest(&far_apart).unwrap();
        assert_eq!(cluster.center, far_apart[0]);
        assert_eq!(cluster.count, 1);
    }

    #[test]
    fn grid_from_meters_matches_projection() {
        let projection = LocalProjection::new(LngLat::new(-73.561_668, 45.508_888)).unwrap();
        let g = GridBinning::from_meters(150.0, &projection).unwrap();
        assert!((g.cell_lat_degrees() * 110_574.0 - 150.0).abs() < 1e-6);
        assert!(g.cell_lng_degrees() > g.cell_lat_degrees());
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(GridBinning::from_degrees(0.0, 0.001).is_err());
        assert!(GridBinning::from_degrees(0.001, f64::NAN).is_err());
        assert!(PairwiseRadius::new(-1.0).is_err());
        assert!(PairwiseRadius::new(f64::INFINITY).is_err());
    }

    #[test]
    fn auto_switches_on_input_size() {
        let auto = AutoDensity::new(grid(), pairwise(), 3);
        assert_eq!(auto.pick(3).name(), "pairwise");
        assert_eq!(auto.pick(4).name(), "grid");
        assert_eq!(auto.densest(&cluster_and_outlier()).unwrap().count, 4);
    }

    #[test]
    fn strategy_for_uses_configuration() {
        let config = AnalysisConfig::default();
        for kind in [
            DensityStrategyKind::Grid,
            DensityStrategyKind::Pairwise,
            DensityStrategyKind::Auto,
        ] {
            let strategy = strategy_for(kind, &config).unwrap();
            assert_eq!(strategy.name(), kind.as_ref());
            assert_eq!(strategy.densest(&cluster_and_outlier()).unwrap().count, 4);
        }

        let bad = AnalysisConfig {
            grid_cell_meters: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(strategy_for(DensityStrategyKind::Grid, &bad).is_err());
    }
}
