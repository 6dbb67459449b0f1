//! Buffered bike-lane index.
//!
//! One [`BufferedLane`] per lane segment, stored in an R-tree keyed on its
//! envelope so a query only tests the handful of lanes near the point.

use bike_map_accident_models::{LaneSegment, LngLat};
use geo::{Intersects, MultiPolygon, Point};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::SpatialError;
use crate::geometry::{LocalProjection, ProjectedPart};

/// Extra radius, in meters, the buffer polygons are built with so their
/// polygonal arc approximation never cuts inside the true radius.
pub const BOUNDARY_TOLERANCE_METERS: f64 = 0.25;

/// A lane segment and its buffer polygon, in projected meters.
#[derive(Debug, Clone)]
pub struct BufferedLane {
    id: Option<String>,
    parts: Vec<ProjectedPart>,
    polygon: MultiPolygon<f64>,
    radius: f64,
    envelope: AABB<[f64; 2]>,
}

impl BufferedLane {
    fn build(segment: &LaneSegment, radius: f64, projection: &LocalProjection) -> Option<Self> {
        let parts: Vec<ProjectedPart> = segment
            .parts
            .iter()
            .filter_map(|p| ProjectedPart::from_positions(p, projection))
            .collect();
        if parts.is_empty() {
            return None;
        }

        let buffer_radius = radius + BOUNDARY_TOLERANCE_METERS;
        let polygon = MultiPolygon(
            parts
                .iter()
                .flat_map(|p| p.buffer(buffer_radius).0)
                .collect(),
        );
        let envelope = padded_envelope(&parts, buffer_radius);

        Some(Self {
            id: segment.id.clone(),
            parts,
            polygon,
            radius,
            envelope,
        })
    }

    /// Source lane identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The buffer polygon in projected meters.
    #[must_use]
    pub const fn polygon(&self) -> &MultiPolygon<f64> {
        &self.polygon
    }

    /// Whether a projected point is inside or on the buffer.
    ///
    /// Points within the exact radius always pass, even where the
    /// polygon's arc segments fall short of it.
    #[must_use]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.polygon.intersects(point) || self.distance_to(point) <= self.radius
    }

    /// Distance in meters from a projected point to the lane centerline.
    #[must_use]
    pub fn distance_to(&self, point: &Point<f64>) -> f64 {
        self.parts
            .iter()
            .map(|p| p.distance_to(point))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Bounding box of every part, grown by `pad` on all sides.
fn padded_envelope(parts: &[ProjectedPart], pad: f64) -> AABB<[f64; 2]> {
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for c in parts.iter().flat_map(ProjectedPart::coords) {
        min = [min[0].min(c.x), min[1].min(c.y)];
        max = [max[0].max(c.x), max[1].max(c.y)];
    }
    AABB::from_corners([min[0] - pad, min[1] - pad], [max[0] + pad, max[1] + pad])
}

impl RTreeObject for BufferedLane {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for BufferedLane {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.distance_to(&Point::new(point[0], point[1])).powi(2)
    }
}

/// Pre-built buffers for the whole lane network.
///
/// Constructed once after loading and shared read-only afterwards.
pub struct LaneBufferIndex {
    lanes: RTree<BufferedLane>,
    projection: LocalProjection,
    radius_meters: f64,
}

impl std::fmt::Debug for LaneBufferIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaneBufferIndex")
            .field("lanes", &self.lanes.size())
            .field("projection", &self.projection)
            .field("radius_meters", &self.radius_meters)
            .finish()
    }
}

impl LaneBufferIndex {
    /// Buffers every lane segment by `radius_meters`.
    ///
    /// Segments with no positions are skipped; zero-length segments
    /// buffer to a disk. An empty `lanes` slice yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidRadius`] if the radius is not a
    /// finite positive number.
    pub fn build(
        lanes: &[LaneSegment],
        radius_meters: f64,
        projection: LocalProjection,
    ) -> Result<Self, SpatialError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(SpatialError::InvalidRadius {
                radius: radius_meters,
            });
        }

        let buffered: Vec<BufferedLane> = lanes
            .iter()
            .filter_map(|lane| BufferedLane::build(lane, radius_meters, &projection))
            .collect();

        if buffered.len() < lanes.len() {
            log::warn!(
                "{} lane segments had no positions and were not buffered",
                lanes.len() - buffered.len()
            );
        }
        log::info!(
            "Buffered {} lane segments at {radius_meters}m",
            buffered.len()
        );

        Ok(Self {
            lanes: RTree::bulk_load(buffered),
            projection,
            radius_meters,
        })
    }

    /// Number of buffered lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.size()
    }

    /// Whether the index has no lanes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.size() == 0
    }

    /// Buffer radius in meters.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// The projection the buffers were built in.
    #[must_use]
    pub const fn projection(&self) -> &LocalProjection {
        &self.projection
    }

    /// Whether a position is within the buffer of at least one lane.
    ///
    /// Stops at the first matching lane. Invalid positions are never on
    /// a lane.
    #[must_use]
    pub fn classify(&self, position: LngLat) -> bool {
        if !position.is_valid() {
            return false;
        }
        let c = self.projection.project(position);
        let point = Point(c);

        self.lanes
            .locate_in_envelope_intersecting(&AABB::from_point([c.x, c.y]))
            .any(|lane| lane.contains(&point))
    }

    /// Distance in meters to the nearest lane centerline, or `None` for an
    /// empty index or invalid position.
    #[must_use]
    pub fn nearest_lane_distance_meters(&self, position: LngLat) -> Option<f64> {
        if !position.is_valid() {
            return None;
        }
        let c = self.projection.project(position);
        self.lanes
            .nearest_neighbor(&[c.x, c.y])
            .map(|lane| lane.distance_to(&Point(c)))
    }

    /// Iterates over the buffered lanes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &BufferedLane> {
        self.lanes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::haversine_meters;

    fn projection() -> LocalProjection {
        LocalProjection::new(LngLat::new(-73.561_668, 45.508_888)).unwrap()
    }

    fn straight_lane() -> LaneSegment {
        LaneSegment {
            id: Some("lane-1".to_string()),
            parts: vec![vec![
                LngLat::new(-73.5700, 45.5100),
                LngLat::new(-73.5600, 45.5100),
            ]],
        }
    }

    /// Moves `meters` north of `p`.
    fn north_of(p: LngLat, meters: f64) -> LngLat {
        LngLat::new(p.lng, p.lat + meters / crate::geometry::METERS_PER_DEGREE_LAT)
    }

    #[test]
    fn point_on_segment_is_on_lane() {
        let index = LaneBufferIndex::build(&[straight_lane()], 5.0, projection()).unwrap();
        assert!(index.classify(LngLat::new(-73.5650, 45.5100)));
    }

    #[test]
    fn distant_point_is_off_lane() {
        let index = LaneBufferIndex::build(&[straight_lane()], 5.0, projection()).unwrap();
        let far = LngLat::new(-73.5650, 45.5300);
        assert!(haversine_meters(far, LngLat::new(-73.5650, 45.5100)) > 2_000.0);
        assert!(!index.classify(far));
    }

    #[test]
    fn boundary_distances() {
        let index = LaneBufferIndex::build(&[straight_lane()], 5.0, projection()).unwrap();
        let on_line = LngLat::new(-73.5650, 45.5100);

        assert!(index.classify(north_of(on_line, 4.9)));
        assert!(index.classify(north_of(on_line, 5.0)));
        assert!(!index.classify(north_of(on_line, 6.0)));
    }

    #[test]
    fn round_caps_cover_segment_ends() {
        let index = LaneBufferIndex::build(&[straight_lane()], 5.0, projection()).unwrap();
        let end = LngLat::new(-73.5600, 45.5100);
        let past_end = LngLat::new(end.lng + projection().meters_to_lng_degrees(3.0), end.lat);
        let beyond = LngLat::new(end.lng + projection().meters_to_lng_degrees(8.0), end.lat);

        assert!(index.classify(past_end));
        assert!(!index.classify(beyond));
    }

    #[test]
    fn larger_radius_is_a_superset() {
        let small = LaneBufferIndex::build(&[straight_lane()], 5.0, projection()).unwrap();
        let large = LaneBufferIndex::build(&[straight_lane()], 10.0, projection()).unwrap();
        let on_line = LngLat::new(-73.5650, 45.5100);

        for meters in [0.0, 2.0, 4.0, 5.0, 7.0, 9.5, 12.0, 50.0] {
            let p = north_of(on_line, meters);
            if small.classify(p) {
                assert!(large.classify(p), "{meters}m passed at 5m but not at 10m");
            }
        }
        assert!(large.classify(north_of(on_line, 7.0)));
        assert!(!small.classify(north_of(on_line, 7.0)));
    }

    #[test]
    fn empty_index_classifies_nothing() {
        let index = LaneBufferIndex::build(&[], 5.0, projection()).unwrap();
        assert!(index.is_empty());
        assert!(!index.classify(LngLat::new(-73.5650, 45.5100)));
        assert!(index.nearest_lane_distance_meters(LngLat::new(-73.5650, 45.51)).is_none());
    }

    #[test]
    fn zero_length_segment_buffers_to_disk() {
        let center = LngLat::new(-73.5650, 45.5100);
        let lane = LaneSegment {
            id: None,
            parts: vec![vec![center, center]],
        };
        let index = LaneBufferIndex::build(&[lane], 5.0, projection()).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.classify(center));
        assert!(index.classify(north_of(center, 4.0)));
        assert!(!index.classify(north_of(center, 20.0)));
    }

    #[test]
    fn empty_segments_are_skipped() {
        let lane = LaneSegment {
            id: None,
            parts: vec![vec![]],
        };
        let index = LaneBufferIndex::build(&[lane, straight_lane()], 5.0, projection()).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(matches!(
            LaneBufferIndex::build(&[straight_lane()], 0.0, projection()),
            Err(SpatialError::InvalidRadius { .. })
        ));
        assert!(LaneBufferIndex::build(&[straight_lane()], f64::NAN, projection()).is_err());
    }

    #[test]
    fn invalid_positions_are_off_lane() {
        let index = LaneBufferIndex::build(&[straight_lane()], 5.0, projection()).unwrap();
        assert!(!index.classify(LngLat::new(f64::NAN, 45.51)));
    }

    #[test]
    fn nearest_lane_distance() {
        let far_lane = LaneSegment {
            id: Some("far".to_string()),
            parts: vec![vec![LngLat::new(-73.60, 45.55), LngLat::new(-73.59, 45.55)]],
        };
        let index =
            LaneBufferIndex::build(&[straight_lane(), far_lane], 5.0, projection()).unwrap();
        let p = north_of(LngLat::new(-73.5650, 45.5100), 30.0);

        let d = index.nearest_lane_distance_meters(p).unwrap();
        assert!((d - 30.0).abs() < 0.01, "expected ~30m, got {d}");
    }
}
