//! Geometry primitives in a local metric frame.
//!
//! Buffers must have a constant ground radius, which degrees don't give
//! (a degree of longitude is ~78 km at Montreal but ~111 km at the
//! equator). Everything spatial is therefore done in a local
//! equirectangular projection anchored near the data, where one unit is
//! one meter. Over a city-sized extent the distortion is well under 1%.

use bike_map_accident_models::LngLat;
use geo::{Buffer, Coord, Distance, Euclidean, Haversine, LineString, MultiPolygon, Point};

use crate::SpatialError;

/// Meters per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 110_574.0;

/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEGREE_LNG_EQUATOR: f64 = 111_320.0;

/// Equirectangular projection from WGS84 degrees to local meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: LngLat,
    meters_per_degree_lng: f64,
}

impl LocalProjection {
    /// Creates a projection anchored at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidOrigin`] if `origin` isn't a valid
    /// position or is too close to a pole for longitude to scale.
    pub fn new(origin: LngLat) -> Result<Self, SpatialError> {
        if !origin.is_valid() || origin.lat.abs() >= 89.0 {
            return Err(SpatialError::InvalidOrigin {
                lng: origin.lng,
                lat: origin.lat,
            });
        }
        Ok(Self {
            origin,
            meters_per_degree_lng: METERS_PER_DEGREE_LNG_EQUATOR * origin.lat.to_radians().cos(),
        })
    }

    /// The anchor position.
    #[must_use]
    pub const fn origin(&self) -> LngLat {
        self.origin
    }

    /// Meters spanned by one degree of longitude at the anchor latitude.
    #[must_use]
    pub const fn meters_per_degree_lng(&self) -> f64 {
        self.meters_per_degree_lng
    }

    /// Projects a position to local meters.
    #[must_use]
    pub fn project(&self, p: LngLat) -> Coord<f64> {
        Coord {
            x: (p.lng - self.origin.lng) * self.meters_per_degree_lng,
            y: (p.lat - self.origin.lat) * METERS_PER_DEGREE_LAT,
        }
    }

    /// Inverse of [`Self::project`].
    #[must_use]
    pub fn unproject(&self, c: Coord<f64>) -> LngLat {
        LngLat::new(
            c.x / self.meters_per_degree_lng + self.origin.lng,
            c.y / METERS_PER_DEGREE_LAT + self.origin.lat,
        )
    }

    /// Converts a ground distance to degrees of latitude.
    #[must_use]
    pub fn meters_to_lat_degrees(&self, meters: f64) -> f64 {
        meters / METERS_PER_DEGREE_LAT
    }

    /// Converts a ground distance to degrees of longitude at the anchor.
    #[must_use]
    pub fn meters_to_lng_degrees(&self, meters: f64) -> f64 {
        meters / self.meters_per_degree_lng
    }
}

/// A polyline in projected meters, split into the part types that buffer
/// differently.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedPart {
    /// Two or more distinct positions.
    Line(LineString<f64>),
    /// A zero-length lane collapsed to its single position.
    Degenerate(Point<f64>),
}

impl ProjectedPart {
    /// Projects a lane part, dropping consecutive duplicate positions.
    /// Returns `None` for an empty part.
    #[must_use]
    pub fn from_positions(positions: &[LngLat], projection: &LocalProjection) -> Option<Self> {
        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(positions.len());
        for c in positions.iter().map(|p| projection.project(*p)) {
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }

        match coords.len() {
            0 => None,
            1 => Some(Self::Degenerate(Point(coords[0]))),
            _ => Some(Self::Line(LineString::new(coords))),
        }
    }

    /// Buffers the part by `radius` meters with round caps and joins.
    /// A degenerate part buffers to a disk.
    #[must_use]
    pub fn buffer(&self, radius: f64) -> MultiPolygon<f64> {
        match self {
            Self::Line(line) => line.buffer(radius),
            Self::Degenerate(point) => point.buffer(radius),
        }
    }

    /// Euclidean distance in meters from a projected point.
    #[must_use]
    pub fn distance_to(&self, point: &Point<f64>) -> f64 {
        match self {
            Self::Line(line) => Euclidean.distance(point, line),
            Self::Degenerate(p) => Euclidean.distance(*point, *p),
        }
    }

    /// Projected coordinates of the part.
    #[must_use]
    pub fn coords(&self) -> Vec<Coord<f64>> {
        match self {
            Self::Line(line) => line.0.clone(),
            Self::Degenerate(p) => vec![p.0],
        }
    }
}

/// Great-circle distance in meters.
#[must_use]
pub fn haversine_meters(a: LngLat, b: LngLat) -> f64 {
    Haversine.distance(Point::new(a.lng, a.lat), Point::new(b.lng, b.lat))
}
