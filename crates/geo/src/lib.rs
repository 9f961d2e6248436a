//! Geodesic helpers for the SafePath evacuation engine.
//!
//! This crate provides:
//! - Haversine distance calculations (kilometres and metres)
//! - Radial exit-point projection out of a circular hazard zone
//! - Distance ordering of place lists with optional parallelism
//!
//! # Example
//!
//! ```
//! use safepath_geo::{distance_meters, Coordinate};
//!
//! let majestic = Coordinate::new(12.9767, 77.5713);
//! let mg_road = Coordinate::new(12.9756, 77.6066);
//!
//! let meters = distance_meters(&majestic, &mg_road);
//! assert!((meters - 3830.0).abs() < 50.0);
//! ```

mod error;
mod haversine;
mod projection;
pub mod batch;

pub use batch::{distances_from, sort_by_distance};
pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{distance_meters, haversine_distance, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use projection::{meters_per_degree, project_exit_point};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside [-90, 90] x [-180, 180]"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    ///
    /// NaN fails every comparison, so non-finite input is rejected as well.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}
