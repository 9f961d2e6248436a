//! Radial projection of exit points out of a circular zone.
//!
//! Works in a locally flat approximation: degrees of latitude are treated as
//! a constant length and longitude offsets are stretched by `1 / cos(lat)` to
//! account for meridian convergence. Close to the poles that approximation
//! collapses, so the point is placed along the great circle with the same
//! bearing instead.

use crate::{Coordinate, EARTH_RADIUS_M};

/// Lower bound for `cos(latitude)` so projections near the poles stay finite.
const MIN_COS_LATITUDE: f64 = 1e-6;

/// Beyond this latitude the flat projection is replaced by a great-circle one.
const POLAR_LATITUDE: f64 = 85.0;

/// Length of one degree of latitude on the haversine sphere, in meters.
#[inline]
pub fn meters_per_degree() -> f64 {
    EARTH_RADIUS_M * std::f64::consts::PI / 180.0
}

/// Projects a point `radius_m + margin_m` away from `center`, in the direction
/// from `center` towards `user`.
///
/// When `user` and `center` coincide the direction is undefined; the point is
/// then projected due north. The longitude difference is taken the short way
/// round, so a user just across the antimeridian still points away from the
/// center. The result is never NaN: a non-finite or negative reach collapses
/// to the center itself.
///
/// Whenever the reach is positive the result lies `radius_m + margin_m` from
/// the center, including near the poles where the path may cross over them.
///
/// # Example
/// ```
/// use safepath_geo::{distance_meters, project_exit_point, Coordinate};
///
/// let center = Coordinate::new(12.9716, 77.5946);
/// let user = Coordinate::new(12.9750, 77.5990);
///
/// let exit = project_exit_point(&user, &center, 2000.0, 300.0);
/// assert!(distance_meters(&exit, &center) > 2000.0);
/// ```
pub fn project_exit_point(
    user: &Coordinate,
    center: &Coordinate,
    radius_m: f64,
    margin_m: f64,
) -> Coordinate {
    let d_lat = user.latitude - center.latitude;
    let d_lon = wrap_longitude(user.longitude - center.longitude);
    let len = d_lat.hypot(d_lon);

    let (unit_lat, unit_lon) = if len.is_finite() && len > f64::EPSILON {
        (d_lat / len, d_lon / len)
    } else {
        (1.0, 0.0)
    };

    let reach = radius_m + margin_m;
    let reach = if reach.is_finite() && reach > 0.0 { reach } else { 0.0 };
    let offset_deg = reach / meters_per_degree();

    let latitude = center.latitude + unit_lat * offset_deg;
    if center.latitude.abs() > POLAR_LATITUDE || latitude.abs() > POLAR_LATITUDE {
        let bearing = unit_lon.atan2(unit_lat);
        return great_circle_destination(center, bearing, reach);
    }

    let cos_lat = center.latitude.to_radians().cos().abs().max(MIN_COS_LATITUDE);
    let longitude = wrap_longitude(center.longitude + unit_lon * offset_deg / cos_lat);

    Coordinate::new(latitude, longitude)
}

/// Point `distance_m` from `origin` along the great circle leaving it at
/// `bearing` (radians clockwise from north).
fn great_circle_destination(origin: &Coordinate, bearing: f64, distance_m: f64) -> Coordinate {
    let (lat1, lon1) = origin.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let sin_lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos())
        .clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * sin_lat2);

    Coordinate::new(
        lat2.to_degrees().clamp(-90.0, 90.0),
        wrap_longitude(lon2.to_degrees()),
    )
}

/// Wraps a longitude into `[-180, 180)`.
#[inline]
fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}
