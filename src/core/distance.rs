use std::f64::consts::{FRAC_PI_2, PI};

use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack added to every bounding box edge so rounding never drops a point lying on the radius
const BBOX_EPSILON_DEG: f64 = 1e-9;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    // Rounding can push `a` slightly past 1 near antipodes
    let a = ((delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two coordinates in kilometers
#[inline]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Calculate a bounding box enclosing every point within `radius_km` of a center
///
/// Cheaper than Haversine, used as a pre-filter. The box is conservative:
/// longitude bounds widen to the whole globe when the circle reaches a pole
/// or crosses the antimeridian.
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lon` - Center longitude in degrees
/// * `radius_km` - Radius in kilometers
///
/// # Returns
/// BoundingBox with min/max lat/lon in degrees
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();

    let min_lat = lat_rad - angular;
    let max_lat = lat_rad + angular;

    let (min_lat, max_lat, min_lon, max_lon) = if min_lat > -FRAC_PI_2 && max_lat < FRAC_PI_2 {
        let delta_lon = (angular.sin() / lat_rad.cos()).asin();
        let (min_lon, max_lon) = (lon_rad - delta_lon, lon_rad + delta_lon);
        if min_lon < -PI || max_lon > PI {
            (min_lat, max_lat, -PI, PI)
        } else {
            (min_lat, max_lat, min_lon, max_lon)
        }
    } else {
        (min_lat.max(-FRAC_PI_2), max_lat.min(FRAC_PI_2), -PI, PI)
    };

    BoundingBox {
        min_lat: min_lat.to_degrees() - BBOX_EPSILON_DEG,
        max_lat: max_lat.to_degrees() + BBOX_EPSILON_DEG,
        min_lon: min_lon.to_degrees() - BBOX_EPSILON_DEG,
        max_lon: max_lon.to_degrees() + BBOX_EPSILON_DEG,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}
