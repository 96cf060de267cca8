//! Spatial math for base-to-fire distances.

use crate::error::{DispatchError, Result};
use crate::models::GeoPoint;

/// Mean Earth radius used by the great-circle formula.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Calculate distance between two points in kilometers using the Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Reject points outside [-90, 90] x [-180, 180] or containing NaN.
pub fn validate_coordinate(point: GeoPoint) -> Result<()> {
    let lat_ok = point.lat.is_finite() && (-90.0..=90.0).contains(&point.lat);
    let lon_ok = point.lon.is_finite() && (-180.0..=180.0).contains(&point.lon);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(DispatchError::InvalidCoordinate {
            lat: point.lat,
            lon: point.lon,
        })
    }
}

/// Validated great-circle distance between two points.
pub fn distance_km(from: GeoPoint, to: GeoPoint) -> Result<f64> {
    validate_coordinate(from)?;
    validate_coordinate(to)?;
    Ok(haversine_km(from.lat, from.lon, to.lat, to.lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111.195).abs() < 0.1);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_km(37.5665, 126.978, 37.5665, 126.978);
        assert!(dist < 1e-9);
    }

    #[test]
    fn out_of_range_latitude_is_rejected() {
        let err = distance_km(GeoPoint::new(90.5, 0.0), GeoPoint::new(0.0, 0.0));
        assert!(matches!(err, Err(DispatchError::InvalidCoordinate { .. })));
    }

    #[test]
    fn nan_longitude_is_rejected() {
        let err = validate_coordinate(GeoPoint::new(10.0, f64::NAN));
        assert!(err.is_err());
    }
}
