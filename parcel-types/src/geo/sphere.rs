//! Measurements on a sphere for points in geographic coordinates.

use crate::error::ParcelTypesError;
use crate::geo::GeoPoint;
use crate::{Polygon, Ring};

/// Mean earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3963.17;
/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;
/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two points calculated with the haversine formula:
///
/// ```text
/// a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)
/// d = 2·R·asin(√a)
/// ```
///
/// The function does not depend on the units of the `radius`: the result is in the same units, so passing the earth
/// radius in miles gives the distance in miles.
///
/// Returns an error if latitude of any point is outside of `[-90, 90]` or longitude is outside of `[-180, 180]`.
pub fn great_circle_distance(
    a: &impl GeoPoint<Num = f64>,
    b: &impl GeoPoint<Num = f64>,
    radius: f64,
) -> Result<f64, ParcelTypesError> {
    check_point(a)?;
    check_point(b)?;

    Ok(a.haversine_distance(b, radius))
}

/// Area enclosed by a ring of longitude/latitude points on a sphere with the given radius. The result is in the
/// squared units of the `radius`.
///
/// Edges of the ring are treated as rhumb segments in the equal-area cylindrical sense, which is exact for edges along
/// parallels and meridians and a close approximation for the short edges typical for administrative boundaries.
pub fn spherical_ring_area(ring: &Ring, radius: f64) -> Result<f64, ParcelTypesError> {
    for point in ring.points() {
        check_point(point)?;
    }

    let sum: f64 = ring
        .points()
        .windows(2)
        .map(|w| {
            let (p1, p2) = (&w[0], &w[1]);
            let mut d_lon = p2.lon_rad() - p1.lon_rad();
            // Edges crossing the antimeridian go the short way around.
            if d_lon > std::f64::consts::PI {
                d_lon -= std::f64::consts::TAU;
            } else if d_lon < -std::f64::consts::PI {
                d_lon += std::f64::consts::TAU;
            }

            d_lon * (2.0 + p1.lat_rad().sin() + p2.lat_rad().sin())
        })
        .sum();

    let area = (sum * radius * radius / 2.0).abs();
    if area == 0.0 {
        return Err(ParcelTypesError::DegenerateGeometry(
            "ring encloses zero area".into(),
        ));
    }

    Ok(area)
}

/// Area of a polygon of longitude/latitude points on a sphere: area of the outer ring minus areas of the holes.
pub fn spherical_polygon_area(polygon: &Polygon, radius: f64) -> Result<f64, ParcelTypesError> {
    let mut area = spherical_ring_area(polygon.outer(), radius)?;
    for hole in polygon.holes() {
        area -= spherical_ring_area(hole, radius)?;
    }

    Ok(area.max(0.0))
}

fn check_point(point: &impl GeoPoint<Num = f64>) -> Result<(), ParcelTypesError> {
    if point.is_valid_geo() {
        Ok(())
    } else {
        Err(ParcelTypesError::InvalidCoordinate {
            x: point.lon(),
            y: point.lat(),
        })
    }
}
