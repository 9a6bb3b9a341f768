use crate::cartesian::{CartesianPoint2d, NewCartesianPoint2d};
use crate::geo::{GeoPoint, NewGeoPoint};
use crate::Point2d;
use geo_types::{coord, point, Coord, CoordNum};
use nalgebra::Scalar;
use num_traits::{Bounded, Float, FromPrimitive};

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> CartesianPoint2d for geo_types::Point<T> {
    type Num = T;

    fn x(&self) -> Self::Num {
        self.0.x
    }

    fn y(&self) -> Self::Num {
        self.0.y
    }
}

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> NewCartesianPoint2d<T>
    for geo_types::Point<T>
{
    fn new(x: T, y: T) -> Self {
        point!(x: x, y: y)
    }
}

impl<T: CoordNum + Float + FromPrimitive> GeoPoint for geo_types::Point<T> {
    type Num = T;

    fn lat(&self) -> Self::Num {
        self.0.y
    }

    fn lon(&self) -> Self::Num {
        self.0.x
    }
}

impl<T: CoordNum + Float + FromPrimitive> NewGeoPoint<T> for geo_types::Point<T> {
    fn latlon(lat: T, lon: T) -> Self {
        point!(x: lon, y: lat)
    }
}

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> CartesianPoint2d for Coord<T> {
    type Num = T;

    fn x(&self) -> Self::Num {
        self.x
    }

    fn y(&self) -> Self::Num {
        self.y
    }
}

impl<T: CoordNum + Bounded + Scalar + FromPrimitive> NewCartesianPoint2d<T> for Coord<T> {
    fn new(x: T, y: T) -> Self {
        coord!(x: x, y: y)
    }
}

impl From<Point2d> for Coord<f64> {
    fn from(value: Point2d) -> Self {
        coord!(x: value.x(), y: value.y())
    }
}

impl From<Coord<f64>> for Point2d {
    fn from(value: Coord<f64>) -> Self {
        Point2d::new(value.x, value.y)
    }
}

impl From<Point2d> for geo_types::Point<f64> {
    fn from(value: Point2d) -> Self {
        point!(x: value.x(), y: value.y())
    }
}

impl From<geo_types::Point<f64>> for Point2d {
    fn from(value: geo_types::Point<f64>) -> Self {
        Point2d::new(value.0.x, value.0.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::sphere::{great_circle_distance, EARTH_RADIUS_KM};
    use approx::assert_abs_diff_eq;

    #[test]
    fn geo_types_points_are_geo_points() {
        let a = point!(x: 0.0, y: 0.0);
        let b = point!(x: 0.0, y: 1.0);
        assert_abs_diff_eq!(
            great_circle_distance(&a, &b, EARTH_RADIUS_KM).unwrap(),
            111.195,
            epsilon = 1e-3
        );
    }

    #[test]
    fn conversion() {
        let point = Point2d::new(1.5, -2.0);
        let geo_point: geo_types::Point<f64> = point.into();
        assert_eq!(geo_point.x(), 1.5);
        assert_eq!(Point2d::from(geo_point), point);
        assert_eq!(Point2d::from(Coord::from(point)), point);
    }
}
