use crate::cartesian::{CartesianPoint2d, NewCartesianPoint2d};
use crate::geo::{GeoPoint, NewGeoPoint};
use approx::{AbsDiffEq, RelativeEq};
use nalgebra::Scalar;
use num_traits::{Bounded, Float, FromPrimitive};
use serde::{Deserialize, Serialize};

/// Immutable 2d point.
///
/// Depending on the CRS of the collection the point belongs to, `x` and `y` are either longitude and latitude in
/// degrees, or easting and northing in the units of the projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2d<Num = f64> {
    x: Num,
    y: Num,
}

impl<Num: num_traits::Num + Copy> Point2d<Num> {
    /// Creates a new point.
    pub const fn new(x: Num, y: Num) -> Self {
        Self { x, y }
    }

    /// X coordinate (longitude).
    pub fn x(&self) -> Num {
        self.x
    }

    /// Y coordinate (latitude).
    pub fn y(&self) -> Num {
        self.y
    }
}

impl<Num: num_traits::Num + Copy + PartialOrd + Bounded + Scalar + FromPrimitive> CartesianPoint2d
    for Point2d<Num>
{
    type Num = Num;

    fn x(&self) -> Num {
        self.x
    }

    fn y(&self) -> Num {
        self.y
    }
}

impl<Num: num_traits::Num + Copy + PartialOrd + Bounded + Scalar + FromPrimitive>
    NewCartesianPoint2d<Num> for Point2d<Num>
{
    fn new(x: Num, y: Num) -> Self {
        Self { x, y }
    }
}

impl<Num: Float + FromPrimitive> GeoPoint for Point2d<Num> {
    type Num = Num;

    fn lat(&self) -> Num {
        self.y
    }

    fn lon(&self) -> Num {
        self.x
    }
}

impl<Num: Float + FromPrimitive> NewGeoPoint<Num> for Point2d<Num> {
    fn latlon(lat: Num, lon: Num) -> Self {
        Self { x: lon, y: lat }
    }
}

impl AbsDiffEq for Point2d {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for Point2d {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}

/// Creates a new [`Point2d`] from longitude and latitude values (in degrees).
///
/// ```
/// use parcel_types::geo::GeoPoint;
/// use parcel_types::lonlat;
///
/// let point = lonlat!(-122.4167, 37.7833);
/// assert_eq!(point.lat(), 37.7833);
/// ```
#[macro_export]
macro_rules! lonlat {
    ($lon:expr, $lat:expr) => {
        <$crate::Point2d as $crate::geo::NewGeoPoint<f64>>::lonlat($lon, $lat)
    };
}
