use geo_types::{Coord, LineString};

use crate::error::ParcelTypesError;
use crate::{MultiPolygon, Point2d, Polygon, Ring};

impl From<&Ring> for LineString<f64> {
    fn from(value: &Ring) -> Self {
        value.points().iter().map(|p| Coord::from(*p)).collect()
    }
}

impl TryFrom<&LineString<f64>> for Ring {
    type Error = ParcelTypesError;

    /// Open line strings are closed by repeating the first point.
    fn try_from(value: &LineString<f64>) -> Result<Self, Self::Error> {
        Ring::closing(value.coords().map(|c| Point2d::from(*c)).collect())
    }
}

impl From<&Polygon> for geo_types::Polygon<f64> {
    fn from(value: &Polygon) -> Self {
        geo_types::Polygon::new(
            value.outer().into(),
            value.holes().iter().map(LineString::from).collect(),
        )
    }
}

impl TryFrom<&geo_types::Polygon<f64>> for Polygon {
    type Error = ParcelTypesError;

    fn try_from(value: &geo_types::Polygon<f64>) -> Result<Self, Self::Error> {
        let outer = Ring::try_from(value.exterior())?;
        let holes = value
            .interiors()
            .iter()
            .map(Ring::try_from)
            .collect::<Result<_, _>>()?;

        Polygon::new(outer, holes)
    }
}

impl From<&MultiPolygon> for geo_types::MultiPolygon<f64> {
    fn from(value: &MultiPolygon) -> Self {
        value
            .parts()
            .iter()
            .map(geo_types::Polygon::from)
            .collect()
    }
}

impl TryFrom<&geo_types::MultiPolygon<f64>> for MultiPolygon {
    type Error = ParcelTypesError;

    fn try_from(value: &geo_types::MultiPolygon<f64>) -> Result<Self, Self::Error> {
        value
            .iter()
            .map(Polygon::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(MultiPolygon::new)
    }
}
