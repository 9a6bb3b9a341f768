//! Areas, perimeters and distances of features.
//!
//! Planar measures are calculated in the units of the CRS and then scaled to the requested unit. Geometries in
//! geographic coordinates are measured on a sphere with the mean earth radius.

use parcel_types::feature::{FeatureCollection, Field};
use parcel_types::geo::sphere::{spherical_polygon_area, EARTH_RADIUS_M};
use parcel_types::geo::units::{AreaUnit, LengthUnit};
use parcel_types::geo::{Crs, CrsTransform, GeoPoint, Projection};
use parcel_types::{Areal, CartesianPoint2dFloat, ParcelTypesError, Point2d};

pub use parcel_types::geo::sphere::{
    great_circle_distance, EARTH_RADIUS_KM, EARTH_RADIUS_MILES,
};

/// Planar area of the geometry, converted from the squares of the `crs_unit` to `unit`.
pub fn area<G: Areal>(geometry: &G, crs_unit: LengthUnit, unit: AreaUnit) -> Result<f64, ParcelTypesError> {
    Ok(unit.convert_from(geometry.area()?, crs_unit))
}

/// Area of a geometry in longitude/latitude coordinates on a sphere with the given radius. The result is in the
/// squares of the units of the radius.
pub fn geodesic_area<G: Areal>(geometry: &G, radius: f64) -> Result<f64, ParcelTypesError> {
    geometry
        .polygons()
        .map(|polygon| spherical_polygon_area(polygon, radius))
        .sum()
}

/// Measures features of collections, taking the CRS of the collection into account.
///
/// ```
/// use parcel::measurement::Measurement;
/// use parcel::geo::units::{AreaUnit, LengthUnit};
///
/// let measurement = Measurement::new()
///     .with_area_unit(AreaUnit::SquareMile)
///     .with_distance_unit(LengthUnit::Mile);
/// assert_eq!(measurement.distance_unit(), LengthUnit::Mile);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measurement {
    area_unit: AreaUnit,
    distance_unit: LengthUnit,
}

impl Default for Measurement {
    fn default() -> Self {
        Self {
            area_unit: AreaUnit::SquareMeter,
            distance_unit: LengthUnit::Meter,
        }
    }
}

impl Measurement {
    /// Measurement in square meters and meters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the unit of areas.
    pub fn with_area_unit(mut self, unit: AreaUnit) -> Self {
        self.area_unit = unit;
        self
    }

    /// Sets the unit of distances and perimeters.
    pub fn with_distance_unit(mut self, unit: LengthUnit) -> Self {
        self.distance_unit = unit;
        self
    }

    /// Unit of areas.
    pub fn area_unit(&self) -> AreaUnit {
        self.area_unit
    }

    /// Unit of distances and perimeters.
    pub fn distance_unit(&self) -> LengthUnit {
        self.distance_unit
    }

    fn radius(&self) -> f64 {
        EARTH_RADIUS_M / self.distance_unit.meters()
    }

    /// Area of a geometry in the given CRS.
    ///
    /// Fails with [`ParcelTypesError::UnsupportedCrs`] if the unit of the CRS is unknown.
    pub fn area<G: Areal>(&self, geometry: &G, crs: &Crs) -> Result<f64, ParcelTypesError> {
        if crs.is_geographic() {
            let square_meters = geodesic_area(geometry, EARTH_RADIUS_M)?;
            Ok(self.area_unit.convert_from(square_meters, LengthUnit::Meter))
        } else {
            area(geometry, linear_unit(crs)?, self.area_unit)
        }
    }

    /// Length of the boundary of a geometry in the given CRS, including the boundaries of holes.
    pub fn perimeter<G: Areal>(&self, geometry: &G, crs: &Crs) -> Result<f64, ParcelTypesError> {
        if crs.is_geographic() {
            let radius = self.radius();
            for point in geometry.polygons().flat_map(|p| p.iter_rings()).flat_map(|r| r.points()) {
                if !point.is_valid_geo() {
                    return Err(ParcelTypesError::InvalidCoordinate {
                        x: point.x(),
                        y: point.y(),
                    });
                }
            }

            Ok(geometry.perimeter(|a, b| a.haversine_distance(b, radius)))
        } else {
            let scale = linear_unit(crs)?.meters() / self.distance_unit.meters();
            Ok(geometry.perimeter(|a, b| a.distance(b)) * scale)
        }
    }

    /// Areas of all features. Stops at the first feature that cannot be measured.
    pub fn areas<G: Areal>(&self, collection: &FeatureCollection<G>) -> Result<Vec<f64>, ParcelTypesError> {
        collection
            .geometries()
            .iter()
            .map(|geometry| self.area(geometry, collection.crs()))
            .collect()
    }

    /// Areas of all features, with a separate result for each feature.
    pub fn try_areas<G: Areal>(&self, collection: &FeatureCollection<G>) -> Vec<Result<f64, ParcelTypesError>> {
        collection
            .geometries()
            .iter()
            .map(|geometry| self.area(geometry, collection.crs()))
            .collect()
    }

    /// Returns a new collection with the areas of the features in the `field` column.
    pub fn with_area_column<G: Areal>(
        &self,
        collection: &FeatureCollection<G>,
        field: &str,
    ) -> Result<FeatureCollection<G>, ParcelTypesError> {
        let areas = self.areas(collection)?;
        collection.with_column(Field::number(field), areas.into_iter().map(Into::into))
    }

    /// Great-circle distances from `origin` (longitude/latitude) to every point of the collection. Points in projected
    /// CRSs are converted to longitude/latitude first. Stops at the first point that cannot be measured.
    pub fn distances_from(
        &self,
        collection: &FeatureCollection<Point2d>,
        origin: &impl GeoPoint<Num = f64>,
    ) -> Result<Vec<f64>, ParcelTypesError> {
        let to_geographic = geographic_transform(collection.crs())?;
        collection
            .geometries()
            .iter()
            .map(|point| self.distance(to_geographic.as_ref(), point, origin))
            .collect()
    }

    /// Great-circle distances from `origin` to every point of the collection, with a separate result for each point.
    ///
    /// Fails as a whole only if the CRS of the collection is not supported.
    pub fn try_distances_from(
        &self,
        collection: &FeatureCollection<Point2d>,
        origin: &impl GeoPoint<Num = f64>,
    ) -> Result<Vec<Result<f64, ParcelTypesError>>, ParcelTypesError> {
        let to_geographic = geographic_transform(collection.crs())?;
        Ok(collection
            .geometries()
            .iter()
            .map(|point| self.distance(to_geographic.as_ref(), point, origin))
            .collect())
    }

    /// Returns a new collection with the distances from `origin` in the `field` column.
    pub fn with_distance_column(
        &self,
        collection: &FeatureCollection<Point2d>,
        origin: &impl GeoPoint<Num = f64>,
        field: &str,
    ) -> Result<FeatureCollection<Point2d>, ParcelTypesError> {
        let distances = self.distances_from(collection, origin)?;
        collection.with_column(Field::number(field), distances.into_iter().map(Into::into))
    }

    fn distance(
        &self,
        to_geographic: Option<&CrsTransform>,
        point: &Point2d,
        origin: &impl GeoPoint<Num = f64>,
    ) -> Result<f64, ParcelTypesError> {
        let point = match to_geographic {
            Some(transform) => transform.project(point).ok_or(ParcelTypesError::Projection {
                x: point.x(),
                y: point.y(),
            })?,
            None => *point,
        };

        great_circle_distance(&point, origin, self.radius())
    }
}

fn linear_unit(crs: &Crs) -> Result<LengthUnit, ParcelTypesError> {
    crs.linear_unit()
        .ok_or_else(|| ParcelTypesError::UnsupportedCrs(crs.to_string()))
}

fn geographic_transform(crs: &Crs) -> Result<Option<CrsTransform>, ParcelTypesError> {
    if crs.is_geographic() {
        Ok(None)
    } else {
        CrsTransform::new(crs, &Crs::WGS84).map(Some)
    }
}
