//! Traits shared by all geometries that can be stored in a [`FeatureCollection`](crate::feature::FeatureCollection).

use crate::cartesian::CartesianPoint2dFloat;
use crate::error::ParcelTypesError;
use crate::geo::Projection;
use crate::{BoundingRect, MultiPolygon, Point2d, Polygon};

/// Geometry of a feature.
pub trait Geometry: Sized {
    /// Bounding rectangle of the geometry, or `None` if the geometry is empty.
    fn bounding_rect(&self) -> Option<BoundingRect>;

    /// Checks the invariants that cannot be enforced by the constructor of the type.
    fn validate(&self) -> Result<(), ParcelTypesError> {
        Ok(())
    }

    /// Projects all the points of the geometry, returning a new geometry.
    fn project<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized;
}

/// Geometry that encloses an area: polygons and multipolygons.
pub trait Areal: Geometry {
    /// Returns true if the point is inside the geometry or on its boundary.
    fn contains_point(&self, point: &Point2d) -> bool;

    /// Planar area of the geometry in the units of its coordinates.
    fn area(&self) -> Result<f64, ParcelTypesError>;

    /// Total length of the boundary as measured by the `distance` function.
    fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64;

    /// Iterates over polygons the geometry consists of.
    fn polygons(&self) -> impl Iterator<Item = &Polygon>;
}

impl Geometry for Point2d {
    fn bounding_rect(&self) -> Option<BoundingRect> {
        Some(BoundingRect::from_point(self))
    }

    fn validate(&self) -> Result<(), ParcelTypesError> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(ParcelTypesError::InvalidCoordinate {
                x: self.x(),
                y: self.y(),
            })
        }
    }

    fn project<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        projection
            .project(self)
            .ok_or(ParcelTypesError::Projection {
                x: self.x(),
                y: self.y(),
            })
    }
}

impl Geometry for Polygon {
    fn bounding_rect(&self) -> Option<BoundingRect> {
        Some(Polygon::bounding_rect(self))
    }

    fn project<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        self.project_points(projection)
    }
}

impl Areal for Polygon {
    fn contains_point(&self, point: &Point2d) -> bool {
        Polygon::contains_point(self, point)
    }

    fn area(&self) -> Result<f64, ParcelTypesError> {
        Polygon::area(self)
    }

    fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64 {
        Polygon::perimeter(self, distance)
    }

    fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        std::iter::once(self)
    }
}

impl Geometry for MultiPolygon {
    fn bounding_rect(&self) -> Option<BoundingRect> {
        MultiPolygon::bounding_rect(self)
    }

    fn validate(&self) -> Result<(), ParcelTypesError> {
        if self.is_empty() {
            Err(ParcelTypesError::DegenerateGeometry(
                "multipolygon has no parts".into(),
            ))
        } else {
            Ok(())
        }
    }

    fn project<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        self.project_points(projection)
    }
}

impl Areal for MultiPolygon {
    fn contains_point(&self, point: &Point2d) -> bool {
        MultiPolygon::contains_point(self, point)
    }

    fn area(&self) -> Result<f64, ParcelTypesError> {
        MultiPolygon::area(self)
    }

    fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64 {
        MultiPolygon::perimeter(self, distance)
    }

    fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.parts().iter()
    }
}
