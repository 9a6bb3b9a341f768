use crate::error::ParcelTypesError;
use crate::geo::Projection;
use crate::polygon::Polygon;
use crate::ring::Location;
use crate::{BoundingRect, CartesianPoint2d, Point2d};
use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

/// A set of polygons, e.g. a district together with its islands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    parts: Vec<Polygon>,
}

impl MultiPolygon {
    /// Creates a new multipolygon.
    pub fn new(parts: Vec<Polygon>) -> Self {
        Self { parts }
    }

    /// Returns reference to the inner polygons.
    pub fn parts(&self) -> &[Polygon] {
        &self.parts
    }

    /// Returns true if there are no polygons in the multipolygon.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Bounding rectangle of all the parts. Returns `None` for an empty multipolygon.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        BoundingRect::merge_all(self.parts.iter().map(Polygon::bounding_rect))
    }

    /// Position of the point relative to the multipolygon. The first part that does not have the point outside
    /// decides the result.
    pub fn locate_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> Location {
        self.parts
            .iter()
            .map(|part| part.locate_point(point))
            .find(|location| *location != Location::Outside)
            .unwrap_or(Location::Outside)
    }

    /// Returns true if the point is inside one of the parts or on its boundary.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        self.parts.iter().any(|part| part.contains_point(point))
    }

    /// Sum of the areas of all parts.
    pub fn area(&self) -> Result<f64, ParcelTypesError> {
        if self.parts.is_empty() {
            return Err(ParcelTypesError::DegenerateGeometry(
                "multipolygon has no parts".into(),
            ));
        }

        self.parts.iter().map(Polygon::area).sum()
    }

    /// Sum of the perimeters of all parts.
    pub fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64 {
        self.parts
            .iter()
            .map(|part| part.perimeter(&distance))
            .sum()
    }

    /// Projects all the points of the multipolygon.
    pub fn project_points<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        let parts = self
            .parts
            .iter()
            .map(|part| part.project_points(projection))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { parts })
    }
}

impl From<Vec<Polygon>> for MultiPolygon {
    fn from(parts: Vec<Polygon>) -> Self {
        Self { parts }
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        Self {
            parts: vec![polygon],
        }
    }
}

impl AbsDiffEq for MultiPolygon {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}
