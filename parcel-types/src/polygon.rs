use crate::error::ParcelTypesError;
use crate::geo::Projection;
use crate::ring::{Location, Ring, Winding};
use crate::{BoundingRect, CartesianPoint2d, Point2d};
use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

/// Polygon geometry. Polygon consists of one outer ring, and zero or more inner rings (holes).
///
/// On construction rings are brought to a canonical orientation: the outer ring goes counter-clockwise and holes go
/// clockwise. Each hole must lie inside the outer ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonRings", into = "PolygonRings")]
pub struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
}

#[derive(Serialize, Deserialize)]
struct PolygonRings {
    outer: Ring,
    #[serde(default)]
    holes: Vec<Ring>,
}

impl Polygon {
    /// Creates a new polygon.
    pub fn new(outer: Ring, holes: Vec<Ring>) -> Result<Self, ParcelTypesError> {
        let outer = outer.with_winding(Winding::CounterClockwise)?;

        let holes = holes
            .into_iter()
            .enumerate()
            .map(|(index, hole)| {
                if hole
                    .iter_vertices()
                    .any(|p| outer.locate_point(p) == Location::Outside)
                {
                    return Err(ParcelTypesError::HoleOutsideShell(index));
                }

                hole.with_winding(Winding::Clockwise)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { outer, holes })
    }

    /// Outer ring of the polygon.
    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    /// Holes of the polygon.
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Iterates over all rings of the polygon starting with the outer one.
    pub fn iter_rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Bounding rectangle of the polygon, which is the bounding rectangle of its outer ring.
    pub fn bounding_rect(&self) -> BoundingRect {
        self.outer.bounding_rect()
    }

    /// Position of the point relative to the polygon.
    ///
    /// A point lying on the outer ring or on any of the holes' rings is on the polygon boundary.
    pub fn locate_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> Location {
        match self.outer.locate_point(point) {
            Location::Outside => return Location::Outside,
            Location::Boundary => return Location::Boundary,
            Location::Inside => {}
        }

        for hole in &self.holes {
            match hole.locate_point(point) {
                Location::Inside => return Location::Outside,
                Location::Boundary => return Location::Boundary,
                Location::Outside => {}
            }
        }

        Location::Inside
    }

    /// Returns true if the point is inside the polygon or on its boundary.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        self.locate_point(point) != Location::Outside
    }

    /// Area of the polygon: area of the outer ring minus areas of the holes, in the units of the coordinates.
    pub fn area(&self) -> Result<f64, ParcelTypesError> {
        let mut area = self.outer.area()?;
        for hole in &self.holes {
            area -= hole.area()?;
        }

        Ok(area.max(0.0))
    }

    /// Total length of all rings of the polygon, as measured by the `distance` function.
    pub fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64 {
        self.iter_rings().map(|ring| ring.perimeter(&distance)).sum()
    }

    /// Projects all the points of the polygon.
    pub fn project_points<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        let outer = self.outer.project_points(projection)?;
        let holes = self
            .holes
            .iter()
            .map(|hole| hole.project_points(projection))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(outer, holes)
    }
}

impl From<Polygon> for PolygonRings {
    fn from(polygon: Polygon) -> Self {
        Self {
            outer: polygon.outer,
            holes: polygon.holes,
        }
    }
}

impl TryFrom<PolygonRings> for Polygon {
    type Error = ParcelTypesError;

    fn try_from(rings: PolygonRings) -> Result<Self, Self::Error> {
        Self::new(rings.outer, rings.holes)
    }
}

impl AbsDiffEq for Polygon {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.outer.abs_diff_eq(&other.outer, epsilon)
            && self.holes.len() == other.holes.len()
            && self
                .holes
                .iter()
                .zip(&other.holes)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}
