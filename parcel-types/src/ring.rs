//! Ring is a closed sequence of points, describing a boundary of a polygon or a hole in it.
//!
//! Unlike contours of some other libraries, a [`Ring`] stores the closing point explicitly: the first and the last
//! points of a ring are always equal. This is the layout used by shapefiles and OGC simple features.

use crate::cartesian::{CartesianPoint2d, CartesianPoint2dFloat};
use crate::error::ParcelTypesError;
use crate::geo::Projection;
use crate::segment::Segment;
use crate::{BoundingRect, Point2d};
use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

/// Minimum number of points in a ring, including the closing one.
pub const MIN_RING_POINTS: usize = 4;

/// Direction in which the points of a ring go around its interior.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Winding {
    /// Clockwise.
    Clockwise,
    /// Counter-clockwise.
    CounterClockwise,
}

/// Position of a point relative to a ring or a polygon.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Location {
    /// Strictly inside.
    Inside,
    /// Exactly on one of the segments.
    Boundary,
    /// Strictly outside.
    Outside,
}

/// Closed sequence of points. See module level documentation for details.
///
/// Invariants, checked on construction:
/// * at least 4 points
/// * all coordinates are finite
/// * the first point equals the last one
/// * no two consecutive points are equal (no zero-length segments)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point2d>", into = "Vec<Point2d>")]
pub struct Ring {
    points: Vec<Point2d>,
}

impl Ring {
    /// Creates a new ring from a closed sequence of points.
    pub fn new(points: Vec<Point2d>) -> Result<Self, ParcelTypesError> {
        if points.len() < MIN_RING_POINTS {
            return Err(ParcelTypesError::DegenerateGeometry(format!(
                "ring must have at least {MIN_RING_POINTS} points, got {}",
                points.len()
            )));
        }

        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(ParcelTypesError::InvalidCoordinate { x: p.x(), y: p.y() });
        }

        if points.first() != points.last() {
            return Err(ParcelTypesError::DegenerateGeometry(
                "ring is not closed".into(),
            ));
        }

        if let Some(index) = points.windows(2).position(|w| w[0] == w[1]) {
            return Err(ParcelTypesError::DegenerateGeometry(format!(
                "zero-length segment at point {index}"
            )));
        }

        Ok(Self { points })
    }

    /// Creates a new ring, appending the first point to the end of the sequence if the sequence is not closed yet.
    pub fn closing(mut points: Vec<Point2d>) -> Result<Self, ParcelTypesError> {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            if first != last {
                points.push(*first);
            }
        }

        Self::new(points)
    }

    /// All points of the ring, including the closing one.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// Number of points in the ring, including the closing one.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false, rings cannot be empty. Present for consistency with [`Ring::len`].
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over distinct vertices of the ring, i.e. without the closing point.
    pub fn iter_vertices(&self) -> impl Iterator<Item = &Point2d> {
        self.points[..self.points.len() - 1].iter()
    }

    /// Iterates over segments of the ring, including the one ending at the closing point.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, Point2d>> {
        self.points.windows(2).map(|w| Segment(&w[0], &w[1]))
    }

    /// Bounding rectangle of the ring.
    pub fn bounding_rect(&self) -> BoundingRect {
        // The ring is never empty, so `from_points` always returns a value.
        BoundingRect::from_points(self.points.iter()).unwrap_or(BoundingRect::new(
            f64::NAN,
            f64::NAN,
            f64::NAN,
            f64::NAN,
        ))
    }

    /// Signed area enclosed by the ring in the units of its coordinates, calculated with the shoelace formula.
    ///
    /// Area is positive for counter-clockwise rings and negative for clockwise ones. Returns an error if the ring
    /// encloses zero area (all points are collinear).
    pub fn area_signed(&self) -> Result<f64, ParcelTypesError> {
        let area = self.shoelace();
        if area == 0.0 {
            return Err(ParcelTypesError::DegenerateGeometry(
                "ring encloses zero area".into(),
            ));
        }

        Ok(area)
    }

    /// Absolute value of the area enclosed by the ring. See [`Ring::area_signed`].
    pub fn area(&self) -> Result<f64, ParcelTypesError> {
        Ok(self.area_signed()?.abs())
    }

    /// Winding of the ring. Returns an error if the ring encloses zero area.
    pub fn winding(&self) -> Result<Winding, ParcelTypesError> {
        if self.area_signed()? > 0.0 {
            Ok(Winding::CounterClockwise)
        } else {
            Ok(Winding::Clockwise)
        }
    }

    /// Returns the same ring with the opposite winding. The starting point stays the same.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Returns the ring with the given winding, reversing it if necessary.
    pub fn with_winding(self, winding: Winding) -> Result<Self, ParcelTypesError> {
        if self.winding()? == winding {
            Ok(self)
        } else {
            Ok(self.reversed())
        }
    }

    /// Sum of the distances between consecutive points of the ring, as measured by the `distance` function.
    ///
    /// Pass euclidean distance for projected coordinates, or a great-circle distance for geographic ones.
    pub fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64 {
        self.iter_segments()
            .map(|segment| distance(segment.0, segment.1))
            .sum()
    }

    /// Position of the point relative to the ring, determined with the even-odd rule.
    pub fn locate_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> Location {
        let x = point.x();
        let y = point.y();
        let mut is_inside = false;

        for segment in self.iter_segments() {
            if segment.contains_point(point) {
                return Location::Boundary;
            }

            let (a, b) = (segment.0, segment.1);
            if (a.y() > y) != (b.y() > y) {
                let x_cross = a.x() + (y - a.y()) * (b.x() - a.x()) / (b.y() - a.y());
                if x < x_cross {
                    is_inside = !is_inside;
                }
            }
        }

        if is_inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }

    /// Returns true if the point is inside the ring or on its boundary.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        self.locate_point(point) != Location::Outside
    }

    /// Projects all the points of the ring. The result is validated again, since projection can collapse points.
    pub fn project_points<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        let points = self
            .points
            .iter()
            .map(|p| {
                projection
                    .project(p)
                    .ok_or(ParcelTypesError::Projection { x: p.x(), y: p.y() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(points)
    }

    fn shoelace(&self) -> f64 {
        let origin = self.points[0];
        let doubled: f64 = self
            .points
            .windows(2)
            .map(|w| {
                let (x0, y0) = (w[0].x() - origin.x(), w[0].y() - origin.y());
                let (x1, y1) = (w[1].x() - origin.x(), w[1].y() - origin.y());
                x0 * y1 - x1 * y0
            })
            .sum();
        doubled / 2.0
    }
}

impl TryFrom<Vec<Point2d>> for Ring {
    type Error = ParcelTypesError;

    fn try_from(points: Vec<Point2d>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Ring> for Vec<Point2d> {
    fn from(ring: Ring) -> Self {
        ring.points
    }
}

impl AbsDiffEq for Ring {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ring(coords: &[(f64, f64)]) -> Ring {
        Ring::closing(coords.iter().map(|&(x, y)| Point2d::new(x, y)).collect())
            .expect("valid ring")
    }

    fn rotate(coords: &[(f64, f64)], by: usize) -> Ring {
        let mut rotated = coords.to_vec();
        rotated.rotate_left(by);
        ring(&rotated)
    }

    #[test]
    fn validation() {
        assert_matches!(
            Ring::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0), Point2d::new(0.0, 0.0)]),
            Err(ParcelTypesError::DegenerateGeometry(_))
        );
        assert_matches!(
            Ring::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
                Point2d::new(0.0, 1.0),
            ]),
            Err(ParcelTypesError::DegenerateGeometry(_))
        );
        assert_matches!(
            Ring::closing(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(0.0, 1.0),
            ]),
            Err(ParcelTypesError::DegenerateGeometry(_))
        );
        assert_matches!(
            Ring::closing(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(f64::NAN, 0.0),
                Point2d::new(0.0, 1.0),
            ]),
            Err(ParcelTypesError::InvalidCoordinate { .. })
        );
    }

    #[test]
    fn closing_appends_first_point() {
        let ring = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.points()[3], Point2d::new(0.0, 0.0));
        assert_eq!(ring.iter_vertices().count(), 3);
        assert_eq!(ring.iter_segments().count(), 3);
    }

    #[test]
    fn area() {
        let ccw = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        assert_eq!(ccw.area_signed(), Ok(0.5));
        assert_eq!(ccw.winding(), Ok(Winding::CounterClockwise));

        let cw = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)]);
        assert_eq!(cw.area_signed(), Ok(-0.5));
        assert_eq!(cw.winding(), Ok(Winding::Clockwise));
        assert_eq!(cw.area(), Ok(0.5));

        let rect = ring(&[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)]);
        assert_eq!(rect.area(), Ok(6.0));
    }

    #[test]
    fn zero_area() {
        let flat = ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_matches!(
            flat.area_signed(),
            Err(ParcelTypesError::DegenerateGeometry(_))
        );
    }

    #[test]
    fn reversed_keeps_start() {
        let ccw = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let cw = ccw.reversed();

        assert_eq!(cw.points()[0], Point2d::new(0.0, 0.0));
        assert_eq!(cw.points()[1], Point2d::new(0.0, 1.0));
        assert_eq!(cw.winding(), Ok(Winding::Clockwise));
        assert_eq!(cw.reversed(), ccw);
    }

    #[test]
    fn locate_point() {
        let square = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);

        assert_eq!(square.locate_point(&Point2d::new(1.0, 1.0)), Location::Inside);
        assert_eq!(square.locate_point(&Point2d::new(3.0, 1.0)), Location::Outside);
        assert_eq!(square.locate_point(&Point2d::new(-1.0, 1.0)), Location::Outside);
        assert_eq!(square.locate_point(&Point2d::new(1.0, 0.0)), Location::Boundary);
        assert_eq!(square.locate_point(&Point2d::new(2.0, 2.0)), Location::Boundary);
        assert_eq!(square.locate_point(&Point2d::new(0.0, 1.5)), Location::Boundary);

        assert!(square.contains_point(&Point2d::new(1.0, 1.0)));
        assert!(square.contains_point(&Point2d::new(2.0, 1.0)));
        assert!(!square.contains_point(&Point2d::new(2.5, 1.0)));
    }

    #[test]
    fn locate_point_in_concave_ring() {
        let u_shape = [
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ];
        let ring = ring(&u_shape);

        assert_eq!(ring.locate_point(&Point2d::new(1.5, 2.0)), Location::Outside);
        assert_eq!(ring.locate_point(&Point2d::new(0.5, 2.0)), Location::Inside);
        assert_eq!(ring.locate_point(&Point2d::new(2.5, 1.0)), Location::Inside);
        assert_eq!(ring.locate_point(&Point2d::new(1.5, 1.0)), Location::Boundary);
    }

    #[test]
    fn locate_point_is_invariant_under_rotation() {
        let coords = [
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 3.0),
            (2.0, 1.0),
            (0.0, 3.0),
        ];
        let probes = [
            Point2d::new(1.0, 1.0),
            Point2d::new(2.0, 2.0),
            Point2d::new(2.0, 0.5),
            Point2d::new(4.0, 1.0),
            Point2d::new(3.0, 2.0),
            Point2d::new(5.0, 1.0),
            Point2d::new(2.0, 1.0),
        ];

        let base = ring(&coords);
        for shift in 1..coords.len() {
            let rotated = rotate(&coords, shift);
            for probe in &probes {
                assert_eq!(
                    rotated.locate_point(probe),
                    base.locate_point(probe),
                    "shift {shift}, probe {probe:?}"
                );
            }
        }
    }

    #[test]
    fn perimeter() {
        let rect = ring(&[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)]);
        assert_eq!(rect.perimeter(|a, b| a.distance(b)), 10.0);
        assert_eq!(rect.perimeter(|_, _| 1.0), 4.0);
    }

    #[test]
    fn serde_validates() {
        let rect = ring(&[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)]);
        let json = serde_json::to_string(&rect).unwrap();
        let restored: Ring = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, rect);

        let invalid = r#"[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0},{"x":0.0,"y":0.0}]"#;
        assert!(serde_json::from_str::<Ring>(invalid).is_err());
    }
}
