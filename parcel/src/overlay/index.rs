use parcel_types::{BoundingRect, Geometry, Point2d};

/// Index of the geometries of a collection by location, used to skip the full containment test for geometries that
/// cannot contain a point.
///
/// An index is a pre-filter: it may return geometries that do not contain the point, but it must never omit one that
/// does.
pub trait SpatialIndex: Send + Sync {
    /// Indices of the geometries that may contain the point, in ascending order.
    fn candidates(&self, point: Point2d) -> impl Iterator<Item = usize> + '_;
}

/// Index that checks the point against the bounding rectangle of every geometry.
///
/// Queries are linear in the number of geometries, but a rectangle check is much cheaper than a point-in-polygon
/// test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBoxIndex {
    rects: Vec<Option<BoundingRect>>,
}

impl BoundingBoxIndex {
    /// Creates an index of the geometries. Empty geometries never match.
    pub fn new<G: Geometry>(geometries: &[G]) -> Self {
        Self {
            rects: geometries.iter().map(Geometry::bounding_rect).collect(),
        }
    }

    /// Number of indexed geometries.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl SpatialIndex for BoundingBoxIndex {
    fn candidates(&self, point: Point2d) -> impl Iterator<Item = usize> + '_ {
        self.rects
            .iter()
            .enumerate()
            .filter_map(move |(index, rect)| match rect {
                Some(rect) if rect.contains(&point) => Some(index),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_types::{MultiPolygon, Polygon, Ring};

    fn square(x: f64, y: f64) -> Polygon {
        Polygon::new(
            Ring::closing(vec![
                Point2d::new(x, y),
                Point2d::new(x + 1.0, y),
                Point2d::new(x + 1.0, y + 1.0),
                Point2d::new(x, y + 1.0),
            ])
            .unwrap(),
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn candidates() {
        let index = BoundingBoxIndex::new(&[square(0.0, 0.0), square(0.5, 0.5), square(5.0, 5.0)]);
        assert_eq!(index.len(), 3);

        let found: Vec<_> = index.candidates(Point2d::new(0.75, 0.75)).collect();
        assert_eq!(found, vec![0, 1]);

        let on_edge: Vec<_> = index.candidates(Point2d::new(6.0, 5.5)).collect();
        assert_eq!(on_edge, vec![2]);

        assert_eq!(index.candidates(Point2d::new(3.0, 3.0)).count(), 0);
    }

    #[test]
    fn empty_geometries_never_match() {
        let index = BoundingBoxIndex::new(&[MultiPolygon::default()]);
        assert_eq!(index.candidates(Point2d::new(0.0, 0.0)).count(), 0);
    }
}
