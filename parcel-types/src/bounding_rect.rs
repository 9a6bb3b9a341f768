//! Axis-aligned bounding rectangle of a geometry or a collection of geometries.

use crate::cartesian::CartesianPoint2d;
use num_traits::Num;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its min and max coordinates.
///
/// Bounding rects are always computed from the geometry on request and never stored alongside it, so they cannot go
/// stale.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect<N: Num + Copy + PartialOrd = f64> {
    /// Minimum x.
    pub x_min: N,
    /// Minimum y.
    pub y_min: N,
    /// Maximum x.
    pub x_max: N,
    /// Maximum y.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd> BoundingRect<N> {
    /// Creates a new rect.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Width of the rect.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rect.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Smallest rect containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: if self.x_min < other.x_min {
                self.x_min
            } else {
                other.x_min
            },
            y_min: if self.y_min < other.y_min {
                self.y_min
            } else {
                other.y_min
            },
            x_max: if self.x_max > other.x_max {
                self.x_max
            } else {
                other.x_max
            },
            y_max: if self.y_max > other.y_max {
                self.y_max
            } else {
                other.y_max
            },
        }
    }

    /// Merges all the rects of the iterator. Returns `None` if the iterator is empty.
    pub fn merge_all(iter: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut iter = iter.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, rect| acc.merge(rect)))
    }

    /// Zero-sized rect at the point.
    pub fn from_point(p: &impl CartesianPoint2d<Num = N>) -> Self {
        Self {
            x_min: p.x(),
            x_max: p.x(),
            y_min: p.y(),
            y_max: p.y(),
        }
    }

    /// Bounding rect of the given points. Returns `None` if the iterator is empty.
    pub fn from_points<'a, P: CartesianPoint2d<Num = N> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut x_min = first.x();
        let mut y_min = first.y();
        let mut x_max = first.x();
        let mut y_max = first.y();

        for p in points {
            if x_min > p.x() {
                x_min = p.x();
            }
            if y_min > p.y() {
                y_min = p.y();
            }
            if x_max < p.x() {
                x_max = p.x();
            }
            if y_max < p.y() {
                y_max = p.y();
            }
        }

        Some(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Returns true if the point is inside the rect or on its border.
    pub fn contains(&self, point: &impl CartesianPoint2d<Num = N>) -> bool {
        self.x_min <= point.x()
            && self.x_max >= point.x()
            && self.y_min <= point.y()
            && self.y_max >= point.y()
    }

    /// Returns true if the rects have at least one common point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2d;

    #[test]
    fn from_points() {
        let points = [
            Point2d::new(1.0, 5.0),
            Point2d::new(-2.0, 3.0),
            Point2d::new(4.0, -1.0),
        ];
        let rect = BoundingRect::from_points(points.iter()).unwrap();

        assert_eq!(rect, BoundingRect::new(-2.0, -1.0, 4.0, 5.0));
        assert_eq!(rect.width(), 6.0);
        assert_eq!(rect.height(), 6.0);
        assert!(BoundingRect::<f64>::from_points(std::iter::empty::<&Point2d>()).is_none());
    }

    #[test]
    fn contains() {
        let rect = BoundingRect::new(0.0, 0.0, 2.0, 1.0);

        assert!(rect.contains(&Point2d::new(1.0, 0.5)));
        assert!(rect.contains(&Point2d::new(2.0, 1.0)));
        assert!(!rect.contains(&Point2d::new(2.1, 0.5)));
        assert!(!rect.contains(&Point2d::new(1.0, -0.1)));
    }

    #[test]
    fn merge_all() {
        let rects = [
            BoundingRect::new(0.0, 0.0, 1.0, 1.0),
            BoundingRect::new(-1.0, 0.5, 0.5, 3.0),
        ];

        assert_eq!(
            BoundingRect::merge_all(rects),
            Some(BoundingRect::new(-1.0, 0.0, 1.0, 3.0))
        );
        assert_eq!(BoundingRect::<f64>::merge_all([]), None);
    }

    #[test]
    fn intersects() {
        let rect = BoundingRect::new(0.0, 0.0, 2.0, 2.0);

        assert!(rect.intersects(&BoundingRect::new(1.0, 1.0, 3.0, 3.0)));
        assert!(rect.intersects(&BoundingRect::new(2.0, 2.0, 3.0, 3.0)));
        assert!(!rect.intersects(&BoundingRect::new(2.5, 0.0, 3.0, 1.0)));
    }
}
