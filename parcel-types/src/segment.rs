use crate::cartesian::{CartesianPoint2d, Orientation};
use num_traits::{One, Zero};

/// A strait line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a, Point>(pub &'a Point, pub &'a Point);

impl<'a, P: CartesianPoint2d> Segment<'a, P> {
    /// Shortest euclidian distance (squared) between a point and the segment:
    ///
    /// * if the normal from the point to the segment ends inside the segment, the returned value is the squared length
    ///   of the normal
    /// * if the normal from the point to the segment ends outside of the segment, the returned value is the smaller one
    ///   of the distances between the point and the segment's endpoints
    pub fn distance_to_point_sq<Point: CartesianPoint2d<Num = P::Num>>(
        &self,
        point: &Point,
    ) -> P::Num {
        if self.0.equal(self.1) {
            return self.0.distance_sq(point);
        }

        let ds = self.1.sub(self.0);
        let dp = point.sub(self.0);
        let ds_len = ds.x * ds.x + ds.y * ds.y;

        let r = (dp.x * ds.x + dp.y * ds.y) / ds_len;
        if r <= P::Num::zero() {
            self.0.distance_sq(point)
        } else if r >= P::Num::one() {
            self.1.distance_sq(point)
        } else {
            let s = (dp.y * ds.x - dp.x * ds.y) / ds_len;
            (s * s) * ds_len
        }
    }

    /// Returns true if the point lies exactly on the segment, endpoints included.
    ///
    /// The check is exact: the point must be collinear with the segment ends and lie within their bounding box.
    pub fn contains_point<Point: CartesianPoint2d<Num = P::Num>>(&self, point: &Point) -> bool {
        if Orientation::triplet(self.0, point, self.1) != Orientation::Collinear {
            return false;
        }

        let (x_min, x_max) = min_max(self.0.x(), self.1.x());
        let (y_min, y_max) = min_max(self.0.y(), self.1.y());

        point.x() >= x_min && point.x() <= x_max && point.y() >= y_min && point.y() <= y_max
    }
}

fn min_max<N: PartialOrd>(a: N, b: N) -> (N, N) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
