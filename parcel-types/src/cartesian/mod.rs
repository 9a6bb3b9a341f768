//! Types and functions on geometries in cartesian coordinates.

mod orient;
mod traits;

pub use nalgebra::{Point2, Vector2};
pub use orient::Orientation;
pub use traits::*;
