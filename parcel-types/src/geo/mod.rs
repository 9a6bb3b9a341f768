//! Geographic coordinates (latitude and longitude, see [`GeoPoint`]), coordinate reference systems (see [`Crs`]) and
//! conversion between them (see [`Projection`] and [`CrsTransform`]).

mod crs;
mod datum;
pub mod impls;
pub mod sphere;
mod traits;
mod transform;
pub mod units;

pub use crs::{Crs, ProjectionType};
pub use datum::Datum;
pub use traits::point::{GeoPoint, NewGeoPoint};
pub use traits::projection::{ChainProjection, InvertedProjection, Projection};
pub use transform::{transform, CrsTransform};
