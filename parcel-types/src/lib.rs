//! This crate contains the geometry kernel of the parcel toolkit: points, rings and polygons with the predicates and
//! measures defined on them, coordinate reference systems with projections between them, and feature collections
//! that pair geometries with typed attribute tables.
//!
//! Geometries are plain immutable values. Operations that change coordinates (e.g. reprojection) create new values.
//!
//! ```
//! use parcel_types::{Point2d, Polygon, Ring};
//!
//! let outer = Ring::closing(vec![
//!     Point2d::new(0.0, 0.0),
//!     Point2d::new(0.0, 2.0),
//!     Point2d::new(3.0, 2.0),
//!     Point2d::new(3.0, 0.0),
//! ])
//! .unwrap();
//! let polygon = Polygon::new(outer, vec![]).unwrap();
//!
//! assert_eq!(polygon.area(), Ok(6.0));
//! assert!(polygon.contains_point(&Point2d::new(1.0, 1.0)));
//! ```

pub mod cartesian;
pub mod error;
pub mod feature;
pub mod geo;
mod geometry;

#[cfg(feature = "geo-types")]
mod geo_types;

mod bounding_rect;
mod multi_polygon;
mod point;
mod polygon;
mod ring;
mod segment;

pub use bounding_rect::BoundingRect;
pub use cartesian::{CartesianPoint2d, CartesianPoint2dFloat, NewCartesianPoint2d};
pub use error::ParcelTypesError;
pub use geometry::{Areal, Geometry};
pub use multi_polygon::MultiPolygon;
pub use point::Point2d;
pub use polygon::Polygon;
pub use ring::{Location, Ring, Winding, MIN_RING_POINTS};
pub use segment::Segment;
