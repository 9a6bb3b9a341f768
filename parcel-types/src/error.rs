//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParcelTypesError {
    /// Geometry does not satisfy the invariants of its type, e.g. a ring with less than 4 points, a zero length
    /// segment or zero enclosed area where area is requested.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Coordinates are not finite, or latitude/longitude are out of their valid range.
    #[error("invalid coordinate ({x}, {y})")]
    InvalidCoordinate {
        /// X coordinate (longitude for geographic points).
        x: f64,
        /// Y coordinate (latitude for geographic points).
        y: f64,
    },

    /// CRS descriptor is not recognized.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// A point could not be transformed by a projection.
    #[error("failed to project point ({x}, {y})")]
    Projection {
        /// X coordinate of the source point.
        x: f64,
        /// Y coordinate of the source point.
        y: f64,
    },

    /// A hole of a polygon is not inside its outer ring.
    #[error("hole {0} is not inside the outer ring of the polygon")]
    HoleOutsideShell(usize),

    /// Attribute table is inconsistent with its schema or with the geometries it describes.
    #[error("invalid attributes: {0}")]
    Attribute(String),
}
