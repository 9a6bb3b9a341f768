//! Error types used by the crate.

use parcel_shp::error::ParcelShpError;
use parcel_types::geo::Crs;
use parcel_types::ParcelTypesError;
use thiserror::Error;

/// Parcel error type.
#[derive(Debug, Error)]
pub enum ParcelError {
    /// Invalid geometry, CRS or attributes.
    #[error(transparent)]
    Types(#[from] ParcelTypesError),
    /// Error reading or writing shapefile data.
    #[error(transparent)]
    Shp(#[from] ParcelShpError),
    /// Two collections that are used together have different CRSs. One of them must be reprojected first.
    #[error("CRS mismatch: {left} and {right}")]
    CrsMismatch {
        /// CRS of the first collection.
        left: Crs,
        /// CRS of the second collection.
        right: Crs,
    },
    /// A field that the operation needs is not in the attribute table.
    #[error("field '{0}' not found")]
    MissingField(String),
    /// Error reading a CSV table.
    #[error("failed to read table: {0}")]
    Csv(#[from] csv::Error),
    /// Error reading data from the FS.
    #[error("failed to read file")]
    Io(#[from] std::io::Error),
}
