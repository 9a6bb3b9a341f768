//! Error type of the crate.

use parcel_types::ParcelTypesError;
use thiserror::Error;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParcelShpError {
    /// The `.shp` data cannot be decoded. Nothing is returned from the failed call.
    #[error("malformed shapefile at byte {offset} (record {record:?}): {reason}")]
    Malformed {
        /// Byte offset in the input buffer where the problem was found.
        offset: usize,
        /// Zero-based index of the record being decoded, if the problem is inside a record.
        record: Option<usize>,
        /// Description of the problem.
        reason: String,
    },

    /// The file contains no features.
    #[error("shapefile contains no features")]
    EmptyInput,

    /// Number of attribute rows does not match the number of features.
    #[error("attribute table has {rows} rows, but there are {features} features")]
    AttributeMismatch {
        /// Rows in the attribute table.
        rows: usize,
        /// Features in the shapefile.
        features: usize,
    },

    /// The `.dbf` data cannot be decoded.
    #[error("malformed dbf file at byte {offset}: {reason}")]
    Dbf {
        /// Byte offset in the input buffer where the problem was found.
        offset: usize,
        /// Description of the problem.
        reason: String,
    },

    /// The collection cannot be represented in the file format, e.g. a field name is too long.
    #[error("cannot encode: {0}")]
    Unencodable(String),

    /// Invalid geometry or attributes.
    #[error(transparent)]
    Geometry(#[from] ParcelTypesError),
}
