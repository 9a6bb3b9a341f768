use bytes::{Buf, BufMut};
use parcel_types::BoundingRect;
use serde::{Deserialize, Serialize};

use crate::error::ParcelShpError;
use crate::reader::ShpReader;

/// Length of the main file header in bytes.
pub const HEADER_LENGTH: usize = 100;

const FILE_CODE: i32 = 9994;
const VERSION: i32 = 1000;

/// Type of shapes stored in a shapefile. A file only contains shapes of one type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    /// A single point per record.
    Point,
    /// One or more rings per record.
    Polygon,
}

impl ShapeType {
    /// Numeric code of the shape type in the file.
    pub const fn code(self) -> i32 {
        match self {
            ShapeType::Point => 1,
            ShapeType::Polygon => 5,
        }
    }

    /// Shape type with the given code. `None` for codes of shape types that are not supported.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ShapeType::Point),
            5 => Some(ShapeType::Polygon),
            _ => None,
        }
    }

    pub(crate) fn decode<B: Buf>(reader: &mut ShpReader<B>) -> Result<Self, ParcelShpError> {
        let offset = reader.offset();
        let code = reader.read_i32_le("shape type")?;
        Self::from_code(code).ok_or_else(|| reader.malformed_at(offset, unsupported_reason(code)))
    }
}

fn unsupported_reason(code: i32) -> String {
    let name = match code {
        0 => "null shape",
        3 => "PolyLine",
        8 => "MultiPoint",
        11 => "PointZ",
        13 => "PolyLineZ",
        15 => "PolygonZ",
        18 => "MultiPointZ",
        21 => "PointM",
        23 => "PolyLineM",
        25 => "PolygonM",
        28 => "MultiPointM",
        31 => "MultiPatch",
        _ => return format!("unknown shape type code {code}"),
    };

    format!("unsupported shape type {name} ({code})")
}

/// Main file header of a `.shp` (and `.shx`) file.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Header {
    /// Type of all shapes in the file.
    pub shape_type: ShapeType,
    /// Total length of the file in bytes, as declared by the header.
    pub file_length: usize,
    /// Bounding box of all shapes in the file.
    pub bbox: BoundingRect,
}

impl Header {
    pub(crate) fn decode<B: Buf>(reader: &mut ShpReader<B>) -> Result<Self, ParcelShpError> {
        reader.ensure(HEADER_LENGTH, "file header")?;

        let file_code = reader.read_i32_be("file code")?;
        if file_code != FILE_CODE {
            return Err(reader.malformed_at(0, format!("invalid file code {file_code}")));
        }

        reader.skip(20, "file header")?;

        let length_offset = reader.offset();
        let words = reader.read_i32_be("file length")?;
        let file_length = usize::try_from(words)
            .ok()
            .and_then(|words| words.checked_mul(2))
            .filter(|&length| length >= HEADER_LENGTH)
            .ok_or_else(|| reader.malformed_at(length_offset, format!("invalid file length {words}")))?;

        let version_offset = reader.offset();
        let version = reader.read_i32_le("version")?;
        if version != VERSION {
            return Err(reader.malformed_at(version_offset, format!("unsupported version {version}")));
        }

        let shape_type = ShapeType::decode(reader)?;

        let x_min = reader.read_f64_le("bounding box")?;
        let y_min = reader.read_f64_le("bounding box")?;
        let x_max = reader.read_f64_le("bounding box")?;
        let y_max = reader.read_f64_le("bounding box")?;

        // Z and M ranges are not used by 2d shape types.
        reader.skip(32, "file header")?;

        Ok(Self {
            shape_type,
            file_length,
            bbox: BoundingRect::new(x_min, y_min, x_max, y_max),
        })
    }

    pub(crate) fn encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(FILE_CODE);
        buf.put_bytes(0, 20);
        buf.put_i32((self.file_length / 2) as i32);
        buf.put_i32_le(VERSION);
        buf.put_i32_le(self.shape_type.code());
        buf.put_f64_le(self.bbox.x_min);
        buf.put_f64_le(self.bbox.y_min);
        buf.put_f64_le(self.bbox.x_max);
        buf.put_f64_le(self.bbox.y_max);
        buf.put_bytes(0, 32);
    }
}
