use bytes::{Buf, BufMut, Bytes, BytesMut};
use parcel_types::{BoundingRect, CartesianPoint2dFloat, MultiPolygon, Point2d, Ring};

use crate::error::ParcelShpError;
use crate::header::{Header, ShapeType, HEADER_LENGTH};
use crate::reader::ShpReader;
use crate::rings::{assemble_polygons, file_rings};

const RECORD_HEADER_LENGTH: usize = 8;
const POINT_CONTENT_LENGTH: usize = 20;
const POLYGON_FIXED_LENGTH: usize = 44;

/// Geometry of a single shapefile record.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Point record.
    Point(Point2d),
    /// Polygon record. A record can contain several outer rings, so it is always a multipolygon.
    Polygon(MultiPolygon),
}

impl Shape {
    /// Type of the shape.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Point(_) => ShapeType::Point,
            Shape::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Bounding rectangle of the shape.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        match self {
            Shape::Point(point) => Some(BoundingRect::from_point(point)),
            Shape::Polygon(polygon) => polygon.bounding_rect(),
        }
    }

    /// Length of the record content in bytes.
    fn content_length(&self) -> usize {
        match self {
            Shape::Point(_) => POINT_CONTENT_LENGTH,
            Shape::Polygon(polygon) => {
                let (parts, points) = polygon
                    .parts()
                    .iter()
                    .flat_map(|part| part.iter_rings())
                    .fold((0, 0), |(parts, points), ring| (parts + 1, points + ring.len()));
                POLYGON_FIXED_LENGTH + 4 * parts + 16 * points
            }
        }
    }

    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_i32_le(self.shape_type().code());
        match self {
            Shape::Point(point) => {
                buf.put_f64_le(point.x());
                buf.put_f64_le(point.y());
            }
            Shape::Polygon(polygon) => {
                let rings: Vec<Ring> = file_rings(polygon).collect();
                let bbox = polygon
                    .bounding_rect()
                    .unwrap_or(BoundingRect::new(0.0, 0.0, 0.0, 0.0));

                buf.put_f64_le(bbox.x_min);
                buf.put_f64_le(bbox.y_min);
                buf.put_f64_le(bbox.x_max);
                buf.put_f64_le(bbox.y_max);

                let point_count: usize = rings.iter().map(Ring::len).sum();
                buf.put_i32_le(rings.len() as i32);
                buf.put_i32_le(point_count as i32);

                let mut start = 0;
                for ring in &rings {
                    buf.put_i32_le(start as i32);
                    start += ring.len();
                }

                for point in rings.iter().flat_map(|ring| ring.points()) {
                    buf.put_f64_le(point.x());
                    buf.put_f64_le(point.y());
                }
            }
        }
    }
}

/// Contents of a `.shp` file: the header and the shapes of all records in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShpFile {
    header: Header,
    shapes: Vec<Shape>,
}

impl ShpFile {
    /// Creates a new file. All shapes must be of the given type. The header is calculated from the shapes.
    pub fn new(shape_type: ShapeType, shapes: Vec<Shape>) -> Result<Self, ParcelShpError> {
        for (index, shape) in shapes.iter().enumerate() {
            if shape.shape_type() != shape_type {
                return Err(ParcelShpError::Unencodable(format!(
                    "shape {index} is {:?}, but the file contains {shape_type:?} shapes",
                    shape.shape_type()
                )));
            }

            if let Shape::Polygon(polygon) = shape {
                if polygon.is_empty() {
                    return Err(ParcelShpError::Unencodable(format!(
                        "polygon {index} has no parts"
                    )));
                }
            }
        }

        let file_length = shapes.iter().fold(HEADER_LENGTH, |acc, shape| {
            acc + RECORD_HEADER_LENGTH + shape.content_length()
        });
        if file_length / 2 > i32::MAX as usize {
            return Err(ParcelShpError::Unencodable(format!(
                "file length of {file_length} bytes exceeds the format limit"
            )));
        }

        let bbox = BoundingRect::merge_all(shapes.iter().filter_map(Shape::bounding_rect))
            .unwrap_or(BoundingRect::new(0.0, 0.0, 0.0, 0.0));

        Ok(Self {
            header: Header {
                shape_type,
                file_length,
                bbox,
            },
            shapes,
        })
    }

    /// File header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Shapes of the records.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Consumes the file, returning its shapes.
    pub fn into_shapes(self) -> Vec<Shape> {
        self.shapes
    }

    /// Decodes `.shp` data.
    ///
    /// Decoding stops at the first problem: there are no partial results. Bytes after the end of the file declared
    /// in the header are ignored.
    pub fn decode<B: Buf>(buffer: B) -> Result<Self, ParcelShpError> {
        let mut reader = ShpReader::new(buffer);
        let header = Header::decode(&mut reader)?;

        let mut shapes = vec![];
        while reader.offset() < header.file_length {
            reader.set_record(Some(shapes.len()));
            shapes.push(Self::decode_record(&mut reader, &header, shapes.len())?);
        }

        if reader.offset() > header.file_length {
            return Err(reader.malformed(format!(
                "last record ends after the end of file declared in the header ({} bytes)",
                header.file_length
            )));
        }

        if reader.remaining() > 0 {
            log::debug!(
                "Ignoring {} bytes after the end of the shapefile",
                reader.remaining()
            );
        }

        log::debug!(
            "Decoded shapefile with {} {:?} records",
            shapes.len(),
            header.shape_type
        );

        Ok(Self { header, shapes })
    }

    fn decode_record<B: Buf>(
        reader: &mut ShpReader<B>,
        header: &Header,
        index: usize,
    ) -> Result<Shape, ParcelShpError> {
        let number = reader.read_i32_be("record number")?;
        if usize::try_from(number) != Ok(index + 1) {
            log::debug!("Record {index} has number {number}");
        }

        let length_offset = reader.offset();
        let words = reader.read_i32_be("content length")?;
        let content_length = usize::try_from(words)
            .ok()
            .map(|words| words * 2)
            .filter(|&length| length >= 4)
            .ok_or_else(|| reader.malformed_at(length_offset, format!("invalid content length {words}")))?;
        reader.ensure(content_length, "record content")?;

        let content_offset = reader.offset();
        let code = reader.read_i32_le("shape type")?;
        if code != header.shape_type.code() {
            let reason = if code == 0 {
                "null shapes are not supported".to_string()
            } else {
                format!(
                    "record shape type {code} differs from the file shape type {}",
                    header.shape_type.code()
                )
            };
            return Err(reader.malformed_at(content_offset, reason));
        }

        match header.shape_type {
            ShapeType::Point => {
                if content_length != POINT_CONTENT_LENGTH {
                    return Err(reader.malformed_at(
                        length_offset,
                        format!("point record content length {content_length} is not {POINT_CONTENT_LENGTH}"),
                    ));
                }

                Ok(Shape::Point(Self::decode_point(reader)?))
            }
            ShapeType::Polygon => Ok(Shape::Polygon(Self::decode_polygon(
                reader,
                content_offset,
                content_length,
            )?)),
        }
    }

    fn decode_point<B: Buf>(reader: &mut ShpReader<B>) -> Result<Point2d, ParcelShpError> {
        let offset = reader.offset();
        let x = reader.read_f64_le("x coordinate")?;
        let y = reader.read_f64_le("y coordinate")?;
        let point = Point2d::new(x, y);
        if !point.is_finite() {
            return Err(reader.malformed_at(offset, format!("invalid coordinates ({x}, {y})")));
        }

        Ok(point)
    }

    fn decode_polygon<B: Buf>(
        reader: &mut ShpReader<B>,
        content_offset: usize,
        content_length: usize,
    ) -> Result<MultiPolygon, ParcelShpError> {
        // The record bounding box is calculated from the points.
        reader.skip(32, "record bounding box")?;

        let counts_offset = reader.offset();
        let part_count = reader.read_count("number of parts")?;
        let point_count = reader.read_count("number of points")?;
        if part_count == 0 {
            return Err(reader.malformed_at(counts_offset, "polygon has no parts"));
        }

        let expected_length = part_count
            .checked_mul(4)
            .zip(point_count.checked_mul(16))
            .and_then(|(parts, points)| parts.checked_add(points))
            .and_then(|len| len.checked_add(POLYGON_FIXED_LENGTH));
        if expected_length != Some(content_length) {
            return Err(reader.malformed_at(
                counts_offset,
                format!("{part_count} parts and {point_count} points do not match content length {content_length}"),
            ));
        }

        let mut starts = Vec::with_capacity(part_count + 1);
        for part in 0..part_count {
            let offset = reader.offset();
            let start = reader.read_count("part index")?;
            let is_valid = match starts.last() {
                None => start == 0,
                Some(&prev) => start > prev && start < point_count,
            };
            if !is_valid {
                return Err(reader.malformed_at(offset, format!("invalid start index {start} of part {part}")));
            }

            starts.push(start);
        }
        starts.push(point_count);

        let points_offset = reader.offset();
        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            points.push(Self::decode_point(reader)?);
        }

        let rings = starts
            .windows(2)
            .map(|w| {
                Ring::closing(points[w[0]..w[1]].to_vec()).map_err(|err| {
                    reader.malformed_at(points_offset + 16 * w[0], err.to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        assemble_polygons(rings).map_err(|err| reader.malformed_at(content_offset, err.to_string()))
    }

    /// Encodes the file into `.shp` data.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.header.file_length);
        self.header.encode(&mut buf);

        for (index, shape) in self.shapes.iter().enumerate() {
            buf.put_i32(index as i32 + 1);
            buf.put_i32((shape.content_length() / 2) as i32);
            shape.encode(&mut buf);
        }

        buf.freeze()
    }

    /// Encodes the `.shx` index of the file: the offset and the content length of every record.
    pub fn encode_index(&self) -> Bytes {
        let file_length = HEADER_LENGTH + RECORD_HEADER_LENGTH * self.shapes.len();
        let mut buf = BytesMut::with_capacity(file_length);

        Header {
            file_length,
            ..self.header
        }
        .encode(&mut buf);

        let mut offset = HEADER_LENGTH;
        for shape in &self.shapes {
            let content_length = shape.content_length();
            buf.put_i32((offset / 2) as i32);
            buf.put_i32((content_length / 2) as i32);
            offset += RECORD_HEADER_LENGTH + content_length;
        }

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use parcel_types::Polygon;

    fn rect(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Ring {
        Ring::closing(vec![
            Point2d::new(x_min, y_min),
            Point2d::new(x_max, y_min),
            Point2d::new(x_max, y_max),
            Point2d::new(x_min, y_max),
        ])
        .unwrap()
    }

    fn polygon_file() -> ShpFile {
        let with_hole = Polygon::new(
            rect(0.0, 0.0, 10.0, 10.0),
            vec![rect(2.0, 2.0, 4.0, 4.0), rect(6.0, 6.0, 8.0, 8.125)],
        )
        .unwrap();
        let islands = MultiPolygon::new(vec![
            Polygon::new(rect(20.0, 0.0, 21.0, 1.0), vec![]).unwrap(),
            Polygon::new(rect(30.5, -3.0, 31.0, 1.0), vec![]).unwrap(),
        ]);

        ShpFile::new(
            ShapeType::Polygon,
            vec![Shape::Polygon(with_hole.into()), Shape::Polygon(islands)],
        )
        .unwrap()
    }

    #[test]
    fn polygon_round_trip() {
        let file = polygon_file();
        let bytes = file.encode();
        assert_eq!(bytes.len(), file.header().file_length);

        let decoded = ShpFile::decode(bytes).unwrap();
        assert_eq!(decoded, file);
        assert_eq!(decoded.header().bbox, BoundingRect::new(0.0, -3.0, 31.0, 10.0));
    }

    #[test]
    fn point_round_trip() {
        let file = ShpFile::new(
            ShapeType::Point,
            vec![
                Shape::Point(Point2d::new(-122.4216, 37.7736)),
                Shape::Point(Point2d::new(1e-300, -0.0)),
            ],
        )
        .unwrap();

        let bytes = file.encode();
        assert_eq!(bytes.len(), HEADER_LENGTH + 2 * 28);

        let decoded = ShpFile::decode(bytes).unwrap();
        let Shape::Point(point) = decoded.shapes()[0] else {
            panic!("expected point");
        };
        assert_abs_diff_eq!(point, Point2d::new(-122.4216, 37.7736), epsilon = 1e-12);
        assert_eq!(decoded, file);
    }

    #[test]
    fn polygon_record_layout() {
        let file = ShpFile::new(
            ShapeType::Polygon,
            vec![Shape::Polygon(
                Polygon::new(rect(0.0, 0.0, 1.0, 1.0), vec![]).unwrap().into(),
            )],
        )
        .unwrap();
        let bytes = file.encode();

        // record number and content length in 16-bit words
        assert_eq!(bytes[100..104], 1i32.to_be_bytes());
        assert_eq!(bytes[104..108], ((44 + 4 + 5 * 16) / 2i32).to_be_bytes());
        // number of parts and points
        assert_eq!(bytes[144..148], 1i32.to_le_bytes());
        assert_eq!(bytes[148..152], 5i32.to_le_bytes());

        // outer rings are written clockwise
        let decoded_ring = Ring::closing(
            (0..5)
                .map(|i| {
                    let offset = 156 + i * 16;
                    let x = f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
                    let y = f64::from_le_bytes(bytes[offset + 8..offset + 16].try_into().unwrap());
                    Point2d::new(x, y)
                })
                .collect(),
        )
        .unwrap();
        assert_eq!(decoded_ring.winding(), Ok(parcel_types::Winding::Clockwise));
    }

    #[test]
    fn truncated_record() {
        let bytes = polygon_file().encode();

        for len in [120, 200, bytes.len() - 1] {
            assert_matches!(
                ShpFile::decode(&bytes[..len]),
                Err(ParcelShpError::Malformed {
                    record: Some(_),
                    ..
                })
            );
        }

        assert_matches!(
            ShpFile::decode(&bytes[..60]),
            Err(ParcelShpError::Malformed { record: None, .. })
        );
    }

    #[test]
    fn inconsistent_counts() {
        let mut bytes = polygon_file().encode().to_vec();
        // number of points of the first record
        let point_count = i32::from_le_bytes(bytes[148..152].try_into().unwrap());
        bytes[148..152].copy_from_slice(&(point_count + 1).to_le_bytes());

        assert_matches!(
            ShpFile::decode(&bytes[..]),
            Err(ParcelShpError::Malformed {
                offset: 144,
                record: Some(0),
                ..
            })
        );
    }

    #[test]
    fn invalid_part_index() {
        let mut bytes = polygon_file().encode().to_vec();
        // second part starts before the first one
        bytes[156..160].copy_from_slice(&0i32.to_le_bytes());

        assert_matches!(
            ShpFile::decode(&bytes[..]),
            Err(ParcelShpError::Malformed {
                offset: 156,
                record: Some(0),
                ..
            })
        );
    }

    #[test]
    fn null_and_mixed_records() {
        let mut bytes = polygon_file().encode().to_vec();
        bytes[108..112].copy_from_slice(&0i32.to_le_bytes());
        let Err(ParcelShpError::Malformed { offset, reason, .. }) = ShpFile::decode(&bytes[..])
        else {
            panic!("expected error");
        };
        assert_eq!(offset, 108);
        assert!(reason.contains("null"));

        bytes[108..112].copy_from_slice(&1i32.to_le_bytes());
        assert_matches!(
            ShpFile::decode(&bytes[..]),
            Err(ParcelShpError::Malformed { offset: 108, .. })
        );
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let file = polygon_file();
        let mut bytes = file.encode().to_vec();
        bytes.extend_from_slice(&[0; 7]);

        assert_eq!(ShpFile::decode(&bytes[..]), Ok(file));
    }

    #[test]
    fn mixed_shapes_cannot_be_encoded() {
        assert_matches!(
            ShpFile::new(
                ShapeType::Polygon,
                vec![Shape::Point(Point2d::new(0.0, 0.0))]
            ),
            Err(ParcelShpError::Unencodable(_))
        );
        assert_matches!(
            ShpFile::new(ShapeType::Polygon, vec![Shape::Polygon(MultiPolygon::default())]),
            Err(ParcelShpError::Unencodable(_))
        );
    }

    #[test]
    fn index_file() {
        let file = polygon_file();
        let shp = file.encode();
        let shx = file.encode_index();

        assert_eq!(shx.len(), 100 + 2 * 8);
        assert_eq!(shx[24..28], (58i32).to_be_bytes());

        let second_offset = i32::from_be_bytes(shx[108..112].try_into().unwrap()) as usize * 2;
        assert_eq!(shp[second_offset..second_offset + 4], 2i32.to_be_bytes());
    }
}
