//! Reader and writer of ESRI shapefiles for [`parcel_types`] feature collections.
//!
//! Only `Point` and `Polygon` shape types are supported. A shapefile dataset consists of several files: geometries are
//! stored in `.shp`, the record index in `.shx` and attributes in the `.dbf` table. This crate works with in-memory
//! buffers of those files, reading from and writing to the file system is left to the caller.
//!
//! The CRS of the data is never guessed: it must be given explicitly when decoding.
//!
//! Writing a collection and reading it back gives the same geometries, in the same order and with the same hole
//! structure, and the same attribute values with two exceptions caused by the `.dbf` format: trailing spaces of text
//! values are lost, and empty text is read back as [`Value::Null`](parcel_types::feature::Value::Null).
//!
//! ```
//! use parcel_shp::{decode, encode, ShapeCollection};
//! use parcel_types::feature::FeatureCollection;
//! use parcel_types::geo::Crs;
//! use parcel_types::Point2d;
//!
//! let stations = FeatureCollection::without_attributes(
//!     Crs::WGS84,
//!     vec![Point2d::new(-122.4194, 37.7749), Point2d::new(-122.2711, 37.8044)],
//! )
//! .unwrap();
//!
//! let bytes = encode(&stations.clone().into()).unwrap();
//! let decoded = decode(bytes, None, Crs::WGS84).unwrap();
//!
//! assert_eq!(decoded, ShapeCollection::Points(stations));
//! ```

use bytes::{Buf, Bytes};
use parcel_types::feature::{AttributeTable, FeatureCollection};
use parcel_types::geo::Crs;
use parcel_types::{BoundingRect, MultiPolygon, Point2d};

use crate::error::ParcelShpError;

pub mod dbf;
pub mod error;
mod header;
mod reader;
mod rings;
mod shp;

pub use header::{Header, ShapeType, HEADER_LENGTH};
pub use shp::{Shape, ShpFile};

/// Features read from or written to a shapefile. All features of a file have the same geometry type.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeCollection {
    /// Point features.
    Points(FeatureCollection<Point2d>),
    /// Polygon features.
    Polygons(FeatureCollection<MultiPolygon>),
}

impl ShapeCollection {
    /// Type of the shapes in the collection.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeCollection::Points(_) => ShapeType::Point,
            ShapeCollection::Polygons(_) => ShapeType::Polygon,
        }
    }

    /// CRS of the features.
    pub fn crs(&self) -> &Crs {
        match self {
            ShapeCollection::Points(c) => c.crs(),
            ShapeCollection::Polygons(c) => c.crs(),
        }
    }

    /// Attributes of the features.
    pub fn attributes(&self) -> &AttributeTable {
        match self {
            ShapeCollection::Points(c) => c.attributes(),
            ShapeCollection::Polygons(c) => c.attributes(),
        }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        match self {
            ShapeCollection::Points(c) => c.len(),
            ShapeCollection::Polygons(c) => c.len(),
        }
    }

    /// Returns true if there are no features.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding rectangle of all the features.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        match self {
            ShapeCollection::Points(c) => c.bounding_rect(),
            ShapeCollection::Polygons(c) => c.bounding_rect(),
        }
    }

    /// Point features, if the collection contains points.
    pub fn as_points(&self) -> Option<&FeatureCollection<Point2d>> {
        match self {
            ShapeCollection::Points(c) => Some(c),
            ShapeCollection::Polygons(_) => None,
        }
    }

    /// Polygon features, if the collection contains polygons.
    pub fn as_polygons(&self) -> Option<&FeatureCollection<MultiPolygon>> {
        match self {
            ShapeCollection::Points(_) => None,
            ShapeCollection::Polygons(c) => Some(c),
        }
    }

    fn to_shp_file(&self) -> Result<ShpFile, ParcelShpError> {
        let shapes = match self {
            ShapeCollection::Points(c) => c.geometries().iter().copied().map(Shape::Point).collect(),
            ShapeCollection::Polygons(c) => c.geometries().iter().cloned().map(Shape::Polygon).collect(),
        };

        ShpFile::new(self.shape_type(), shapes)
    }
}

impl From<FeatureCollection<Point2d>> for ShapeCollection {
    fn from(value: FeatureCollection<Point2d>) -> Self {
        Self::Points(value)
    }
}

impl From<FeatureCollection<MultiPolygon>> for ShapeCollection {
    fn from(value: FeatureCollection<MultiPolygon>) -> Self {
        Self::Polygons(value)
    }
}

/// Decodes `.shp` data into a feature collection.
///
/// The `attributes` table is paired with the records by position, so it must have exactly one row per record. If
/// `None` is given, the features get an attribute table without fields. All geometries are tagged with `crs`.
///
/// The whole input is validated before anything is returned. Errors:
/// * [`ParcelShpError::Malformed`] if the data is truncated or inconsistent, or contains unsupported shape types;
/// * [`ParcelShpError::EmptyInput`] if the file has no records;
/// * [`ParcelShpError::AttributeMismatch`] if the number of attribute rows differs from the number of records.
pub fn decode<B: Buf>(
    shp: B,
    attributes: Option<AttributeTable>,
    crs: Crs,
) -> Result<ShapeCollection, ParcelShpError> {
    let file = ShpFile::decode(shp)?;
    let shape_type = file.header().shape_type;
    let shapes = file.into_shapes();

    if shapes.is_empty() {
        return Err(ParcelShpError::EmptyInput);
    }

    let attributes = match attributes {
        Some(table) if table.len() != shapes.len() => {
            return Err(ParcelShpError::AttributeMismatch {
                rows: table.len(),
                features: shapes.len(),
            })
        }
        Some(table) => table,
        None => AttributeTable::empty(shapes.len()),
    };

    // All records have the type declared in the header, `ShpFile::decode` rejects the others.
    let collection = match shape_type {
        ShapeType::Point => {
            let points = shapes
                .into_iter()
                .filter_map(|shape| match shape {
                    Shape::Point(point) => Some(point),
                    Shape::Polygon(_) => None,
                })
                .collect();
            ShapeCollection::Points(FeatureCollection::new(crs, points, attributes)?)
        }
        ShapeType::Polygon => {
            let polygons = shapes
                .into_iter()
                .filter_map(|shape| match shape {
                    Shape::Polygon(polygon) => Some(polygon),
                    Shape::Point(_) => None,
                })
                .collect();
            ShapeCollection::Polygons(FeatureCollection::new(crs, polygons, attributes)?)
        }
    };

    Ok(collection)
}

/// Encodes the geometries of the collection into `.shp` data. Attributes and CRS are not stored in the `.shp` file,
/// use [`write_dataset`] to get the attribute table as well.
pub fn encode(collection: &ShapeCollection) -> Result<Bytes, ParcelShpError> {
    if collection.is_empty() {
        return Err(ParcelShpError::EmptyInput);
    }

    Ok(collection.to_shp_file()?.encode())
}

/// Contents of the files of a shapefile dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Geometries (`.shp`).
    pub shp: Bytes,
    /// Record index (`.shx`).
    pub shx: Bytes,
    /// Attributes (`.dbf`).
    pub dbf: Bytes,
}

/// Reads a dataset from the contents of its `.shp` and `.dbf` files.
///
/// Text attributes are read without trailing spaces, and blank text values are read as `Null`.
pub fn read_dataset<S: Buf, D: Buf>(
    shp: S,
    dbf: D,
    crs: Crs,
) -> Result<ShapeCollection, ParcelShpError> {
    let attributes = dbf::decode(dbf)?;
    decode(shp, Some(attributes), crs)
}

/// Writes the collection into `.shp`, `.shx` and `.dbf` files.
///
/// The CRS of the collection is not written: a `.prj` file needs a WKT definition of the CRS, which is not available.
pub fn write_dataset(collection: &ShapeCollection) -> Result<Dataset, ParcelShpError> {
    if collection.is_empty() {
        return Err(ParcelShpError::EmptyInput);
    }

    let file = collection.to_shp_file()?;
    let dbf = dbf::encode(collection.attributes())?;

    log::debug!(
        "Writing shapefile dataset with {} {:?} features",
        collection.len(),
        collection.shape_type()
    );

    Ok(Dataset {
        shp: file.encode(),
        shx: file.encode_index(),
        dbf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use parcel_types::feature::{Field, Schema, Value};
    use parcel_types::{Polygon, Ring};

    fn ring(points: &[(f64, f64)]) -> Ring {
        Ring::closing(points.iter().map(|&(x, y)| Point2d::new(x, y)).collect()).unwrap()
    }

    fn neighborhoods() -> FeatureCollection<MultiPolygon> {
        let mission = Polygon::new(
            ring(&[
                (-122.4268, 37.7486),
                (-122.4038, 37.7486),
                (-122.4038, 37.7697),
                (-122.4268, 37.7697),
            ]),
            vec![ring(&[
                (-122.4200, 37.7550),
                (-122.4150, 37.7550),
                (-122.4150, 37.7600),
                (-122.4200, 37.7600),
            ])],
        )
        .unwrap();
        let islands = MultiPolygon::new(vec![
            Polygon::new(
                ring(&[(-122.38, 37.80), (-122.36, 37.80), (-122.37, 37.83)]),
                vec![],
            )
            .unwrap(),
            Polygon::new(
                ring(&[(-122.35, 37.80), (-122.33, 37.80), (-122.34, 37.82)]),
                vec![],
            )
            .unwrap(),
        ]);

        let schema = Schema::new(vec![Field::text("name"), Field::number("rank")]).unwrap();
        let attributes = AttributeTable::with_rows(
            schema,
            [
                vec!["Mission".into(), 1.0.into()],
                vec!["Treasure Island".into(), Value::Null],
            ],
        )
        .unwrap();

        FeatureCollection::new(Crs::WGS84, vec![mission.into(), islands], attributes).unwrap()
    }

    #[test]
    fn polygon_round_trip() {
        let collection = neighborhoods();
        let bytes = encode(&collection.clone().into()).unwrap();
        let decoded = decode(bytes, Some(collection.attributes().clone()), Crs::WGS84).unwrap();

        let decoded = decoded.as_polygons().unwrap();
        assert_eq!(decoded.crs(), collection.crs());
        assert_eq!(decoded.attributes(), collection.attributes());
        assert_eq!(decoded.len(), collection.len());
        for (a, b) in decoded.geometries().iter().zip(collection.geometries()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }

        assert_eq!(decoded.geometries()[0].parts()[0].holes().len(), 1);
        assert_eq!(decoded.geometries()[1].parts().len(), 2);
    }

    #[test]
    fn truncated_buffer() {
        let bytes = encode(&neighborhoods().into()).unwrap();

        assert_matches!(
            decode(&bytes[..bytes.len() - 10], None, Crs::WGS84),
            Err(ParcelShpError::Malformed {
                record: Some(1),
                ..
            })
        );
        assert_matches!(
            decode(&bytes[..60], None, Crs::WGS84),
            Err(ParcelShpError::Malformed { record: None, .. })
        );
    }

    #[test]
    fn empty_input() {
        let empty = ShpFile::new(ShapeType::Point, vec![]).unwrap().encode();
        assert_matches!(decode(empty, None, Crs::WGS84), Err(ParcelShpError::EmptyInput));

        let collection = FeatureCollection::<Point2d>::without_attributes(Crs::WGS84, vec![]).unwrap();
        assert_matches!(encode(&collection.into()), Err(ParcelShpError::EmptyInput));
    }

    #[test]
    fn attribute_mismatch() {
        let bytes = encode(&neighborhoods().into()).unwrap();
        assert_matches!(
            decode(bytes, Some(AttributeTable::empty(3)), Crs::WGS84),
            Err(ParcelShpError::AttributeMismatch {
                rows: 3,
                features: 2
            })
        );
    }

    #[test]
    fn invalid_point() {
        let file = ShpFile::new(
            ShapeType::Point,
            vec![Shape::Point(Point2d::new(f64::NAN, 1.0))],
        )
        .unwrap();

        assert_matches!(
            decode(file.encode(), None, Crs::WGS84),
            Err(ParcelShpError::Malformed {
                offset: 112,
                record: Some(0),
                ..
            })
        );
    }

    #[test]
    fn dataset_round_trip() {
        let schema = Schema::new(vec![Field::text("id"), Field::number("riders")]).unwrap();
        let attributes = AttributeTable::with_rows(
            schema,
            [
                vec!["16TH".into(), 10_543.0.into()],
                vec!["24TH".into(), 9_211.5.into()],
                vec!["GLEN".into(), Value::Null],
            ],
        )
        .unwrap();
        let utm = Crs::new("EPSG:32610");
        let stations = FeatureCollection::new(
            utm.clone(),
            vec![
                Point2d::new(551_120.3, 4_178_540.1),
                Point2d::new(551_440.8, 4_177_410.6),
                Point2d::new(549_110.0, 4_175_030.2),
            ],
            attributes,
        )
        .unwrap();

        let dataset = write_dataset(&stations.clone().into()).unwrap();
        assert_eq!(dataset.shx.len(), HEADER_LENGTH + 3 * 8);

        let decoded = read_dataset(dataset.shp, dataset.dbf, utm).unwrap();
        assert_eq!(decoded, ShapeCollection::Points(stations));
    }
}
