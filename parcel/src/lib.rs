//! Parcel is a small geospatial toolkit for the typical steps of an analysis over vector data: reading features from
//! shapefiles and CSV tables, bringing them into one coordinate reference system, assigning points to the polygons
//! that contain them, and measuring areas and distances.
//!
//! # Main components
//!
//! * [`FeatureCollection`](feature::FeatureCollection) pairs geometries with an attribute table and the [`Crs`](geo::Crs)
//!   of the coordinates. Collections are immutable: operations return new collections with extra attribute columns
//!   or reprojected geometries.
//! * [`parcel_shp`] decodes and encodes shapefiles. Use [`read_dataset`] to read the `.shp` and `.dbf` files of a
//!   dataset, or [`table::PointTableReader`] to read points from a CSV table.
//! * [`overlay::Overlay`] finds the polygon containing each point.
//! * [`measurement::Measurement`] calculates areas, perimeters and great-circle distances.
//!
//! ```
//! use parcel::feature::{AttributeTable, FeatureCollection, Field, Schema};
//! use parcel::geo::Crs;
//! use parcel::measurement::Measurement;
//! use parcel::overlay::Overlay;
//! use parcel::table::PointTableReader;
//! use parcel::{Point2d, Polygon, Ring};
//!
//! let ring = Ring::closing(vec![
//!     Point2d::new(-122.43, 37.75),
//!     Point2d::new(-122.40, 37.75),
//!     Point2d::new(-122.40, 37.77),
//!     Point2d::new(-122.43, 37.77),
//! ])
//! .unwrap();
//! let schema = Schema::new(vec![Field::text("name")]).unwrap();
//! let hoods = FeatureCollection::new(
//!     Crs::WGS84,
//!     vec![Polygon::new(ring, vec![]).unwrap()],
//!     AttributeTable::with_rows(schema, [vec!["Mission".into()]]).unwrap(),
//! )
//! .unwrap();
//!
//! let csv = "name,longitude,latitude\nTartine,-122.4241,37.7614\nSwan,-122.4205,37.7907\n";
//! let restaurants = PointTableReader::new(Crs::WGS84).read(csv.as_bytes()).unwrap();
//!
//! let tagged = Overlay::new(&hoods).join(&restaurants, "name", "hood").unwrap();
//! assert_eq!(tagged.attributes().value(0, "hood").unwrap().as_text(), Some("Mission"));
//! assert!(tagged.attributes().value(1, "hood").unwrap().is_null());
//!
//! let areas = Measurement::new().areas(&hoods).unwrap();
//! assert!(areas[0] > 5_000_000.0);
//! ```

pub mod error;
pub mod measurement;
pub mod overlay;
pub mod table;

pub use error::ParcelError;

pub use parcel_shp;
pub use parcel_shp::{read_dataset, write_dataset, Dataset, ShapeCollection};
pub use parcel_types;
pub use parcel_types::{
    feature, geo, Areal, BoundingRect, Geometry, Location, MultiPolygon, ParcelTypesError, Point2d, Polygon, Ring,
    Winding,
};
