//! Features: geometries paired with attribute records, grouped into collections sharing one CRS.

mod attributes;
mod collection;

pub use attributes::{AttributeTable, Field, FieldType, Record, Schema, Value};
pub use collection::FeatureCollection;
