//! Interoperability with the [`geo_types`] crate: point traits for `geo_types` points and conversions between parcel
//! geometries and `geo_types` geometries.

mod point;
mod polygon;
