use std::sync::Arc;

use crate::error::ParcelTypesError;
use crate::feature::attributes::{AttributeTable, Field, Record, Value};
use crate::geo::{Crs, CrsTransform, Projection};
use crate::geometry::Geometry;
use crate::{BoundingRect, Point2d};

/// Ordered set of geometries in one CRS, each paired with a row of the attribute table.
///
/// Collections are immutable: reprojection and adding attribute columns create new collections. The geometries are
/// shared between a collection and the collections created from it by changing only the attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection<G> {
    crs: Crs,
    geometries: Arc<Vec<G>>,
    attributes: AttributeTable,
}

impl<G: Geometry> FeatureCollection<G> {
    /// Creates a new collection.
    ///
    /// Every geometry is validated (e.g. points must have finite coordinates), and the attribute table must have
    /// exactly one row per geometry.
    pub fn new(
        crs: Crs,
        geometries: Vec<G>,
        attributes: AttributeTable,
    ) -> Result<Self, ParcelTypesError> {
        if attributes.len() != geometries.len() {
            return Err(ParcelTypesError::Attribute(format!(
                "attribute table has {} rows for {} geometries",
                attributes.len(),
                geometries.len()
            )));
        }

        for geometry in &geometries {
            geometry.validate()?;
        }

        Ok(Self {
            crs,
            geometries: Arc::new(geometries),
            attributes,
        })
    }

    /// Creates a new collection with an attribute table without fields.
    pub fn without_attributes(crs: Crs, geometries: Vec<G>) -> Result<Self, ParcelTypesError> {
        let attributes = AttributeTable::empty(geometries.len());
        Self::new(crs, geometries, attributes)
    }

    /// CRS of all the geometries of the collection.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Geometries in insertion order.
    pub fn geometries(&self) -> &[G] {
        &self.geometries
    }

    /// Attribute table of the collection.
    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    /// Returns true if there are no features in the collection.
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Geometry and attributes of the feature with the given index.
    pub fn get(&self, index: usize) -> Option<(&G, Record<'_>)> {
        Some((self.geometries.get(index)?, self.attributes.row(index)?))
    }

    /// Iterates over features in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&G, Record<'_>)> {
        self.geometries.iter().zip(self.attributes.rows())
    }

    /// Bounding rectangle of all geometries, computed anew on every call.
    pub fn bounding_rect(&self) -> Option<BoundingRect> {
        BoundingRect::merge_all(self.geometries.iter().filter_map(Geometry::bounding_rect))
    }

    /// Returns a new collection with the same geometries and the given attribute table.
    pub fn with_attributes(&self, attributes: AttributeTable) -> Result<Self, ParcelTypesError> {
        if attributes.len() != self.len() {
            return Err(ParcelTypesError::Attribute(format!(
                "attribute table has {} rows for {} geometries",
                attributes.len(),
                self.len()
            )));
        }

        Ok(Self {
            crs: self.crs.clone(),
            geometries: self.geometries.clone(),
            attributes,
        })
    }

    /// Returns a new collection with an additional attribute column.
    pub fn with_column(
        &self,
        field: Field,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, ParcelTypesError> {
        self.with_attributes(self.attributes.with_column(field, values)?)
    }

    /// Transforms every geometry into the `target` CRS, returning a new collection.
    ///
    /// Fails with [`ParcelTypesError::UnsupportedCrs`] if any of the CRSs is not supported, and with
    /// [`ParcelTypesError::Projection`] on the first point that cannot be projected.
    pub fn reproject(&self, target: &Crs) -> Result<Self, ParcelTypesError> {
        let transform = CrsTransform::new(&self.crs, target)?;
        if &self.crs == target {
            return Ok(Self {
                crs: self.crs.clone(),
                geometries: Arc::clone(&self.geometries),
                attributes: self.attributes.clone(),
            });
        }

        self.reproject_with(&transform, target.clone())
    }

    /// Projects every geometry with the given projection, tagging the result with `target` CRS.
    ///
    /// This allows using a projection implementation that is not known to [`Crs`].
    pub fn reproject_with<Proj>(&self, projection: &Proj, target: Crs) -> Result<Self, ParcelTypesError>
    where
        Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
    {
        let geometries = self
            .geometries
            .iter()
            .map(|geometry| geometry.project(projection))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Reprojected {} geometries from {} to {}",
            geometries.len(),
            self.crs,
            target
        );

        Ok(Self {
            crs: target,
            geometries: Arc::new(geometries),
            attributes: self.attributes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{FieldType, Schema};
    use crate::geo::impls::projection::IdentityProjection;
    use crate::{Polygon, Ring};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    fn restaurants() -> FeatureCollection<Point2d> {
        let schema = Schema::new(vec![Field::new("name", FieldType::Text)]).unwrap();
        let attributes =
            AttributeTable::with_rows(schema, [vec!["Zuni".into()], vec!["Tartine".into()]])
                .unwrap();

        FeatureCollection::new(
            Crs::WGS84,
            vec![Point2d::new(-122.4216, 37.7736), Point2d::new(-122.4241, 37.7614)],
            attributes,
        )
        .unwrap()
    }

    #[test]
    fn construction_checks_rows_and_coordinates() {
        assert_matches!(
            FeatureCollection::new(Crs::WGS84, vec![Point2d::new(0.0, 0.0)], AttributeTable::empty(2)),
            Err(ParcelTypesError::Attribute(_))
        );
        assert_matches!(
            FeatureCollection::without_attributes(
                Crs::WGS84,
                vec![Point2d::new(0.0, 0.0), Point2d::new(f64::NAN, 1.0)]
            ),
            Err(ParcelTypesError::InvalidCoordinate { .. })
        );
    }

    #[test]
    fn iteration_keeps_order() {
        let collection = restaurants();
        let names: Vec<_> = collection
            .iter()
            .filter_map(|(_, record)| record.get("name").and_then(Value::as_text))
            .collect();
        assert_eq!(names, ["Zuni", "Tartine"]);

        let (point, record) = collection.get(1).unwrap();
        assert_eq!(point.y(), 37.7614);
        assert_eq!(record.get("name"), Some(&Value::from("Tartine")));
        assert!(collection.get(2).is_none());
    }

    #[test]
    fn with_column_shares_geometries() {
        let collection = restaurants();
        let rated = collection
            .with_column(Field::number("rating"), [4.5.into(), Value::Null])
            .unwrap();

        assert!(Arc::ptr_eq(&collection.geometries, &rated.geometries));
        assert_eq!(collection.attributes().schema().len(), 1);
        assert_eq!(rated.attributes().value(0, "rating"), Some(&Value::Number(4.5)));
    }

    #[test]
    fn bounding_rect() {
        let rect = restaurants().bounding_rect().unwrap();
        assert_eq!(rect, BoundingRect::new(-122.4241, 37.7614, -122.4216, 37.7736));

        let empty = FeatureCollection::<Point2d>::without_attributes(Crs::WGS84, vec![]).unwrap();
        assert!(empty.bounding_rect().is_none());
    }

    #[test]
    fn reproject_creates_new_collection() {
        let collection = restaurants();
        let projected = collection.reproject(&Crs::EPSG3857).unwrap();

        assert_eq!(collection.crs(), &Crs::WGS84);
        assert_eq!(projected.crs(), &Crs::EPSG3857);
        assert_eq!(projected.attributes(), collection.attributes());
        assert_abs_diff_eq!(projected.geometries()[0].x(), -13_627_910.174, epsilon = 1e-3);

        let restored = projected.reproject(&Crs::WGS84).unwrap();
        for (a, b) in restored.geometries().iter().zip(collection.geometries()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn reproject_with_custom_projection() {
        let ring = Ring::closing(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(4.0, 0.0),
            Point2d::new(4.0, 4.0),
            Point2d::new(0.0, 4.0),
        ])
        .unwrap();
        let collection =
            FeatureCollection::without_attributes(Crs::new("local"), vec![Polygon::new(ring, vec![]).unwrap()])
                .unwrap();

        let retagged = collection
            .reproject_with(&IdentityProjection::new(), Crs::new("EPSG:3857"))
            .unwrap();
        assert_eq!(retagged.crs(), &Crs::EPSG3857);
        assert_eq!(retagged.geometries(), collection.geometries());
    }

    #[test]
    fn reproject_fails_on_unsupported_crs() {
        assert_matches!(
            restaurants().reproject(&Crs::new("EPSG:1")),
            Err(ParcelTypesError::UnsupportedCrs(_))
        );
    }

    #[test]
    fn reproject_to_same_crs() {
        let collection = restaurants();
        let same = collection.reproject(&Crs::WGS84).unwrap();
        assert!(Arc::ptr_eq(&collection.geometries, &same.geometries));

        let unknown =
            FeatureCollection::without_attributes(Crs::new("EPSG:1"), vec![Point2d::new(0.0, 0.0)]).unwrap();
        assert_matches!(
            unknown.reproject(&Crs::new("EPSG:1")),
            Err(ParcelTypesError::UnsupportedCrs(_))
        );
        assert_matches!(
            CrsTransform::new(unknown.crs(), &Crs::new("EPSG:1")).err(),
            Some(ParcelTypesError::UnsupportedCrs(_))
        );
    }
}
