//! Point-in-polygon overlay: assignment of point features to the polygon features that contain them.
//!
//! ```
//! use parcel::overlay::Overlay;
//! use parcel::feature::FeatureCollection;
//! use parcel::geo::Crs;
//! use parcel::{Point2d, Polygon, Ring};
//!
//! let square = |x: f64| {
//!     let ring = Ring::closing(vec![
//!         Point2d::new(x, 0.0),
//!         Point2d::new(x + 1.0, 0.0),
//!         Point2d::new(x + 1.0, 1.0),
//!         Point2d::new(x, 1.0),
//!     ])
//!     .unwrap();
//!     Polygon::new(ring, vec![]).unwrap()
//! };
//!
//! let blocks = FeatureCollection::without_attributes(Crs::EPSG3857, vec![square(0.0), square(2.0)]).unwrap();
//! let points = FeatureCollection::without_attributes(
//!     Crs::EPSG3857,
//!     vec![Point2d::new(2.5, 0.5), Point2d::new(1.5, 0.5)],
//! )
//! .unwrap();
//!
//! let assignment = Overlay::new(&blocks).assign(&points).unwrap();
//! assert_eq!(assignment.as_slice(), &[Some(1), None]);
//! ```

use parcel_types::feature::{FeatureCollection, Field};
use parcel_types::geo::Crs;
use parcel_types::{Areal, Point2d};

use crate::error::ParcelError;

mod index;

pub use index::{BoundingBoxIndex, SpatialIndex};

/// Polygon features prepared for point queries.
///
/// Polygons are tried in collection order, so a point inside several overlapping polygons is assigned to the one with
/// the lowest index. Points on the boundary of a polygon are considered inside it.
pub struct Overlay<'a, G, I = BoundingBoxIndex> {
    polygons: &'a FeatureCollection<G>,
    index: I,
}

impl<'a, G> Overlay<'a, G>
where
    G: Areal + Send + Sync,
{
    /// Creates an overlay with a [`BoundingBoxIndex`] of the polygons.
    pub fn new(polygons: &'a FeatureCollection<G>) -> Self {
        let index = BoundingBoxIndex::new(polygons.geometries());
        Self::with_index(polygons, index)
    }
}

impl<'a, G, I> Overlay<'a, G, I>
where
    G: Areal + Send + Sync,
    I: SpatialIndex,
{
    /// Creates an overlay using the given index. The index must be built over the geometries of `polygons`, in the
    /// same order.
    pub fn with_index(polygons: &'a FeatureCollection<G>, index: I) -> Self {
        Self { polygons, index }
    }

    /// Polygon features of the overlay.
    pub fn polygons(&self) -> &'a FeatureCollection<G> {
        self.polygons
    }

    /// Index of the first polygon containing the point.
    ///
    /// The point is assumed to be in the CRS of the polygons.
    pub fn locate(&self, point: &Point2d) -> Option<usize> {
        let geometries = self.polygons.geometries();
        self.index.candidates(*point).find(|&index| {
            geometries
                .get(index)
                .is_some_and(|polygon| polygon.contains_point(point))
        })
    }

    /// Finds the containing polygon for every point of the collection.
    ///
    /// Fails with [`ParcelError::CrsMismatch`] if the points and the polygons have different CRSs.
    pub fn assign(&self, points: &FeatureCollection<Point2d>) -> Result<Assignment, ParcelError> {
        ensure_same_crs(points.crs(), self.polygons.crs())?;

        let polygons = self.locate_all(points.geometries());
        let assignment = Assignment {
            polygons,
            polygon_count: self.polygons.len(),
        };

        log::debug!(
            "Assigned {} of {} points to {} polygons",
            assignment.len() - assignment.unassigned(),
            assignment.len(),
            self.polygons.len()
        );

        Ok(assignment)
    }

    /// Copies the value of `source_field` of the containing polygon into a new `target_field` column of the points.
    /// Points outside all polygons get `Null` values.
    pub fn join(
        &self,
        points: &FeatureCollection<Point2d>,
        source_field: &str,
        target_field: &str,
    ) -> Result<FeatureCollection<Point2d>, ParcelError> {
        let attributes = self.polygons.attributes();
        let field_type = attributes
            .schema()
            .field(source_field)
            .ok_or_else(|| ParcelError::MissingField(source_field.to_string()))?
            .field_type();

        let assignment = self.assign(points)?;
        let values = assignment.iter().map(|polygon| {
            polygon
                .and_then(|index| attributes.value(index, source_field))
                .cloned()
                .unwrap_or_default()
        });

        Ok(points.with_column(Field::new(target_field, field_type), values)?)
    }

    #[cfg(feature = "rayon")]
    fn locate_all(&self, points: &[Point2d]) -> Vec<Option<usize>> {
        use rayon::prelude::*;

        points.par_iter().map(|point| self.locate(point)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn locate_all(&self, points: &[Point2d]) -> Vec<Option<usize>> {
        points.iter().map(|point| self.locate(point)).collect()
    }
}

/// Assigns every point to the first polygon containing it. Shortcut for `Overlay::new(polygons).assign(points)`.
pub fn assign<G>(
    points: &FeatureCollection<Point2d>,
    polygons: &FeatureCollection<G>,
) -> Result<Assignment, ParcelError>
where
    G: Areal + Send + Sync,
{
    Overlay::new(polygons).assign(points)
}

pub(crate) fn ensure_same_crs(left: &Crs, right: &Crs) -> Result<(), ParcelError> {
    if left == right {
        Ok(())
    } else {
        Err(ParcelError::CrsMismatch {
            left: left.clone(),
            right: right.clone(),
        })
    }
}

/// Result of an overlay: index of the containing polygon for each point, in the order of the points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    polygons: Vec<Option<usize>>,
    polygon_count: usize,
}

impl Assignment {
    /// Polygon containing the point with the given index.
    pub fn get(&self, point: usize) -> Option<usize> {
        self.polygons.get(point).copied().flatten()
    }

    /// Polygon indices for all points.
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.polygons
    }

    /// Iterates over polygon indices of all points.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Option<usize>> + '_ {
        self.polygons.iter().copied()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Returns true if there are no points.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Number of points that are outside all polygons.
    pub fn unassigned(&self) -> usize {
        self.polygons.iter().filter(|p| p.is_none()).count()
    }

    /// Number of points in each polygon, indexed by polygon.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.polygon_count];
        for index in self.polygons.iter().flatten() {
            counts[*index] += 1;
        }

        counts
    }
}

impl From<Assignment> for Vec<Option<usize>> {
    fn from(value: Assignment) -> Self {
        value.polygons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use parcel_types::feature::{AttributeTable, Schema, Value};
    use parcel_types::geo::Projection;
    use parcel_types::{BoundingRect, Geometry, ParcelTypesError, Polygon, Ring};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn rect(x: f64, y: f64, width: f64, height: f64) -> Polygon {
        Polygon::new(
            Ring::closing(vec![
                Point2d::new(x, y),
                Point2d::new(x + width, y),
                Point2d::new(x + width, y + height),
                Point2d::new(x, y + height),
            ])
            .unwrap(),
            vec![],
        )
        .unwrap()
    }

    fn points(points: &[(f64, f64)]) -> FeatureCollection<Point2d> {
        FeatureCollection::without_attributes(
            Crs::EPSG3857,
            points.iter().map(|&(x, y)| Point2d::new(x, y)).collect(),
        )
        .unwrap()
    }

    fn polygons(polygons: Vec<Polygon>) -> FeatureCollection<Polygon> {
        FeatureCollection::without_attributes(Crs::EPSG3857, polygons).unwrap()
    }

    /// Polygon that counts full containment tests.
    #[derive(Debug, Clone)]
    struct CountingPolygon {
        polygon: Polygon,
        calls: Arc<AtomicUsize>,
    }

    impl Geometry for CountingPolygon {
        fn bounding_rect(&self) -> Option<BoundingRect> {
            Some(self.polygon.bounding_rect())
        }

        fn project<Proj>(&self, projection: &Proj) -> Result<Self, ParcelTypesError>
        where
            Proj: Projection<InPoint = Point2d, OutPoint = Point2d> + ?Sized,
        {
            Ok(Self {
                polygon: self.polygon.project_points(projection)?,
                calls: self.calls.clone(),
            })
        }
    }

    impl Areal for CountingPolygon {
        fn contains_point(&self, point: &Point2d) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.polygon.contains_point(point)
        }

        fn area(&self) -> Result<f64, ParcelTypesError> {
            self.polygon.area()
        }

        fn perimeter(&self, distance: impl Fn(&Point2d, &Point2d) -> f64) -> f64 {
            self.polygon.perimeter(distance)
        }

        fn polygons(&self) -> impl Iterator<Item = &Polygon> {
            std::iter::once(&self.polygon)
        }
    }

    #[test]
    fn bounding_box_prefilter_skips_containment_test() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counting = |polygon| CountingPolygon {
            polygon,
            calls: calls.clone(),
        };
        let collection = FeatureCollection::without_attributes(
            Crs::EPSG3857,
            vec![
                counting(rect(0.0, 0.0, 10.0, 10.0)),
                counting(rect(20.0, 0.0, 10.0, 10.0)),
            ],
        )
        .unwrap();
        let overlay = Overlay::new(&collection);

        let outside = overlay.assign(&points(&[(15.0, 5.0), (-1.0, 50.0)])).unwrap();
        assert_eq!(outside.as_slice(), &[None, None]);
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        let inside = overlay.assign(&points(&[(25.0, 5.0)])).unwrap();
        assert_eq!(inside.as_slice(), &[Some(1)]);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn assignment_follows_polygon_order() {
        let target = rect(10.0, 10.0, 5.0, 5.0);
        let others = [rect(0.0, 0.0, 5.0, 5.0), rect(20.0, 0.0, 5.0, 30.0), rect(0.0, 20.0, 5.0, 5.0)];
        let point = points(&[(12.0, 13.0)]);

        for position in 0..=others.len() {
            for rotation in 0..others.len() {
                let mut ordered = others.to_vec();
                ordered.rotate_left(rotation);
                ordered.insert(position, target.clone());

                let assignment = assign(&point, &polygons(ordered)).unwrap();
                assert_eq!(assignment.get(0), Some(position));
            }
        }
    }

    #[test]
    fn overlapping_polygons_resolve_to_lowest_index() {
        let collection = polygons(vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(5.0, 5.0, 10.0, 10.0),
            rect(6.0, 6.0, 1.0, 1.0),
        ]);

        let assignment = assign(&points(&[(6.5, 6.5), (12.0, 12.0)]), &collection).unwrap();
        assert_eq!(assignment.as_slice(), &[Some(0), Some(1)]);
    }

    #[test]
    fn boundary_points_are_inside() {
        let collection = polygons(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        let assignment = assign(&points(&[(0.0, 5.0), (10.0, 10.0), (10.000001, 5.0)]), &collection).unwrap();
        assert_eq!(assignment.as_slice(), &[Some(0), Some(0), None]);
    }

    #[test]
    fn holes_are_outside() {
        let with_hole = Polygon::new(
            rect(0.0, 0.0, 10.0, 10.0).outer().clone(),
            vec![rect(4.0, 4.0, 2.0, 2.0).outer().clone()],
        )
        .unwrap();
        let collection = polygons(vec![with_hole, rect(4.5, 4.5, 1.0, 1.0)]);

        let assignment = assign(&points(&[(5.0, 5.0), (4.2, 4.2), (1.0, 1.0)]), &collection).unwrap();
        assert_eq!(assignment.as_slice(), &[Some(1), None, Some(0)]);
    }

    #[test]
    fn crs_mismatch() {
        let collection = polygons(vec![rect(0.0, 0.0, 10.0, 10.0)]);
        let geographic =
            FeatureCollection::without_attributes(Crs::WGS84, vec![Point2d::new(1.0, 1.0)]).unwrap();

        assert_matches!(
            assign(&geographic, &collection),
            Err(ParcelError::CrsMismatch { .. })
        );
    }

    #[test]
    fn counts() {
        let collection = polygons(vec![
            rect(0.0, 0.0, 10.0, 10.0),
            rect(20.0, 0.0, 10.0, 10.0),
            rect(40.0, 0.0, 10.0, 10.0),
        ]);
        let assignment = assign(
            &points(&[(1.0, 1.0), (2.0, 2.0), (41.0, 1.0), (100.0, 100.0)]),
            &collection,
        )
        .unwrap();

        assert_eq!(assignment.counts(), vec![2, 0, 1]);
        assert_eq!(assignment.unassigned(), 1);
        assert_eq!(assignment.len(), 4);
    }

    #[test]
    fn join_copies_polygon_attribute() {
        let schema = Schema::new(vec![Field::text("hood")]).unwrap();
        let attributes = AttributeTable::with_rows(
            schema,
            [vec!["Mission".into()], vec!["Castro".into()]],
        )
        .unwrap();
        let collection = FeatureCollection::new(
            Crs::EPSG3857,
            vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)],
            attributes,
        )
        .unwrap();
        let overlay = Overlay::new(&collection);

        let joined = overlay
            .join(&points(&[(25.0, 5.0), (15.0, 5.0), (5.0, 5.0)]), "hood", "neighborhood")
            .unwrap();

        let column: Vec<_> = joined.attributes().column("neighborhood").unwrap().cloned().collect();
        assert_eq!(column, vec![Value::from("Castro"), Value::Null, Value::from("Mission")]);

        assert_matches!(
            overlay.join(&points(&[(1.0, 1.0)]), "name", "neighborhood"),
            Err(ParcelError::MissingField(_))
        );
    }

    struct NoIndex(usize);

    impl SpatialIndex for NoIndex {
        fn candidates(&self, _point: Point2d) -> impl Iterator<Item = usize> + '_ {
            0..self.0
        }
    }

    #[test]
    fn custom_index() {
        let collection = polygons(vec![rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 10.0, 10.0)]);
        let points = points(&[(25.0, 5.0), (15.0, 5.0), (5.0, 5.0)]);

        let indexed = Overlay::new(&collection).assign(&points).unwrap();
        let unindexed = Overlay::with_index(&collection, NoIndex(2)).assign(&points).unwrap();
        assert_eq!(indexed, unindexed);

        // Indices outside of the collection are ignored.
        let broken = Overlay::with_index(&collection, NoIndex(5)).assign(&points).unwrap();
        assert_eq!(indexed, broken);
    }
}
