use crate::error::ParcelTypesError;
use crate::geo::impls::projection::IdentityProjection;
use crate::geo::traits::projection::{ChainProjection, InvertedProjection, Projection};
use crate::geo::Crs;
use crate::geometry::Geometry;
use crate::Point2d;

/// Conversion of coordinates from one CRS into another.
///
/// The points are first unprojected from the source CRS into geographic coordinates, and then projected into the
/// target CRS. If both descriptors are the same, the coordinates are not touched.
pub struct CrsTransform {
    source: Crs,
    target: Crs,
    projection: Box<dyn Projection<InPoint = Point2d, OutPoint = Point2d>>,
}

impl CrsTransform {
    /// Creates a new transform. Fails with [`ParcelTypesError::UnsupportedCrs`] if any of the descriptors cannot be
    /// interpreted.
    pub fn new(source: &Crs, target: &Crs) -> Result<Self, ParcelTypesError> {
        let source_projection = source.projection()?;

        let projection: Box<dyn Projection<InPoint = Point2d, OutPoint = Point2d>> =
            if source == target {
                Box::new(IdentityProjection::new())
            } else {
                let target_projection = target.projection()?;
                Box::new(ChainProjection::new(
                    Box::new(InvertedProjection::new(source_projection)),
                    target_projection,
                ))
            };

        Ok(Self {
            source: source.clone(),
            target: target.clone(),
            projection,
        })
    }

    /// Source CRS.
    pub fn source(&self) -> &Crs {
        &self.source
    }

    /// Target CRS.
    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// Converts a geometry from the source into the target CRS.
    pub fn apply<G: Geometry>(&self, geometry: &G) -> Result<G, ParcelTypesError> {
        geometry.project(self)
    }
}

impl Projection for CrsTransform {
    type InPoint = Point2d;
    type OutPoint = Point2d;

    fn project(&self, input: &Point2d) -> Option<Point2d> {
        self.projection.project(input)
    }

    fn unproject(&self, input: &Point2d) -> Option<Point2d> {
        self.projection.unproject(input)
    }
}

/// Converts a single geometry from `source` into `target` CRS.
///
/// For converting many geometries, create a [`CrsTransform`] once and reuse it.
pub fn transform<G: Geometry>(geometry: &G, source: &Crs, target: &Crs) -> Result<G, ParcelTypesError> {
    CrsTransform::new(source, target)?.apply(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Polygon, Ring};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    #[test]
    fn same_crs_keeps_coordinates() {
        let point = Point2d::new(12.5, -7.25);
        let result = transform(&point, &Crs::EPSG3857, &Crs::new("EPSG:3857 ")).unwrap();
        assert_eq!(result, point);
    }

    #[test]
    fn geographic_to_web_mercator_and_back() {
        let point = Point2d::new(-122.4167, 37.7833);
        let forward = CrsTransform::new(&Crs::WGS84, &Crs::EPSG3857).unwrap();
        let projected = forward.apply(&point).unwrap();
        assert_abs_diff_eq!(projected.x(), -13_627_365.0, epsilon = 50.0);

        let restored = transform(&projected, &Crs::EPSG3857, &Crs::WGS84).unwrap();
        assert_abs_diff_eq!(restored, point, epsilon = 1e-9);
    }

    #[test]
    fn polygons_are_transformed_pointwise() {
        let ring = Ring::closing(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(0.0, 1.0),
        ])
        .unwrap();
        let polygon = Polygon::new(ring, vec![]).unwrap();

        let projected = transform(&polygon, &Crs::WGS84, &Crs::EPSG3857).unwrap();
        let rect = projected.bounding_rect();
        assert_abs_diff_eq!(rect.x_max, 111_319.490_793_273_6, epsilon = 1e-6);
        assert_abs_diff_eq!(rect.y_min, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn points_outside_projection_domain() {
        let pole = Point2d::new(0.0, 89.9);
        assert_matches!(
            transform(&pole, &Crs::WGS84, &Crs::EPSG3857),
            Err(ParcelTypesError::Projection { .. })
        );
    }

    #[test]
    fn unsupported_descriptors() {
        let point = Point2d::new(0.0, 0.0);
        assert_matches!(
            transform(&point, &Crs::new("EPSG:1"), &Crs::WGS84),
            Err(ParcelTypesError::UnsupportedCrs(_))
        );
        assert_matches!(
            transform(&point, &Crs::WGS84, &Crs::new("EPSG:1")),
            Err(ParcelTypesError::UnsupportedCrs(_))
        );
        assert_matches!(
            transform(&point, &Crs::new("EPSG:1"), &Crs::new("EPSG:1")),
            Err(ParcelTypesError::UnsupportedCrs(_))
        );
    }
}
