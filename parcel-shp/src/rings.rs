//! Conversion between the flat list of rings stored in a polygon record and polygons with holes.
//!
//! In a shapefile outer rings go clockwise and holes go counter-clockwise. There is no explicit link between a hole
//! and its outer ring, so it has to be restored from geometry.

use parcel_types::{MultiPolygon, ParcelTypesError, Polygon, Ring, Winding};

struct Shell {
    ring: Ring,
    area: f64,
    holes: Vec<Ring>,
}

impl Shell {
    fn new(ring: Ring) -> Result<Self, ParcelTypesError> {
        Ok(Self {
            area: ring.area()?,
            ring,
            holes: vec![],
        })
    }

    fn encloses(&self, hole: &Ring) -> bool {
        hole.iter_vertices().all(|p| self.ring.contains_point(p))
    }
}

/// Groups rings into polygons. Every hole is assigned to the smallest outer ring that contains it. A hole outside of
/// all the outer rings is treated as an outer ring itself.
pub(crate) fn assemble_polygons(rings: Vec<Ring>) -> Result<MultiPolygon, ParcelTypesError> {
    let mut shells = vec![];
    let mut holes = vec![];
    for ring in rings {
        match ring.winding()? {
            Winding::Clockwise => shells.push(Shell::new(ring)?),
            Winding::CounterClockwise => holes.push(ring),
        }
    }

    for hole in holes {
        let shell = shells
            .iter_mut()
            .filter(|shell| shell.encloses(&hole))
            .min_by(|a, b| a.area.total_cmp(&b.area));

        match shell {
            Some(shell) => shell.holes.push(hole),
            None => {
                log::warn!("Hole ring is not inside any outer ring, treating it as an outer ring");
                shells.push(Shell::new(hole)?);
            }
        }
    }

    let polygons = shells
        .into_iter()
        .map(|shell| Polygon::new(shell.ring, shell.holes))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MultiPolygon::new(polygons))
}

/// Rings of the multipolygon in the order and orientation they are stored in a file: each outer ring (clockwise)
/// followed by its holes (counter-clockwise).
pub(crate) fn file_rings(multi_polygon: &MultiPolygon) -> impl Iterator<Item = Ring> + '_ {
    // Polygons keep outer rings counter-clockwise and holes clockwise, so every ring is reversed.
    multi_polygon
        .parts()
        .iter()
        .flat_map(|polygon| polygon.iter_rings().map(Ring::reversed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_types::{Location, Point2d};

    fn square(x: f64, y: f64, size: f64) -> Ring {
        // Clockwise.
        Ring::closing(vec![
            Point2d::new(x, y),
            Point2d::new(x, y + size),
            Point2d::new(x + size, y + size),
            Point2d::new(x + size, y),
        ])
        .unwrap()
    }

    #[test]
    fn holes_go_to_smallest_shell() {
        let big = square(0.0, 0.0, 100.0);
        let island = square(40.0, 40.0, 20.0);
        let lake = square(10.0, 10.0, 80.0).reversed();
        let pond = square(45.0, 45.0, 5.0).reversed();

        let multi = assemble_polygons(vec![big, island, lake, pond]).unwrap();

        assert_eq!(multi.parts().len(), 2);
        assert_eq!(multi.parts()[0].holes().len(), 1);
        assert_eq!(multi.parts()[1].holes().len(), 1);
        assert_eq!(multi.parts()[1].holes()[0].bounding_rect().x_min, 45.0);

        assert_eq!(multi.locate_point(&Point2d::new(5.0, 5.0)), Location::Inside);
        assert_eq!(multi.locate_point(&Point2d::new(20.0, 20.0)), Location::Outside);
        assert_eq!(multi.locate_point(&Point2d::new(42.0, 42.0)), Location::Inside);
        assert_eq!(multi.locate_point(&Point2d::new(47.0, 47.0)), Location::Outside);
    }

    #[test]
    fn orphan_hole_becomes_shell() {
        let multi = assemble_polygons(vec![square(0.0, 0.0, 1.0).reversed()]).unwrap();
        assert_eq!(multi.parts().len(), 1);
        assert!(multi.parts()[0].holes().is_empty());
    }

    #[test]
    fn file_rings_round_trip() {
        let rings = vec![
            square(0.0, 0.0, 10.0),
            square(2.0, 2.0, 2.0).reversed(),
            square(20.0, 0.0, 10.0),
        ];
        let multi = assemble_polygons(rings.clone()).unwrap();

        assert_eq!(file_rings(&multi).collect::<Vec<_>>(), rings);
    }
}
