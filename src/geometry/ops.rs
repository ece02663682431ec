//! Geometry operations the layout engine delegates to
//!
//! [`GeometryOps`] is the seam between grid fitting and the polygon library.
//! [`GeoOps`] implements it with the `geo` crate.

use std::panic::{self, AssertUnwindSafe};

use geo::{BoundingRect, ChamberlainDuquetteArea, Contains, Polygon, Rect};

use super::Bounds;
use crate::domain::RoofPolygon;
use crate::error::{LayoutError, Result};

pub trait GeometryOps {
    /// Bounding box of the roof in degrees, `None` for an empty ring
    fn bounding_box(&self, roof: &RoofPolygon) -> Option<Bounds>;

    /// True when `candidate` lies entirely inside `roof`
    ///
    /// Touching the boundary counts as inside; any part in the exterior
    /// does not.
    fn is_fully_contained(&self, candidate: &Rect<f64>, roof: &Polygon<f64>) -> Result<bool>;

    /// Roof area in square meters
    fn area(&self, roof: &RoofPolygon) -> f64;
}

/// [`GeometryOps`] backed by the `geo` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOps;

impl GeometryOps for GeoOps {
    fn bounding_box(&self, roof: &RoofPolygon) -> Option<Bounds> {
        roof.to_polygon().bounding_rect().map(Bounds::from)
    }

    fn is_fully_contained(&self, candidate: &Rect<f64>, roof: &Polygon<f64>) -> Result<bool> {
        let (min, max) = (candidate.min(), candidate.max());
        if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
            return Err(LayoutError::GeometryCollaboratorFailure(format!(
                "candidate has non-finite corners: {:?}",
                candidate
            )));
        }

        let candidate = candidate.to_polygon();
        panic::catch_unwind(AssertUnwindSafe(|| roof.contains(&candidate))).map_err(|_| {
            LayoutError::GeometryCollaboratorFailure(
                "containment test panicked".to_string(),
            )
        })
    }

    /// Spherical area, the same approximation web mapping tools use
    fn area(&self, roof: &RoofPolygon) -> f64 {
        roof.to_polygon().chamberlain_duquette_unsigned_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    fn unit_square() -> RoofPolygon {
        RoofPolygon::new(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ])
        .unwrap()
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    #[test]
    fn test_bounding_box() {
        let bounds = GeoOps.bounding_box(&unit_square()).unwrap();
        assert_eq!(bounds.min_lng, 0.0);
        assert_eq!(bounds.max_lat, 1.0);
    }

    #[test]
    fn test_contained_inside() {
        let roof = unit_square().to_polygon();
        assert!(GeoOps.is_fully_contained(&rect(0.2, 0.2, 0.4, 0.4), &roof).unwrap());
    }

    #[test]
    fn test_touching_boundary_counts_as_inside() {
        let roof = unit_square().to_polygon();
        assert!(GeoOps.is_fully_contained(&rect(0.0, 0.0, 0.5, 0.5), &roof).unwrap());
    }

    #[test]
    fn test_overlapping_is_not_contained() {
        let roof = unit_square().to_polygon();
        assert!(!GeoOps.is_fully_contained(&rect(0.8, 0.8, 1.2, 1.2), &roof).unwrap());
    }

    #[test]
    fn test_concave_notch_excluded() {
        // L-shape: the top-right quadrant is missing
        let roof = RoofPolygon::new(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.5),
            (0.5, 0.5),
            (0.5, 1.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ])
        .unwrap()
        .to_polygon();

        assert!(!GeoOps.is_fully_contained(&rect(0.4, 0.4, 0.9, 0.9), &roof).unwrap());
        assert!(GeoOps.is_fully_contained(&rect(0.1, 0.6, 0.4, 0.9), &roof).unwrap());
    }

    #[test]
    fn test_non_finite_candidate_fails() {
        let roof = unit_square().to_polygon();
        let result = GeoOps.is_fully_contained(&rect(f64::NAN, 0.0, 0.5, 0.5), &roof);
        assert!(matches!(
            result,
            Err(LayoutError::GeometryCollaboratorFailure(_))
        ));
    }

    #[test]
    fn test_area_of_small_square() {
        // 100m x 100m at the equator
        let d = 100.0 / 111320.0;
        let roof = RoofPolygon::new(vec![(0.0, 0.0), (d, 0.0), (d, d), (0.0, d), (0.0, 0.0)])
            .unwrap();
        let area = GeoOps.area(&roof);
        assert!((area - 10000.0).abs() < 100.0, "area was {}", area);
    }
}
