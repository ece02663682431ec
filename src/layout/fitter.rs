use geo::{Polygon, Rect, coord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Dimensions, RoofPolygon};
use crate::error::{LayoutError, Result};
use crate::geometry::{Bounds, GeoConverter, GeoOps, GeometryOps};

/// Largest grid scanned by default before giving up
pub const DEFAULT_MAX_CANDIDATES: u64 = 100_000;

/// Below this the longitude scale is unusable (reference latitude at a pole)
const MIN_METERS_PER_DEGREE: f64 = 1e-3;

/// Overshoot past the bounding box that is treated as rounding error.
/// Far edges within this distance are clamped onto the box edge.
const EDGE_TOLERANCE_METERS: f64 = 1e-6;

/// A panel placed by a fit pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedTile {
    /// Position in row-major scan order within its batch
    pub index: usize,
    /// Corners in (lng, lat) degrees
    pub bounds: Rect<f64>,
    pub removed: bool,
}

impl PlacedTile {
    /// Closed ring of (lng, lat) corners, counter-clockwise from south-west
    pub fn ring(&self) -> Vec<(f64, f64)> {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        vec![
            (min.x, min.y),
            (max.x, min.y),
            (max.x, max.y),
            (min.x, max.y),
            (min.x, min.y),
        ]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        self.bounds.to_polygon()
    }
}

/// Outcome of one fit pass
#[derive(Debug, Clone, Default)]
pub struct FitReport {
    pub tiles: Vec<PlacedTile>,
    /// Grid rows and columns scanned
    pub rows: usize,
    pub columns: usize,
    /// Candidates that were not fully inside the roof
    pub rejected: usize,
    /// Candidates dropped because the containment test failed
    pub failures: usize,
}

impl FitReport {
    pub fn candidates(&self) -> usize {
        self.rows * self.columns
    }
}

/// Fits a regular grid of panels inside a roof outline
///
/// # Algorithm
/// 1. Bounding box of the roof in degrees
/// 2. Scale factors at the box's middle latitude
/// 3. Panel size and panel-plus-gap step converted to degrees per axis
/// 4. Row-major scan from the south-west corner, one candidate per cell
/// 5. Keep candidates fully contained in the roof, indexed in scan order
///
/// Every cell uses the same reference latitude, so the grid is rectangular
/// in degree space. See [`GeoConverter`] for the accuracy limits.
#[derive(Debug, Clone)]
pub struct GridFitter<G = GeoOps> {
    ops: G,
    max_candidates: u64,
}

impl GridFitter<GeoOps> {
    pub fn new() -> Self {
        Self::with_ops(GeoOps)
    }
}

impl Default for GridFitter<GeoOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GeometryOps> GridFitter<G> {
    pub fn with_ops(ops: G) -> Self {
        Self {
            ops,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    pub fn with_max_candidates(mut self, limit: u64) -> Self {
        self.max_candidates = limit;
        self
    }

    pub fn max_candidates(&self) -> u64 {
        self.max_candidates
    }

    pub fn ops(&self) -> &G {
        &self.ops
    }

    /// Run one fit pass
    ///
    /// Structurally invalid or degenerate roofs give an empty report. Only
    /// bad dimensions and an oversized grid are errors.
    pub fn fit(&self, roof: &RoofPolygon, tile: Dimensions, gap_meters: f64) -> Result<FitReport> {
        check_positive("tile width", tile.width)?;
        check_positive("tile height", tile.height)?;
        if !gap_meters.is_finite() || gap_meters < 0.0 {
            return Err(LayoutError::InvalidDimension(format!(
                "gap must be zero or positive, got {}",
                gap_meters
            )));
        }

        if let Err(e) = roof.validate() {
            debug!(error = %e, "roof rejected, nothing to fit");
            return Ok(FitReport::default());
        }

        let bounds = match self.ops.bounding_box(roof) {
            Some(b) if !b.is_degenerate() => b,
            _ => {
                debug!("roof bounding box is degenerate, nothing to fit");
                return Ok(FitReport::default());
            }
        };

        let converter = match GeoConverter::new(bounds.mid_lat()) {
            Ok(c) if c.meters_per_degree_lng() >= MIN_METERS_PER_DEGREE => c,
            Ok(c) => {
                warn!(
                    reference_lat = c.reference_lat(),
                    "longitude scale collapses at this latitude, nothing to fit"
                );
                return Ok(FitReport::default());
            }
            Err(e) => {
                warn!(error = %e, "cannot build degree/meter conversion");
                return Ok(FitReport::default());
            }
        };

        let grid = Grid::new(&converter, tile, gap_meters);

        let estimate = grid.estimated_candidates(&bounds);
        if estimate > self.max_candidates as f64 {
            return Err(LayoutError::ExcessiveCandidateCount {
                candidates: estimate as u64,
                limit: self.max_candidates,
            });
        }

        let rows = cells_within(bounds.min_lat, bounds.max_lat + grid.tol_h, grid.tile_h, grid.step_h);
        let columns =
            cells_within(bounds.min_lng, bounds.max_lng + grid.tol_w, grid.tile_w, grid.step_w);

        debug!(
            reference_lat = converter.reference_lat(),
            meters_per_degree_lng = converter.meters_per_degree_lng(),
            rows,
            columns,
            "scanning panel grid"
        );

        let polygon = roof.to_polygon();
        let mut report = FitReport {
            rows,
            columns,
            ..Default::default()
        };

        for row in 0..rows {
            let lat = bounds.min_lat + row as f64 * grid.step_h;
            for column in 0..columns {
                let lng = bounds.min_lng + column as f64 * grid.step_w;
                let candidate = Rect::new(
                    coord! { x: lng, y: lat },
                    coord! {
                        x: (lng + grid.tile_w).min(bounds.max_lng),
                        y: (lat + grid.tile_h).min(bounds.max_lat),
                    },
                );

                match self.ops.is_fully_contained(&candidate, &polygon) {
                    Ok(true) => report.tiles.push(PlacedTile {
                        index: report.tiles.len(),
                        bounds: candidate,
                        removed: false,
                    }),
                    Ok(false) => report.rejected += 1,
                    Err(e) => {
                        warn!(row, column, error = %e, "skipping panel candidate");
                        report.failures += 1;
                    }
                }
            }
        }

        debug!(
            placed = report.tiles.len(),
            rejected = report.rejected,
            failures = report.failures,
            "fit pass complete"
        );

        Ok(report)
    }
}

/// Panel and step sizes in degrees
struct Grid {
    tile_w: f64,
    tile_h: f64,
    step_w: f64,
    step_h: f64,
    tol_w: f64,
    tol_h: f64,
}

impl Grid {
    fn new(converter: &GeoConverter, tile: Dimensions, gap: f64) -> Self {
        Self {
            tile_w: converter.meters_to_degrees_lng(tile.width),
            tile_h: converter.meters_to_degrees_lat(tile.height),
            step_w: converter.meters_to_degrees_lng(tile.width + gap),
            step_h: converter.meters_to_degrees_lat(tile.height + gap),
            tol_w: converter.meters_to_degrees_lng(EDGE_TOLERANCE_METERS),
            tol_h: converter.meters_to_degrees_lat(EDGE_TOLERANCE_METERS),
        }
    }

    /// Closed-form grid size, used to refuse huge scans before starting
    fn estimated_candidates(&self, bounds: &Bounds) -> f64 {
        let per_axis = |span: f64, size: f64, step: f64| {
            if size > span {
                0.0
            } else {
                ((span - size) / step).floor() + 1.0
            }
        };
        per_axis(bounds.width() + self.tol_w, self.tile_w, self.step_w)
            * per_axis(bounds.height() + self.tol_h, self.tile_h, self.step_h)
    }
}

/// Number of cells starting at `min` whose far edge stays within `limit`
fn cells_within(min: f64, limit: f64, size: f64, step: f64) -> usize {
    let mut n = 0;
    while min + n as f64 * step + size <= limit {
        n += 1;
    }
    n
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LayoutError::InvalidDimension(format!(
            "{} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::METERS_PER_DEGREE;

    /// Axis-aligned roof of the given size in meters, centered on (lng, lat)
    fn centered_roof(center: (f64, f64), width_m: f64, height_m: f64) -> RoofPolygon {
        let (lng, lat) = center;
        let conv = GeoConverter::new(lat).unwrap();
        let half_w = conv.meters_to_degrees_lng(width_m / 2.0);
        let half_h = height_m / 2.0 / METERS_PER_DEGREE;
        RoofPolygon::new(vec![
            (lng - half_w, lat - half_h),
            (lng + half_w, lat - half_h),
            (lng + half_w, lat + half_h),
            (lng - half_w, lat + half_h),
            (lng - half_w, lat - half_h),
        ])
        .unwrap()
    }

    fn dims(width: f64, height: f64) -> Dimensions {
        Dimensions { width, height }
    }

    /// Interiors overlap by more than rounding noise
    fn overlaps(a: &Rect<f64>, b: &Rect<f64>) -> bool {
        const EPS: f64 = 1e-12;
        a.min().x < b.max().x - EPS
            && b.min().x < a.max().x - EPS
            && a.min().y < b.max().y - EPS
            && b.min().y < a.max().y - EPS
    }

    /// Fails for every candidate west of the prime meridian
    struct WesternHalfFails;

    impl GeometryOps for WesternHalfFails {
        fn bounding_box(&self, roof: &RoofPolygon) -> Option<Bounds> {
            GeoOps.bounding_box(roof)
        }

        fn is_fully_contained(&self, candidate: &Rect<f64>, roof: &Polygon<f64>) -> Result<bool> {
            if candidate.min().x < 0.0 {
                return Err(LayoutError::GeometryCollaboratorFailure(
                    "simulated".to_string(),
                ));
            }
            GeoOps.is_fully_contained(candidate, roof)
        }

        fn area(&self, roof: &RoofPolygon) -> f64 {
            GeoOps.area(roof)
        }
    }

    #[test]
    fn test_ten_meter_square_no_gap() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 0.0).unwrap();

        let count = report.tiles.len();
        assert!((45..=50).contains(&count), "got {} tiles", count);

        let polygon = roof.to_polygon();
        for tile in &report.tiles {
            assert!(GeoOps.is_fully_contained(&tile.bounds, &polygon).unwrap());
        }
    }

    #[test]
    fn test_ten_meter_square_with_gap() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 1.0).unwrap();

        let count = report.tiles.len();
        assert!((12..=15).contains(&count), "got {} tiles", count);
    }

    #[test]
    fn test_indices_follow_scan_order() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 0.0).unwrap();

        for (i, tile) in report.tiles.iter().enumerate() {
            assert_eq!(tile.index, i);
            assert!(!tile.removed);
        }

        // Row-major: latitude never decreases, longitude increases within a row
        for pair in report.tiles.windows(2) {
            let (a, b) = (pair[0].bounds.min(), pair[1].bounds.min());
            assert!(b.y > a.y || (b.y == a.y && b.x > a.x));
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let roof = centered_roof((151.2093, -33.8688), 12.5, 7.3);
        let fitter = GridFitter::new();
        let first = fitter.fit(&roof, dims(1.722, 1.040), 0.02).unwrap();
        let second = fitter.fit(&roof, dims(1.722, 1.040), 0.02).unwrap();

        assert!(!first.tiles.is_empty());
        assert_eq!(first.tiles, second.tiles);
    }

    #[test]
    fn test_tiles_do_not_overlap() {
        let roof = centered_roof((-0.1276, 51.5072), 15.0, 9.0);
        let report = GridFitter::new().fit(&roof, dims(1.040, 1.722), 0.0).unwrap();

        assert!(report.tiles.len() > 10);
        for (i, a) in report.tiles.iter().enumerate() {
            for b in &report.tiles[i + 1..] {
                assert!(!overlaps(&a.bounds, &b.bounds));
            }
        }
    }

    #[test]
    fn test_larger_gap_never_adds_tiles() {
        let roof = centered_roof((-122.4194, 37.7749), 11.3, 6.7);
        let fitter = GridFitter::new();

        let mut previous = usize::MAX;
        for gap in [0.0, 0.01, 0.02, 0.05, 0.1, 0.3, 0.5, 1.0] {
            let count = fitter.fit(&roof, dims(1.722, 1.040), gap).unwrap().tiles.len();
            assert!(count <= previous, "gap {} gave {} > {}", gap, count, previous);
            previous = count;
        }
    }

    #[test]
    fn test_mid_latitude_grid() {
        // At 51.5N a degree of longitude is ~69 km, so the degree grid must be rescaled
        let roof = centered_roof((-0.1276, 51.5072), 20.5, 10.5);
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 0.0).unwrap();

        let count = report.tiles.len();
        assert!((90..=100).contains(&count), "got {} tiles", count);
    }

    #[test]
    fn test_concave_roof_skips_notch() {
        // 10m x 10m L-shape with the north-east 5m x 5m quadrant missing
        let d = 5.0 / METERS_PER_DEGREE;
        let roof = RoofPolygon::new(vec![
            (-d, -d),
            (d, -d),
            (d, 0.0),
            (0.0, 0.0),
            (0.0, d),
            (-d, d),
            (-d, -d),
        ])
        .unwrap();

        let report = GridFitter::new().fit(&roof, dims(1.0, 1.0), 0.0).unwrap();
        let count = report.tiles.len();
        assert!((55..=75).contains(&count), "got {} tiles", count);
        assert_eq!(report.tiles.len() + report.rejected, report.candidates());

        let polygon = roof.to_polygon();
        for tile in &report.tiles {
            assert!(GeoOps.is_fully_contained(&tile.bounds, &polygon).unwrap());
        }
    }

    #[test]
    fn test_degenerate_roof_gives_empty_batch() {
        let roof = RoofPolygon::new(vec![(10.0, 10.0); 4]).unwrap();
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 0.0).unwrap();
        assert!(report.tiles.is_empty());
    }

    #[test]
    fn test_collinear_roof_gives_empty_batch() {
        let roof = RoofPolygon::new(vec![(0.0, 0.0), (0.001, 0.0), (0.002, 0.0), (0.0, 0.0)])
            .unwrap();
        let report = GridFitter::new().fit(&roof, dims(1.0, 1.0), 0.0).unwrap();
        assert!(report.tiles.is_empty());
    }

    #[test]
    fn test_tile_larger_than_roof() {
        let roof = centered_roof((0.0, 0.0), 1.5, 1.5);
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 0.0).unwrap();
        assert!(report.tiles.is_empty());
        assert_eq!(report.columns, 0);
    }

    #[test]
    fn test_polar_roof_gives_empty_batch() {
        let roof = RoofPolygon::new(vec![
            (0.0, 89.9999999),
            (1.0, 89.9999999),
            (1.0, 90.0),
            (0.0, 90.0),
            (0.0, 89.9999999),
        ])
        .unwrap();
        let report = GridFitter::new().fit(&roof, dims(0.5, 0.5), 0.0).unwrap();
        assert!(report.tiles.is_empty());
    }

    #[test]
    fn test_containment_failure_skips_candidate() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let fitter = GridFitter::with_ops(WesternHalfFails);
        let report = fitter.fit(&roof, dims(2.0, 1.0), 0.0).unwrap();

        assert!(report.failures > 0);
        assert!(!report.tiles.is_empty());
        assert!(report.tiles.iter().all(|t| t.bounds.min().x >= 0.0));
        assert_eq!(
            report.tiles.len() + report.rejected + report.failures,
            report.candidates()
        );
        // Indices stay contiguous when candidates are skipped
        for (i, tile) in report.tiles.iter().enumerate() {
            assert_eq!(tile.index, i);
        }
    }

    #[test]
    fn test_excessive_candidates() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let result = GridFitter::new().fit(&roof, dims(0.01, 0.01), 0.0);
        assert!(matches!(
            result,
            Err(LayoutError::ExcessiveCandidateCount { limit: 100_000, .. })
        ));

        let result = GridFitter::new()
            .with_max_candidates(10)
            .fit(&roof, dims(2.0, 1.0), 0.0);
        assert!(matches!(
            result,
            Err(LayoutError::ExcessiveCandidateCount { limit: 10, .. })
        ));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let fitter = GridFitter::new();
        assert!(fitter.fit(&roof, dims(0.0, 1.0), 0.0).is_err());
        assert!(fitter.fit(&roof, dims(1.0, 1.0), -1.0).is_err());
        assert!(fitter.fit(&roof, dims(1.0, 1.0), f64::NAN).is_err());
    }

    #[test]
    fn test_ring_is_closed() {
        let roof = centered_roof((0.0, 0.0), 10.0, 10.0);
        let report = GridFitter::new().fit(&roof, dims(2.0, 1.0), 0.0).unwrap();
        let ring = report.tiles[0].ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(report.tiles[0].to_polygon().exterior().0.len(), 5);
    }
}
