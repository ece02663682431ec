use geo::{Coord, LineString, Polygon};

use crate::error::{LayoutError, Result};

/// Roof outline as a ring of (lng, lat) pairs in WGS84
#[derive(Debug, Clone, PartialEq)]
pub struct RoofPolygon {
    ring: Vec<(f64, f64)>,
}

impl RoofPolygon {
    /// Wrap a ring as given. The ring is not closed or reordered.
    pub fn new(ring: Vec<(f64, f64)>) -> Result<Self> {
        if ring.is_empty() {
            return Err(LayoutError::PreconditionFailed(
                "roof polygon has no coordinates".to_string(),
            ));
        }

        if ring.iter().any(|&(lng, lat)| !lng.is_finite() || !lat.is_finite()) {
            return Err(LayoutError::PreconditionFailed(
                "roof polygon contains non-finite coordinates".to_string(),
            ));
        }

        Ok(Self { ring })
    }

    /// Like [`RoofPolygon::new`], appending the first point if the ring is open
    pub fn closed(mut ring: Vec<(f64, f64)>) -> Result<Self> {
        if let (Some(&first), Some(&last)) = (ring.first(), ring.last())
            && first != last
        {
            ring.push(first);
        }
        Self::new(ring)
    }

    pub fn ring(&self) -> &[(f64, f64)] {
        &self.ring
    }

    pub fn is_closed(&self) -> bool {
        self.ring.len() > 1 && self.ring.first() == self.ring.last()
    }

    /// Number of distinct vertices, ignoring the closing point
    pub fn distinct_vertices(&self) -> usize {
        let mut seen: Vec<(f64, f64)> = Vec::with_capacity(self.ring.len());
        for &point in &self.ring {
            if !seen.contains(&point) {
                seen.push(point);
            }
        }
        seen.len()
    }

    /// Check the ring is usable for fitting
    ///
    /// Requires a closed ring with at least 4 entries, 3 distinct vertices,
    /// and latitudes within [-90, 90].
    pub fn validate(&self) -> Result<()> {
        if !self.is_closed() {
            return Err(LayoutError::InvalidPolygon(
                "ring is not closed".to_string(),
            ));
        }

        if self.ring.len() < 4 || self.distinct_vertices() < 3 {
            return Err(LayoutError::InvalidPolygon(format!(
                "need at least 3 distinct vertices, got {}",
                self.distinct_vertices()
            )));
        }

        if let Some(&(_, lat)) = self.ring.iter().find(|(_, lat)| lat.abs() > 90.0) {
            return Err(LayoutError::InvalidPolygon(format!(
                "latitude {} is out of range",
                lat
            )));
        }

        Ok(())
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self
            .ring
            .iter()
            .map(|&(lng, lat)| Coord { x: lng, y: lat })
            .collect();
        Polygon::new(exterior, vec![])
    }
}
