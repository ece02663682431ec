/// Axis-aligned bounding box in geographic degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Create bounds from a set of (lng, lat) points
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;

        for &(lng, lat) in points {
            min_lng = min_lng.min(lng);
            max_lng = max_lng.max(lng);
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
        }

        Some(Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Latitude halfway between the southern and northern edges
    pub fn mid_lat(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }

    /// True when the box has no extent along either axis
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

impl From<geo::Rect<f64>> for Bounds {
    fn from(rect: geo::Rect<f64>) -> Self {
        Self {
            min_lng: rect.min().x,
            min_lat: rect.min().y,
            max_lng: rect.max().x,
            max_lat: rect.max().y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let points = vec![(0.0, 0.0), (1.0, 2.0), (0.5, 1.0)];
        let bounds = Bounds::from_points(&points).unwrap();

        assert_eq!(bounds.min_lng, 0.0);
        assert_eq!(bounds.max_lng, 1.0);
        assert_eq!(bounds.min_lat, 0.0);
        assert_eq!(bounds.max_lat, 2.0);
        assert_eq!(bounds.mid_lat(), 1.0);
        assert!(!bounds.is_degenerate());
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let bounds = Bounds::from_points(&[(151.2, -33.8), (151.2, -33.8)]).unwrap();
        assert!(bounds.is_degenerate());
    }

    #[test]
    fn test_from_rect() {
        let rect = geo::Rect::new(geo::coord! { x: 2.0, y: 1.0 }, geo::coord! { x: 0.0, y: 3.0 });
        let bounds = Bounds::from(rect);
        assert_eq!(bounds.min_lng, 0.0);
        assert_eq!(bounds.max_lat, 3.0);
    }
}
