use crate::error::{LayoutError, Result};

/// Meters per degree of latitude on a spherical Earth
pub const METERS_PER_DEGREE: f64 = 111320.0;

/// Degree/meter conversion around a single reference latitude
///
/// Uses a locally flat tangent-plane approximation:
/// - 1 degree latitude = 111320 m everywhere
/// - 1 degree longitude = 111320 m * cos(reference latitude)
///
/// The longitude scale is only exact at the reference latitude, so this is
/// accurate for roof-scale areas (a few hundred meters across). Larger
/// polygons need per-row rescaling or a real projection.
#[derive(Debug, Clone, Copy)]
pub struct GeoConverter {
    reference_lat: f64,
    cos_lat: f64,
}

impl GeoConverter {
    /// Create a converter for the given reference latitude in degrees
    pub fn new(reference_lat: f64) -> Result<Self> {
        if !reference_lat.is_finite() || !(-90.0..=90.0).contains(&reference_lat) {
            return Err(LayoutError::InvalidLatitude(reference_lat));
        }

        Ok(Self {
            reference_lat,
            cos_lat: reference_lat.to_radians().cos(),
        })
    }

    pub fn reference_lat(&self) -> f64 {
        self.reference_lat
    }

    pub fn meters_per_degree_lat(&self) -> f64 {
        METERS_PER_DEGREE
    }

    /// Approaches zero towards the poles; callers must guard divisions
    pub fn meters_per_degree_lng(&self) -> f64 {
        METERS_PER_DEGREE * self.cos_lat
    }

    pub fn meters_to_degrees_lat(&self, meters: f64) -> f64 {
        meters / self.meters_per_degree_lat()
    }

    pub fn meters_to_degrees_lng(&self, meters: f64) -> f64 {
        meters / self.meters_per_degree_lng()
    }

    pub fn degrees_lat_to_meters(&self, degrees: f64) -> f64 {
        degrees * self.meters_per_degree_lat()
    }

    pub fn degrees_lng_to_meters(&self, degrees: f64) -> f64 {
        degrees * self.meters_per_degree_lng()
    }
}
