pub mod fitter;
pub mod report;
pub mod session;
pub mod stats;

pub use fitter::{DEFAULT_MAX_CANDIDATES, FitReport, GridFitter, PlacedTile};
pub use report::{LayoutReport, PanelRing};
pub use session::{LayoutSession, SessionState};
pub use stats::{Estimate, Stats, estimate};

use serde::Serialize;

use crate::domain::{Dimensions, TileSpec, resolve};
use crate::error::{LayoutError, Result};

pub const DEFAULT_GAP_MM: f64 = 20.0;
pub const DEFAULT_WATTS: f64 = 400.0;

/// Inputs for one fit pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub tile: TileSpec,
    /// Spacing between neighbouring panels, in meters
    pub gap_meters: f64,
    pub watts_per_tile: f64,
}

impl LayoutConfig {
    pub fn new(tile: TileSpec, gap_meters: f64, watts_per_tile: f64) -> Self {
        Self {
            tile,
            gap_meters,
            watts_per_tile,
        }
    }

    /// Check all fields and return the effective tile footprint
    pub fn validate(&self) -> Result<Dimensions> {
        let dims = resolve(&self.tile)?;

        if !self.gap_meters.is_finite() || self.gap_meters < 0.0 {
            return Err(LayoutError::InvalidDimension(format!(
                "gap must be zero or positive, got {}",
                self.gap_meters
            )));
        }

        validate_watts(self.watts_per_tile)?;

        Ok(dims)
    }
}

pub(crate) fn validate_watts(watts: f64) -> Result<()> {
    if !watts.is_finite() || watts <= 0.0 {
        return Err(LayoutError::InvalidDimension(format!(
            "watts per panel must be positive, got {}",
            watts
        )));
    }
    Ok(())
}
