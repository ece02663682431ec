use serde::{Deserialize, Serialize};

use super::units::UnitSystem;
use crate::error::{LayoutError, Result};

/// Common panel sizes, stored as (long edge, short edge) in meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PanelPreset {
    /// UK / AU / NZ standard, 1.722 x 1.040 m
    #[default]
    Standard,
    /// US standard, 1.651 x 0.991 m
    Us,
    /// Large format, 2.000 x 1.052 m
    Large,
    /// User-supplied dimensions
    Custom,
}

impl PanelPreset {
    /// Stored dimensions, `None` for [`PanelPreset::Custom`]
    pub fn dimensions(self) -> Option<(f64, f64)> {
        match self {
            PanelPreset::Standard => Some((1.722, 1.040)),
            PanelPreset::Us => Some((1.651, 0.991)),
            PanelPreset::Large => Some((2.000, 1.052)),
            PanelPreset::Custom => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelPreset::Standard => "Standard UK / AU / NZ (1.72 x 1.04 m)",
            PanelPreset::Us => "US Standard (1.65 x 0.99 m)",
            PanelPreset::Large => "Large Format (2.00 x 1.05 m)",
            PanelPreset::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Stored dimensions as-is
    #[default]
    Portrait,
    /// Rotated 90 degrees: width and height swapped
    Landscape,
}

impl Orientation {
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

/// How the panel size was chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileSize {
    Preset(PanelPreset),
    /// Raw width and height in the given unit system
    Custom {
        width: Option<f64>,
        height: Option<f64>,
        units: UnitSystem,
    },
}

impl TileSize {
    /// Normalize to (width, height) in meters before orientation
    ///
    /// Missing custom values fall back to the standard panel, expressed in
    /// the caller's units (67.8 x 40.9 in for imperial).
    pub fn to_meters(self) -> (f64, f64) {
        match self {
            TileSize::Preset(PanelPreset::Custom) => (1.722, 1.040),
            TileSize::Preset(preset) => preset.dimensions().unwrap_or((1.722, 1.040)),
            TileSize::Custom {
                width,
                height,
                units,
            } => {
                let (default_w, default_h) = match units {
                    UnitSystem::Metric => (1.722, 1.040),
                    UnitSystem::Imperial => (67.8, 40.9),
                };
                (
                    units.length_to_meters(width.unwrap_or(default_w)),
                    units.length_to_meters(height.unwrap_or(default_h)),
                )
            }
        }
    }
}

/// Physical panel dimensions plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    /// Stored width in meters (the long edge for standard panels)
    pub width: f64,
    /// Stored height in meters
    pub height: f64,
    pub orientation: Orientation,
}

impl TileSpec {
    pub fn new(width: f64, height: f64, orientation: Orientation) -> Self {
        Self {
            width,
            height,
            orientation,
        }
    }

    pub fn from_size(size: TileSize, orientation: Orientation) -> Self {
        let (width, height) = size.to_meters();
        Self::new(width, height, orientation)
    }

    /// Same panel turned by 90 degrees
    pub fn rotated(self) -> Self {
        Self {
            orientation: self.orientation.rotated(),
            ..self
        }
    }
}

/// Effective footprint of a panel on the roof, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Resolve the footprint used for grid placement
///
/// Portrait keeps the stored (width, height); landscape swaps them.
pub fn resolve(spec: &TileSpec) -> Result<Dimensions> {
    let (width, height) = match spec.orientation {
        Orientation::Portrait => (spec.width, spec.height),
        Orientation::Landscape => (spec.height, spec.width),
    };

    for (name, value) in [("width", width), ("height", height)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(LayoutError::InvalidDimension(format!(
                "tile {} must be positive and finite, got {}",
                name, value
            )));
        }
    }

    Ok(Dimensions { width, height })
}
