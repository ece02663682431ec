use serde::{Deserialize, Serialize};

pub const METERS_PER_INCH: f64 = 0.0254;
pub const SQ_FEET_PER_SQ_METER: f64 = 10.764;

/// Measurement system used for custom panel input and area display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Custom dimensions in meters, area in m²
    #[default]
    Metric,
    /// Custom dimensions in inches, area in ft²
    Imperial,
}

impl UnitSystem {
    /// Convert a custom panel length entered in this system to meters
    pub fn length_to_meters(self, value: f64) -> f64 {
        match self {
            UnitSystem::Metric => value,
            UnitSystem::Imperial => value * METERS_PER_INCH,
        }
    }

    /// Format an area given in square meters for display
    pub fn format_area(self, sq_meters: f64) -> String {
        match self {
            UnitSystem::Metric => format!("{:.1} m²", sq_meters),
            UnitSystem::Imperial => format!("{:.0} ft²", sq_meters * SQ_FEET_PER_SQ_METER),
        }
    }
}
