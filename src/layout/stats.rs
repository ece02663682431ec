//! Headline energy and area figures for a layout
//!
//! The constants are rough, conservative global defaults. Real output
//! depends on location, roof pitch and azimuth, shading, panel efficiency
//! and the local grid mix.

use serde::Serialize;

use crate::domain::Dimensions;

/// Equivalent full-sun hours per day
pub const PEAK_SUN_HOURS_PER_DAY: f64 = 3.5;
/// Share of nameplate output left after inverter, wiring and soiling losses
pub const PERFORMANCE_RATIO: f64 = 0.75;
/// Grid emissions displaced per kWh generated
pub const CO2_KG_PER_KWH: f64 = 0.20;
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Capacity and yearly yield for a number of panels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Estimate {
    pub capacity_kw: f64,
    pub annual_output_kwh: f64,
    pub co2_avoided_tonnes: f64,
}

/// Estimate output for `active_count` panels of `watts_per_tile` each
///
/// Non-positive or non-finite wattage yields zeros.
pub fn estimate(active_count: usize, watts_per_tile: f64) -> Estimate {
    if !watts_per_tile.is_finite() || watts_per_tile <= 0.0 {
        return Estimate::default();
    }

    let capacity_kw = active_count as f64 * watts_per_tile / 1000.0;
    let annual_output_kwh =
        capacity_kw * PEAK_SUN_HOURS_PER_DAY * DAYS_PER_YEAR * PERFORMANCE_RATIO;
    let co2_avoided_tonnes = annual_output_kwh * CO2_KG_PER_KWH / 1000.0;

    Estimate {
        capacity_kw,
        annual_output_kwh,
        co2_avoided_tonnes,
    }
}

/// Summary of a fitted layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    /// Panels not removed by the user
    pub active_count: usize,
    /// All panels in the batch, removed or not
    pub total_count: usize,
    pub roof_area_sq_meters: f64,
    /// Footprint covered by active panels
    pub panel_area_sq_meters: f64,
    pub capacity_kw: f64,
    pub annual_output_kwh: f64,
    pub co2_avoided_tonnes: f64,
}

impl Stats {
    pub fn new(
        active_count: usize,
        total_count: usize,
        tile: Dimensions,
        watts_per_tile: f64,
        roof_area_sq_meters: f64,
    ) -> Self {
        let Estimate {
            capacity_kw,
            annual_output_kwh,
            co2_avoided_tonnes,
        } = estimate(active_count, watts_per_tile);

        Self {
            active_count,
            total_count,
            roof_area_sq_meters,
            panel_area_sq_meters: active_count as f64 * tile.area(),
            capacity_kw,
            annual_output_kwh,
            co2_avoided_tonnes,
        }
    }

    /// Share of the roof covered by active panels, in percent
    pub fn coverage_percentage(&self) -> f64 {
        if self.roof_area_sq_meters > 0.0 {
            self.panel_area_sq_meters / self.roof_area_sq_meters * 100.0
        } else {
            0.0
        }
    }
}
