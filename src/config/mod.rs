use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{Orientation, PanelPreset, TileSize, TileSpec, UnitSystem};
use crate::layout::{DEFAULT_GAP_MM, DEFAULT_MAX_CANDIDATES, DEFAULT_WATTS, LayoutConfig};

fn default_gap_mm() -> f64 {
    DEFAULT_GAP_MM
}
fn default_watts() -> f64 {
    DEFAULT_WATTS
}
fn default_max_candidates() -> u64 {
    DEFAULT_MAX_CANDIDATES
}
fn default_verbose() -> bool {
    false
}

/// Settings read from `roofgrid.toml`
///
/// ```toml
/// roof = [[151.2093, -33.8688], [151.2094, -33.8688], [151.2094, -33.8687]]
/// preset = "standard"
/// orientation = "landscape"
/// gap_mm = 20
/// watts = 420
/// removed = [3, 7]
/// ```
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    /// Roof outline as [lng, lat] pairs
    #[serde(default)]
    pub roof: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub preset: PanelPreset,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "default_gap_mm")]
    pub gap_mm: f64,
    #[serde(default = "default_watts")]
    pub watts: f64,
    #[serde(default)]
    pub units: UnitSystem,
    /// Custom panel width, in meters or inches depending on `units`
    #[serde(default)]
    pub custom_width: Option<f64>,
    #[serde(default)]
    pub custom_height: Option<f64>,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u64,
    /// Panel indices to mark removed after fitting
    #[serde(default)]
    pub removed: Vec<usize>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            roof: None,
            preset: PanelPreset::default(),
            orientation: Orientation::default(),
            gap_mm: default_gap_mm(),
            watts: default_watts(),
            units: UnitSystem::default(),
            custom_width: None,
            custom_height: None,
            max_candidates: default_max_candidates(),
            removed: Vec::new(),
            output: None,
            verbose: default_verbose(),
        }
    }
}

impl FileConfig {
    /// Search the default locations, returning the first config that parses
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(config) => return Some(config),
                Err(e) => {
                    eprintln!("Warning: {:#}", e);
                }
            }
        }
        None
    }

    /// Read and parse a specific config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn tile_size(&self) -> TileSize {
        match self.preset {
            PanelPreset::Custom => TileSize::Custom {
                width: self.custom_width,
                height: self.custom_height,
                units: self.units,
            },
            preset => TileSize::Preset(preset),
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig::new(
            TileSpec::from_size(self.tile_size(), self.orientation),
            self.gap_mm / 1000.0,
            self.watts,
        )
    }

    /// Roof ring as (lng, lat) tuples
    pub fn roof_ring(&self) -> Option<Vec<(f64, f64)>> {
        self.roof
            .as_ref()
            .map(|points| points.iter().map(|&[lng, lat]| (lng, lat)).collect())
    }
}

/// Parse a roof outline written as `lng,lat` pairs separated by spaces or `;`
///
/// `"151.2093,-33.8688 151.2094,-33.8688; 151.2094,-33.8687"`
pub fn parse_coordinates(input: &str) -> Result<Vec<(f64, f64)>> {
    input
        .split(|c: char| c.is_whitespace() || c == ';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<(f64, f64)> {
            let (lng, lat) = pair
                .split_once(',')
                .with_context(|| format!("Expected lng,lat but got {:?}", pair))?;
            let lng: f64 = lng
                .trim()
                .parse()
                .with_context(|| format!("Invalid longitude in {:?}", pair))?;
            let lat: f64 = lat
                .trim()
                .parse()
                .with_context(|| format!("Invalid latitude in {:?}", pair))?;
            Ok((lng, lat))
        })
        .collect()
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("roofgrid.toml"));
    paths.push(PathBuf::from(".roofgrid.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("roofgrid").join("config.toml"));
        paths.push(config_dir.join("roofgrid.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".roofgrid.toml"));
        paths.push(home.join(".config").join("roofgrid").join("config.toml"));
    }

    paths
}
