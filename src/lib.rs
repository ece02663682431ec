//! roofgrid - Fit solar panel grids inside roof outlines

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod layout;

pub use domain::{Orientation, PanelPreset, RoofPolygon, TileSize, TileSpec, UnitSystem};
pub use error::{LayoutError, Result};
pub use layout::{LayoutConfig, LayoutSession, PlacedTile, SessionState, Stats};
