pub mod roof;
pub mod tile;
pub mod units;

pub use roof::RoofPolygon;
pub use tile::{Dimensions, Orientation, PanelPreset, TileSize, TileSpec, resolve};
pub use units::UnitSystem;
