pub mod bounds;
pub mod ops;
pub mod projection;

pub use bounds::Bounds;
pub use ops::{GeoOps, GeometryOps};
pub use projection::{GeoConverter, METERS_PER_DEGREE};
