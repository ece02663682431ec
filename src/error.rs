/// Errors raised by the layout engine
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Reference latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("Tile index {index} is out of range for a batch of {len} tiles")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Geometry collaborator failed: {0}")]
    GeometryCollaboratorFailure(String),

    #[error("Grid would need {candidates} candidate tiles (limit {limit}); use a larger tile or a smaller roof")]
    ExcessiveCandidateCount { candidates: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
