use serde::Serialize;

use super::{LayoutConfig, LayoutSession, Stats};
use crate::geometry::GeometryOps;

/// One active panel as a closed [lng, lat] ring
#[derive(Debug, Clone, Serialize)]
pub struct PanelRing {
    pub index: usize,
    pub ring: Vec<[f64; 2]>,
}

/// Serializable snapshot of a fitted session
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub config: LayoutConfig,
    pub stats: Stats,
    pub roof: Vec<[f64; 2]>,
    pub removed: Vec<usize>,
    pub panels: Vec<PanelRing>,
}

impl LayoutReport {
    /// Snapshot the session, `None` if nothing has been fitted
    pub fn from_session<G: GeometryOps>(session: &LayoutSession<G>) -> Option<Self> {
        let config = *session.config()?;
        let stats = session.stats()?;
        let roof = session
            .roof()?
            .ring()
            .iter()
            .map(|&(lng, lat)| [lng, lat])
            .collect();

        let panels = session
            .active_tiles()
            .map(|tile| PanelRing {
                index: tile.index,
                ring: tile.ring().into_iter().map(|(lng, lat)| [lng, lat]).collect(),
            })
            .collect();

        Some(Self {
            config,
            stats,
            roof,
            removed: session.removed_indices().iter().copied().collect(),
            panels,
        })
    }
}
