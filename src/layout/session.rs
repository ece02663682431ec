use std::collections::BTreeSet;

use tracing::debug;

use super::fitter::{GridFitter, PlacedTile};
use super::stats::Stats;
use super::{LayoutConfig, validate_watts};
use crate::domain::{Dimensions, RoofPolygon};
use crate::error::{LayoutError, Result};
use crate::geometry::{GeoOps, GeometryOps};

/// Lifecycle of a [`LayoutSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing fitted yet, or cleared
    Empty,
    /// Fitted with every panel active
    Fitted,
    /// Fitted with at least one panel removed
    FittedWithRemovals,
}

/// A roof, its current panel batch and the user's removals
///
/// Calls must be serialized by the owner; the session has no interior locking.
#[derive(Debug, Clone)]
pub struct LayoutSession<G = GeoOps> {
    fitter: GridFitter<G>,
    roof: Option<RoofPolygon>,
    config: Option<LayoutConfig>,
    tile: Option<Dimensions>,
    tiles: Vec<PlacedTile>,
    removed: BTreeSet<usize>,
}

impl LayoutSession<GeoOps> {
    pub fn new() -> Self {
        Self::with_fitter(GridFitter::new())
    }
}

impl Default for LayoutSession<GeoOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GeometryOps> LayoutSession<G> {
    pub fn with_fitter(fitter: GridFitter<G>) -> Self {
        Self {
            fitter,
            roof: None,
            config: None,
            tile: None,
            tiles: Vec::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Replace the batch with a fresh fit of `roof` under `config`
    ///
    /// With `preserve_removals`, removed indices that still exist in the new
    /// batch stay removed. This matches by index, not by position on the
    /// roof, so after a grid change a removal can land on a different panel.
    ///
    /// On error the session is left unchanged. Returns the batch size.
    pub fn fit(
        &mut self,
        roof: RoofPolygon,
        config: LayoutConfig,
        preserve_removals: bool,
    ) -> Result<usize> {
        let tile = config.validate()?;
        let report = self.fitter.fit(&roof, tile, config.gap_meters)?;

        self.roof = Some(roof);
        self.config = Some(config);
        self.tile = Some(tile);
        self.tiles = report.tiles;

        if preserve_removals {
            let len = self.tiles.len();
            self.removed.retain(|&i| i < len);
        } else {
            self.removed.clear();
        }
        for &i in &self.removed {
            self.tiles[i].removed = true;
        }

        debug!(
            tiles = self.tiles.len(),
            removed = self.removed.len(),
            preserve_removals,
            "session fitted"
        );

        Ok(self.tiles.len())
    }

    /// Re-fit the current roof with a new configuration
    pub fn refit(&mut self, config: LayoutConfig, preserve_removals: bool) -> Result<usize> {
        let roof = self.roof.clone().ok_or_else(|| {
            LayoutError::PreconditionFailed("no roof has been fitted".to_string())
        })?;
        self.fit(roof, config, preserve_removals)
    }

    /// Change panel wattage without touching the batch
    pub fn set_watts_per_tile(&mut self, watts: f64) -> Result<()> {
        validate_watts(watts)?;
        let config = self.config.as_mut().ok_or_else(|| {
            LayoutError::PreconditionFailed("no layout has been fitted".to_string())
        })?;
        config.watts_per_tile = watts;
        Ok(())
    }

    /// Flip a panel between active and removed, returning its new state
    pub fn toggle_removed(&mut self, index: usize) -> Result<bool> {
        let len = self.tiles.len();
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(LayoutError::IndexOutOfRange { index, len })?;

        tile.removed = !tile.removed;
        if tile.removed {
            self.removed.insert(index);
        } else {
            self.removed.remove(&index);
        }

        debug!(index, removed = tile.removed, "panel toggled");
        Ok(tile.removed)
    }

    /// Mark previously saved indices as removed, skipping any outside the batch
    ///
    /// Returns how many indices were applied.
    pub fn restore_removed<I>(&mut self, indices: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let mut applied = 0;
        for index in indices {
            match self.tiles.get_mut(index) {
                Some(tile) => {
                    tile.removed = true;
                    if self.removed.insert(index) {
                        applied += 1;
                    }
                }
                None => debug!(index, "ignoring saved removal outside the batch"),
            }
        }
        applied
    }

    /// Panels not removed, in index order. Recomputed on every call.
    pub fn active_tiles(&self) -> impl Iterator<Item = &PlacedTile> + '_ {
        self.tiles.iter().filter(|t| !t.removed)
    }

    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn removed_indices(&self) -> &BTreeSet<usize> {
        &self.removed
    }

    pub fn roof(&self) -> Option<&RoofPolygon> {
        self.roof.as_ref()
    }

    pub fn config(&self) -> Option<&LayoutConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> SessionState {
        if self.roof.is_none() {
            SessionState::Empty
        } else if self.removed.is_empty() {
            SessionState::Fitted
        } else {
            SessionState::FittedWithRemovals
        }
    }

    /// Headline figures, `None` until something has been fitted
    pub fn stats(&self) -> Option<Stats> {
        let (roof, config, tile) = match (&self.roof, &self.config, self.tile) {
            (Some(r), Some(c), Some(t)) => (r, c, t),
            _ => return None,
        };

        Some(Stats::new(
            self.active_tiles().count(),
            self.tiles.len(),
            tile,
            config.watts_per_tile,
            self.fitter.ops().area(roof),
        ))
    }

    /// Drop everything and return to [`SessionState::Empty`]
    pub fn clear(&mut self) {
        self.roof = None;
        self.config = None;
        self.tile = None;
        self.tiles.clear();
        self.removed.clear();
        debug!("session cleared");
    }
}
