use serde::{Deserialize, Serialize};

use crate::config::{HISTORY_DEPTH, PipelineConfig};
use crate::cull::frustum::Frustum;
use crate::cull::grid::SpatialGrid;
use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::fixed::Fx;
use crate::foundation::matrix::Mat4;
use crate::scene::camera::Camera;
use crate::scene::splat::Splat3D;

/// History bits of a splat visible on each of the last [`HISTORY_DEPTH`] frames.
const ALWAYS_VISIBLE: u8 = u8::MAX >> (u8::BITS - HISTORY_DEPTH);

/// Per-frame outcome for one splat. Reset to `Untested` at the start of every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CullState {
    /// Not reached this frame (not yet culled, or dropped from a full grid cell).
    #[default]
    Untested,
    /// Its whole grid cell was outside the frustum.
    CellRejected,
    /// The cell passed but the splat's own sphere test failed.
    SplatRejected,
    /// The splat passed its sphere test.
    SplatVisible,
}

/// Counters for one culled frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CullStats {
    /// Non-empty cells tested against the frustum.
    pub cells_tested: u32,
    /// Non-empty cells rejected as a whole.
    pub cells_rejected: u32,
    /// Splats tested individually.
    pub splats_tested: u32,
    /// Splats whose individual test failed (including those kept by history).
    pub splats_rejected: u32,
    /// Splats written to the visible list.
    pub visible: u32,
    /// Visible splats that failed the test but were kept by their history.
    pub temporal_kept: u32,
    /// Splats never tested because their grid cell was full.
    pub grid_dropped: u32,
}

/// Grid-accelerated frustum culler with a rolling [`HISTORY_DEPTH`]-frame visibility history.
#[derive(Debug)]
pub struct FrustumCuller {
    grid: Option<SpatialGrid>,
    history: Vec<u8>,
    states: Vec<CullState>,
    frustum: Option<(Mat4, Frustum)>,
    padding: Fx,
    temporal: bool,
    frame: u32,
}

impl FrustumCuller {
    /// Culler with the given grid padding, optionally keeping recently stable splats.
    pub fn new(grid_padding: f32, temporal_visibility: bool) -> Self {
        Self {
            grid: None,
            history: Vec::new(),
            states: Vec::new(),
            frustum: None,
            padding: Fx::from_f32(grid_padding),
            temporal: temporal_visibility,
            frame: 0,
        }
    }

    /// Culler configured from the pipeline settings.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(cfg.grid_padding, cfg.temporal_visibility)
    }

    /// Build the spatial grid for `splats` and clear all history.
    pub fn rebuild_grid(&mut self, splats: &[Splat3D]) -> SplatResult<()> {
        let grid = SpatialGrid::build(splats, self.padding)?;
        self.grid = Some(grid);
        self.history.clear();
        self.history.resize(splats.len(), 0);
        self.states.clear();
        self.states.resize(splats.len(), CullState::Untested);
        Ok(())
    }

    /// Drop the grid, history and cached planes. The next frame rebuilds.
    pub fn reset(&mut self) {
        self.grid = None;
        self.history.clear();
        self.states.clear();
        self.frustum = None;
        self.frame = 0;
    }

    /// Rolling visibility per splat; bit 0 is the most recent frame.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// Outcome of the last culled frame per splat.
    pub fn states(&self) -> &[CullState] {
        &self.states
    }

    /// Grid built for the current scene, if any.
    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    fn frustum_for(&mut self, vp: Mat4) -> Frustum {
        match self.frustum {
            Some((cached, f)) if cached == vp => f,
            _ => {
                let f = Frustum::from_view_projection(&vp);
                self.frustum = Some((vp, f));
                f
            }
        }
    }

    /// Write the indices of potentially visible splats into `visible`, ascending.
    ///
    /// The grid is built on first use and rebuilt when the splat count changes.
    #[tracing::instrument(level = "debug", skip_all, fields(splats = splats.len()))]
    pub fn cull(
        &mut self,
        splats: &[Splat3D],
        camera: &Camera,
        visible: &mut Vec<u32>,
    ) -> SplatResult<CullStats> {
        if splats.is_empty() {
            return Err(SplatError::invalid("cull called with zero splats"));
        }
        if self.grid.as_ref().map(SpatialGrid::splat_count) != Some(splats.len()) {
            self.rebuild_grid(splats)?;
        }
        let frustum = self.frustum_for(camera.view_projection());
        self.frame = self.frame.wrapping_add(1);
        let frame = self.frame;
        let temporal = self.temporal;

        visible.clear();
        self.states.fill(CullState::Untested);
        let Self {
            grid,
            history,
            states,
            ..
        } = self;
        let Some(grid) = grid.as_mut() else {
            return Err(SplatError::invalid("spatial grid missing after rebuild"));
        };
        let mut stats = CullStats {
            grid_dropped: grid.dropped() as u32,
            ..CullStats::default()
        };

        for ci in 0..grid.cells().len() {
            let cell = &grid.cells()[ci];
            if cell.members.is_empty() {
                continue;
            }
            stats.cells_tested += 1;
            let pass = frustum.intersects_aabb(cell.min, cell.max, cell.max_radius);
            if !pass {
                stats.cells_rejected += 1;
                for &i in cell.members.as_slice() {
                    states[i as usize] = CullState::CellRejected;
                }
                grid.cells_mut()[ci].visible = false;
                continue;
            }

            for &i in cell.members.as_slice() {
                let i = i as usize;
                stats.splats_tested += 1;
                let hit = frustum.intersects_sphere(splats[i].position, grid.radius(i));
                if hit {
                    states[i] = CullState::SplatVisible;
                    visible.push(i as u32);
                } else {
                    states[i] = CullState::SplatRejected;
                    stats.splats_rejected += 1;
                    if temporal && history[i] == ALWAYS_VISIBLE {
                        stats.temporal_kept += 1;
                        visible.push(i as u32);
                    }
                }
            }
            let cell = &mut grid.cells_mut()[ci];
            cell.visible = true;
            cell.last_visible_frame = frame;
        }

        for (h, s) in history.iter_mut().zip(states.iter()) {
            *h = ((*h << 1) | u8::from(*s == CullState::SplatVisible)) & ALWAYS_VISIBLE;
        }
        visible.sort_unstable();
        stats.visible = visible.len() as u32;

        tracing::debug!(
            visible = stats.visible,
            cells_rejected = stats.cells_rejected,
            splats_rejected = stats.splats_rejected,
            temporal_kept = stats.temporal_kept,
            "cull done"
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cull/culler.rs"]
mod tests;
