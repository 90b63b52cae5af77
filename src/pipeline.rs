use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::cull::culler::{CullStats, FrustumCuller};
use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::lut::init_tables;
use crate::project::projector::{ProjectStats, project_visible};
use crate::scene::camera::Camera;
use crate::scene::splat::{Splat2D, Splat3D};
use crate::tiles::scheduler::{ScheduleStats, TileOutput, TileScheduler};

/// Caller-owned per-frame buffers. Reuse one value across frames to avoid reallocating.
#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    /// Indices of splats that passed culling, ascending.
    pub visible: Vec<u32>,
    /// Projected splats; tile lists index into this.
    pub splats2d: Vec<Splat2D>,
    /// Per-tile ranges and the shared sorted index array.
    pub tiles: TileOutput,
    /// Counters for the frame.
    pub stats: FrameStats,
}

/// Counters for one frame, grouped by stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frame number since construction or the last reset.
    pub frame: u64,
    /// Culling counters.
    pub cull: CullStats,
    /// Projection counters.
    pub project: ProjectStats,
    /// Tile scheduling counters.
    pub schedule: ScheduleStats,
}

impl FrameStats {
    /// Splats drawn somewhere on screen this frame.
    pub fn visible(&self) -> u32 {
        self.project.projected
    }

    /// Capacity losses of any kind: full grid cells and tile lists that could not grow.
    pub fn truncations(&self) -> u32 {
        self.cull.grid_dropped + self.schedule.oom_drops
    }
}

/// Per-scene pipeline context: cull, project, assign, sort and balance once per frame.
///
/// Owns the spatial grid, visibility history and scheduler scratch. Not internally synchronized;
/// serialize access from multiple threads.
#[derive(Debug)]
pub struct SplatPipeline {
    config: PipelineConfig,
    culler: FrustumCuller,
    scheduler: TileScheduler,
    frame: u64,
}

impl SplatPipeline {
    /// Validate `config`, build the lookup tables and allocate the tile lists.
    pub fn new(config: PipelineConfig) -> SplatResult<Self> {
        config.validate()?;
        init_tables();
        let culler = FrustumCuller::from_config(&config);
        let scheduler = TileScheduler::new(&config)?;
        Ok(Self {
            config,
            culler,
            scheduler,
            frame: 0,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Culler state (grid and visibility history).
    pub fn culler(&self) -> &FrustumCuller {
        &self.culler
    }

    /// Scheduler state (tile layout and lists).
    pub fn scheduler(&self) -> &TileScheduler {
        &self.scheduler
    }

    /// Rebuild the spatial grid for a new or edited scene and clear visibility history.
    pub fn rebuild_grid(&mut self, splats: &[Splat3D]) -> SplatResult<()> {
        self.culler.rebuild_grid(splats)?;
        self.scheduler.reset();
        Ok(())
    }

    /// Drop all per-scene state. Buffers are kept for reuse.
    pub fn reset(&mut self) {
        self.culler.reset();
        self.scheduler.reset();
        self.frame = 0;
    }

    /// Run one frame over `splats` as seen by `camera`, writing into `out`.
    ///
    /// Input problems are rejected before any state changes. Per-splat numeric trouble and
    /// capacity limits degrade the frame and show up in [`FrameOutput::stats`].
    ///
    /// The spatial grid is rebuilt automatically only when the splat count changes. Call
    /// [`SplatPipeline::rebuild_grid`] or [`SplatPipeline::reset`] after moving splats or
    /// swapping in a different scene of the same size; otherwise culling uses stale cells.
    #[tracing::instrument(
        skip(self, splats, camera, out),
        fields(frame = self.frame, splats = splats.len())
    )]
    pub fn render_frame(
        &mut self,
        splats: &[Splat3D],
        camera: &Camera,
        out: &mut FrameOutput,
    ) -> SplatResult<()> {
        if splats.is_empty() {
            return Err(SplatError::invalid("render_frame called with zero splats"));
        }
        if splats.len() > u32::MAX as usize {
            return Err(SplatError::invalid("scene exceeds 32-bit splat indices"));
        }

        if self.culler.grid().map(|g| g.splat_count()) != Some(splats.len()) {
            tracing::debug!("scene size changed, rebuilding grid");
            self.rebuild_grid(splats)?;
        }

        let cull = self.culler.cull(splats, camera, &mut out.visible)?;
        let project = project_visible(splats, &out.visible, camera, &mut out.splats2d);
        let schedule = self
            .scheduler
            .schedule(&mut out.splats2d, camera, &mut out.tiles)?;

        out.stats = FrameStats {
            frame: self.frame,
            cull,
            project,
            schedule,
        };
        self.frame += 1;

        if out.stats.truncations() > 0 {
            tracing::warn!(
                grid_dropped = cull.grid_dropped,
                tile_dropped = schedule.oom_drops,
                "frame truncated"
            );
        }
        tracing::debug!(
            visible = cull.visible,
            projected = project.projected,
            assignments = schedule.assignments,
            sort_skipped = schedule.sort_skipped,
            "frame done"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
