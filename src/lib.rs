//! splatpipe is a fixed-point 3D Gaussian splat pipeline for float-scarce hardware.
//!
//! Each frame turns a static scene of [`Splat3D`] values into depth-ordered per-tile lists of
//! [`Splat2D`] records ready for a hardware rasterizer:
//!
//! - cull against the view frustum with a spatial grid and per-splat visibility history
//! - project every surviving splat to a screen-space ellipse
//! - assign ellipses to 16×16 tiles, sort each tile back to front and balance the load
//!
//! Everything runs in saturating Q16.16 / Q8.8 arithmetic. Start with a [`PipelineConfig`],
//! build a [`SplatPipeline`] and call [`SplatPipeline::render_frame`] once per frame.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod cull;
mod debug;
mod foundation;
mod pipeline;
mod project;
mod scene;
mod tiles;

pub use crate::config::{
    COARSE_TILE_SIZE, DEFAULT_DEPTH_BUCKETS, DEFAULT_GRID_PADDING, DEFAULT_POSITION_THRESHOLD,
    DEFAULT_RESORT_INTERVAL, DEFAULT_ROTATION_THRESHOLD_DEG, DEFAULT_SCREEN_HEIGHT,
    DEFAULT_SCREEN_WIDTH, DEFAULT_TILE_MAX_CAPACITY, FINE_PER_COARSE, FINE_TILE_SIZE,
    GRID_CELL_CAPACITY, GRID_RESOLUTION, HISTORY_DEPTH, INSERTION_SORT_MAX, PipelineConfig,
    TILE_INITIAL_CAPACITY,
};
pub use crate::cull::culler::{CullState, CullStats, FrustumCuller};
pub use crate::cull::frustum::{Frustum, Plane};
pub use crate::cull::grid::{GridCell, SpatialGrid};
pub use crate::debug::{save_png, splat_preview, tile_heatmap};
pub use crate::foundation::bounded::{BoundedList, PushStatus};
pub use crate::foundation::error::{SplatError, SplatResult};
pub use crate::foundation::fixed::{Fx, Q8};
pub use crate::foundation::lut::init_tables;
pub use crate::foundation::matrix::{Mat4, Vec3, Vec4, dot_fx};
pub use crate::pipeline::{FrameOutput, FrameStats, SplatPipeline};
pub use crate::project::atlas::{
    ATLAS_BUCKETS, ATLAS_CELL, ATLAS_SIZE, atlas_uv, footprint_atlas, sample_footprint,
};
pub use crate::project::eigen::{Eigen2, invert_symmetric, solve_symmetric};
pub use crate::project::projector::{
    CullReason, JACOBIAN_LIMIT, ProjectStats, project, project_visible,
};
pub use crate::scene::camera::{Camera, CameraTracker, Lens, Quat, Viewport};
pub use crate::scene::desc::{Rng64, SceneDesc, SplatDesc};
pub use crate::scene::splat::{CompressedCov, SH_COEFFS, Splat2D, Splat3D};
pub use crate::tiles::balance::BalanceStats;
pub use crate::tiles::grid::TileGrid;
pub use crate::tiles::list::TileList;
pub use crate::tiles::scheduler::{ScheduleStats, TileOutput, TileRange, TileScheduler};
