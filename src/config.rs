//! Structural constants and runtime pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SplatError, SplatResult};

/// Spatial grid cells per axis.
pub const GRID_RESOLUTION: usize = 8;
/// Maximum splat indices stored in one grid cell; further splats are dropped.
pub const GRID_CELL_CAPACITY: usize = 512;
/// Fine tile edge in pixels.
pub const FINE_TILE_SIZE: u32 = 16;
/// Coarse tile edge in pixels.
pub const COARSE_TILE_SIZE: u32 = 64;
/// Fine tiles per coarse tile edge.
pub const FINE_PER_COARSE: u32 = COARSE_TILE_SIZE / FINE_TILE_SIZE;
/// Reserved entries per fine tile list at start-up.
pub const TILE_INITIAL_CAPACITY: usize = 128;
/// Frames of visibility kept per splat.
pub const HISTORY_DEPTH: u32 = 8;
/// Lists at or below this length are insertion sorted.
pub const INSERTION_SORT_MAX: usize = 32;

/// Default screen width in pixels.
pub const DEFAULT_SCREEN_WIDTH: u32 = 640;
/// Default screen height in pixels.
pub const DEFAULT_SCREEN_HEIGHT: u32 = 448;
/// Default number of depth buckets for large tile lists.
pub const DEFAULT_DEPTH_BUCKETS: usize = 256;
/// Default forced resort interval in frames.
pub const DEFAULT_RESORT_INTERVAL: u32 = 10;
/// Default camera translation that invalidates the cached sort, in scene units.
pub const DEFAULT_POSITION_THRESHOLD: f32 = 0.1;
/// Default camera rotation that invalidates the cached sort, in degrees.
pub const DEFAULT_ROTATION_THRESHOLD_DEG: f32 = 5.0;
/// Default hard cap on one fine tile list.
pub const DEFAULT_TILE_MAX_CAPACITY: usize = 8192;
/// Default padding added around the scene bounds when building the spatial grid.
pub const DEFAULT_GRID_PADDING: f32 = 1.0;

const MAX_SCREEN_EDGE: u32 = 4096;
const MAX_DEPTH_BUCKETS: usize = 1 << 16;

/// Runtime knobs for [`crate::SplatPipeline`].
///
/// Missing JSON fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Depth buckets used when sorting lists longer than [`INSERTION_SORT_MAX`].
    pub depth_buckets: usize,
    /// Frames after which the sort runs even if the camera is still.
    pub resort_interval: u32,
    /// Camera translation (scene units) that counts as significant motion.
    pub position_threshold: f32,
    /// Camera rotation (degrees) that counts as significant motion.
    pub rotation_threshold_deg: f32,
    /// Growth limit for one fine tile list; assignments past it are dropped.
    pub tile_max_capacity: usize,
    /// Run the load-balancing pass after sorting.
    pub load_balance: bool,
    /// Keep continuously visible splats for one frame after they fail the frustum test.
    pub temporal_visibility: bool,
    /// Scene-unit padding on every side of the spatial grid.
    pub grid_padding: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            depth_buckets: DEFAULT_DEPTH_BUCKETS,
            resort_interval: DEFAULT_RESORT_INTERVAL,
            position_threshold: DEFAULT_POSITION_THRESHOLD,
            rotation_threshold_deg: DEFAULT_ROTATION_THRESHOLD_DEG,
            tile_max_capacity: DEFAULT_TILE_MAX_CAPACITY,
            load_balance: true,
            temporal_visibility: true,
            grid_padding: DEFAULT_GRID_PADDING,
        }
    }
}

impl PipelineConfig {
    /// Check ranges. Called by the pipeline constructor.
    pub fn validate(&self) -> SplatResult<()> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(SplatError::config("screen size must be non-zero"));
        }
        if self.screen_width > MAX_SCREEN_EDGE || self.screen_height > MAX_SCREEN_EDGE {
            return Err(SplatError::config(format!(
                "screen size {}x{} exceeds {MAX_SCREEN_EDGE}",
                self.screen_width, self.screen_height
            )));
        }
        if self.depth_buckets == 0 || self.depth_buckets > MAX_DEPTH_BUCKETS {
            return Err(SplatError::config(format!(
                "depth_buckets must be in 1..={MAX_DEPTH_BUCKETS}"
            )));
        }
        if self.resort_interval == 0 {
            return Err(SplatError::config("resort_interval must be >= 1"));
        }
        if !self.position_threshold.is_finite() || self.position_threshold < 0.0 {
            return Err(SplatError::config("position_threshold must be finite and >= 0"));
        }
        if !self.rotation_threshold_deg.is_finite()
            || !(0.0..=180.0).contains(&self.rotation_threshold_deg)
        {
            return Err(SplatError::config("rotation_threshold_deg must be in 0..=180"));
        }
        if !self.grid_padding.is_finite() || !(0.0..=1024.0).contains(&self.grid_padding) {
            return Err(SplatError::config("grid_padding must be in 0..=1024"));
        }
        if self.tile_max_capacity < TILE_INITIAL_CAPACITY {
            return Err(SplatError::config(format!(
                "tile_max_capacity must be >= {TILE_INITIAL_CAPACITY}"
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> SplatResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> SplatResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            let context = format!("read config '{}'", path.display());
            SplatError::Other(anyhow::Error::new(e).context(context))
        })?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
