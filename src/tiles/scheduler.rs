use serde::{Deserialize, Serialize};

use crate::config::{COARSE_TILE_SIZE, FINE_PER_COARSE, PipelineConfig, TILE_INITIAL_CAPACITY};
use crate::foundation::error::{SplatError, SplatResult};
use crate::foundation::fixed::Fx;
use crate::scene::camera::{Camera, CameraTracker};
use crate::scene::splat::Splat2D;
use crate::tiles::assign::{Footprint, for_each_overlapped_tile};
use crate::tiles::balance::{BalanceScratch, BalanceStats, balance};
use crate::tiles::grid::TileGrid;
use crate::tiles::list::TileList;
use crate::tiles::sort::{BucketScratch, sort_back_to_front};

/// Mask of a non-empty fine tile.
const FINE_MASK_FULL: u8 = 0xFF;
const NO_SLOT: u32 = u32::MAX;

/// Slice of the shared sorted index array belonging to one tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    /// First position in [`TileOutput::sorted_indices`]. Always 0 for coarse tiles.
    pub start: u32,
    /// Entries in the range. For coarse tiles, splat centers inside the tile.
    pub count: u32,
    /// Nearest depth, 0 when empty.
    pub min_depth: Fx,
    /// Farthest depth, 0 when empty.
    pub max_depth: Fx,
    /// Fine tiles: `0xFF` when non-empty. Coarse tiles: bits 0–3 mark non-empty fine columns,
    /// bits 4–7 non-empty fine rows.
    pub mask: u8,
}

/// Caller-owned scheduler output, reused across frames.
#[derive(Clone, Debug, Default)]
pub struct TileOutput {
    /// Concatenated back-to-front `Splat2D` indices, fine tiles in row-major order.
    pub sorted_indices: Vec<u32>,
    /// One range per fine tile.
    pub fine: Vec<TileRange>,
    /// One range per coarse tile, informational only.
    pub coarse: Vec<TileRange>,
}

/// Counters for one scheduled frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Tile entries written.
    pub assignments: u32,
    /// Assignments dropped because a tile list could not grow.
    pub oom_drops: u32,
    /// The depth sort was skipped and the cached order reused.
    pub sort_skipped: bool,
    /// Load-balancing result.
    pub balance: BalanceStats,
    /// Longest fine tile list after balancing.
    pub max_tile_load: u32,
    /// Non-empty fine tiles.
    pub active_tiles: u32,
}

/// Assigns projected splats to screen tiles and orders each tile back to front.
#[derive(Debug)]
pub struct TileScheduler {
    grid: TileGrid,
    lists: Vec<TileList>,
    depth_buckets: usize,
    resort_interval: u32,
    load_balance: bool,
    tracker: CameraTracker,
    frames_since_sort: u32,
    /// Source indices back to front as of the last sort, valid when `order_cached`.
    cached_order: Vec<u32>,
    order_cached: bool,
    slot_of_source: Vec<u32>,
    order: Vec<u32>,
    seen: Vec<u32>,
    unseen: Vec<u32>,
    by_depth: Vec<u32>,
    scratch: BucketScratch,
    balance_scratch: BalanceScratch,
}

impl TileScheduler {
    /// Scheduler for the configured screen.
    pub fn new(cfg: &PipelineConfig) -> SplatResult<Self> {
        cfg.validate()?;
        let grid = TileGrid::new(cfg.screen_width, cfg.screen_height)?;
        let mut lists = Vec::new();
        lists
            .try_reserve_exact(grid.fine_count())
            .map_err(|e| SplatError::out_of_memory(format!("tile lists: {e}")))?;
        lists.resize_with(grid.fine_count(), || {
            TileList::new(TILE_INITIAL_CAPACITY, cfg.tile_max_capacity)
        });
        Ok(Self {
            grid,
            lists,
            depth_buckets: cfg.depth_buckets,
            resort_interval: cfg.resort_interval,
            load_balance: cfg.load_balance,
            tracker: CameraTracker::new(cfg.position_threshold, cfg.rotation_threshold_deg),
            frames_since_sort: 0,
            cached_order: Vec::new(),
            order_cached: false,
            slot_of_source: Vec::new(),
            order: Vec::new(),
            seen: Vec::new(),
            unseen: Vec::new(),
            by_depth: Vec::new(),
            scratch: BucketScratch::default(),
            balance_scratch: BalanceScratch::default(),
        })
    }

    /// Tile layout.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Per-tile lists of the last frame.
    pub fn lists(&self) -> &[TileList] {
        &self.lists
    }

    /// Forget the cached order and camera reference; the next frame sorts.
    pub fn reset(&mut self) {
        for l in &mut self.lists {
            l.clear();
        }
        self.tracker.reset();
        self.order_cached = false;
        self.frames_since_sort = 0;
    }

    fn needs_sort(&self, camera: &Camera) -> bool {
        !self.order_cached
            || self.frames_since_sort + 1 >= self.resort_interval
            || self.tracker.moved_significantly(camera)
    }

    /// Build `order`: indices into `splats` in the sequence they are assigned.
    ///
    /// Skip frames replay the cached back-to-front order. Splats missing from it are merged in
    /// by their current depth.
    fn assignment_order(&mut self, splats: &[Splat2D], sort: bool) {
        self.order.clear();
        if sort || !self.order_cached {
            self.order.extend(0..splats.len() as u32);
            return;
        }
        let max_src = splats.iter().map(|s| s.source).max().unwrap_or(0) as usize;
        self.slot_of_source.clear();
        self.slot_of_source.resize(max_src + 1, NO_SLOT);
        for (i, s) in splats.iter().enumerate() {
            self.slot_of_source[s.source as usize] = i as u32;
        }
        self.seen.clear();
        for &src in &self.cached_order {
            if let Some(slot) = self.slot_of_source.get_mut(src as usize)
                && *slot != NO_SLOT
            {
                self.seen.push(*slot);
                *slot = NO_SLOT;
            }
        }
        self.unseen.clear();
        for (i, s) in splats.iter().enumerate() {
            if self.slot_of_source[s.source as usize] != NO_SLOT {
                self.unseen.push(i as u32);
            }
        }

        let depth = |i: u32| splats[i as usize].depth;
        self.unseen
            .sort_unstable_by(|&a, &b| depth(b).cmp(&depth(a)).then(a.cmp(&b)));
        let (seen, unseen) = (&self.seen, &self.unseen);
        let (mut a, mut b) = (0, 0);
        while a < seen.len() && b < unseen.len() {
            // Ties keep the cached splat behind the newcomer.
            if depth(unseen[b]) > depth(seen[a]) {
                self.order.push(unseen[b]);
                b += 1;
            } else {
                self.order.push(seen[a]);
                a += 1;
            }
        }
        self.order.extend_from_slice(&seen[a..]);
        self.order.extend_from_slice(&unseen[b..]);
    }

    /// Assign, sort and balance `splats` into `out`. Sets each splat's tile mask.
    #[tracing::instrument(level = "debug", skip_all, fields(splats = splats.len()))]
    pub fn schedule(
        &mut self,
        splats: &mut [Splat2D],
        camera: &Camera,
        out: &mut TileOutput,
    ) -> SplatResult<ScheduleStats> {
        if splats.len() > u32::MAX as usize {
            return Err(SplatError::invalid("too many splats for 32-bit indices"));
        }
        let sort = self.needs_sort(camera);
        if !sort {
            self.frames_since_sort += 1;
        }
        tracing::trace!(sort, frames_since_sort = self.frames_since_sort, "sort decision");

        let mut stats = ScheduleStats {
            sort_skipped: !sort,
            ..ScheduleStats::default()
        };
        for l in &mut self.lists {
            l.clear();
        }

        self.assignment_order(splats, sort);
        let grid = self.grid;
        for &i in &self.order {
            let s = &mut splats[i as usize];
            let fp = Footprint::of(s);
            s.tile_mask = grid.region_mask(fp.min, fp.max);
            let lists = &mut self.lists;
            for_each_overlapped_tile(&fp, &grid, |t| {
                if lists[t].push(i).is_truncated() {
                    stats.oom_drops += 1;
                } else {
                    stats.assignments += 1;
                }
            });
        }

        let depth = |i: u32| splats[i as usize].depth;
        if sort {
            let (min, max) = depth_range(splats);
            for l in &mut self.lists {
                sort_back_to_front(
                    l.as_mut_slice(),
                    depth,
                    min,
                    max,
                    self.depth_buckets,
                    &mut self.scratch,
                );
            }
            self.by_depth.clear();
            self.by_depth.extend(0..splats.len() as u32);
            self.by_depth
                .sort_unstable_by(|&a, &b| depth(b).cmp(&depth(a)).then(a.cmp(&b)));
            self.cached_order.clear();
            self.cached_order
                .extend(self.by_depth.iter().map(|&i| splats[i as usize].source));
            self.order_cached = true;
            self.tracker.mark(camera);
            self.frames_since_sort = 0;
        }

        if self.load_balance {
            stats.balance = balance(&mut self.lists, &grid, depth, &mut self.balance_scratch);
        }

        write_output(&grid, &self.lists, splats, out);
        stats.max_tile_load = self.lists.iter().map(TileList::len).max().unwrap_or(0) as u32;
        stats.active_tiles = out.fine.iter().filter(|r| r.count > 0).count() as u32;
        if stats.oom_drops > 0 {
            tracing::warn!(dropped = stats.oom_drops, "tile lists full, assignments dropped");
        }
        tracing::debug!(
            assignments = stats.assignments,
            active_tiles = stats.active_tiles,
            max_tile_load = stats.max_tile_load,
            sort_skipped = stats.sort_skipped,
            "tiles scheduled"
        );
        Ok(stats)
    }
}

fn depth_range(splats: &[Splat2D]) -> (Fx, Fx) {
    let min = splats.iter().map(|s| s.depth).min().unwrap_or(Fx::ZERO);
    let max = splats.iter().map(|s| s.depth).max().unwrap_or(Fx::ZERO);
    (min, max)
}

fn write_output(grid: &TileGrid, lists: &[TileList], splats: &[Splat2D], out: &mut TileOutput) {
    out.sorted_indices.clear();
    out.fine.clear();
    out.coarse.clear();
    out.coarse.resize(grid.coarse_count(), TileRange::default());

    for ty in 0..grid.tiles_y {
        for tx in 0..grid.tiles_x {
            let list = lists[grid.fine_index(tx, ty)].as_slice();
            let mut range = TileRange {
                start: out.sorted_indices.len() as u32,
                count: list.len() as u32,
                ..TileRange::default()
            };
            if let (Some(&far), Some(&near)) = (list.first(), list.last()) {
                range.max_depth = splats[far as usize].depth;
                range.min_depth = splats[near as usize].depth;
                range.mask = FINE_MASK_FULL;
                let coarse = &mut out.coarse[grid.coarse_of(tx, ty)];
                coarse.mask |= 1 << (tx % FINE_PER_COARSE);
                coarse.mask |= 1 << (4 + ty % FINE_PER_COARSE);
            }
            out.sorted_indices.extend_from_slice(list);
            out.fine.push(range);
        }
    }

    let cw = i64::from(COARSE_TILE_SIZE);
    for s in splats {
        let (x, y) = (i64::from(s.screen[0].floor_int()), i64::from(s.screen[1].floor_int()));
        if x < 0 || y < 0 || x >= i64::from(grid.width) || y >= i64::from(grid.height) {
            continue;
        }
        let c = &mut out.coarse[(y / cw * i64::from(grid.coarse_x) + x / cw) as usize];
        if c.count == 0 {
            c.min_depth = s.depth;
            c.max_depth = s.depth;
        } else {
            c.min_depth = c.min_depth.min(s.depth);
            c.max_depth = c.max_depth.max(s.depth);
        }
        c.count += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/scheduler.rs"]
mod tests;
