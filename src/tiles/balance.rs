use serde::{Deserialize, Serialize};

use crate::foundation::fixed::Fx;
use crate::tiles::grid::TileGrid;
use crate::tiles::list::{MergeScratch, TileList};

/// Outcome of one balancing pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceStats {
    /// Per-tile load ceiling, `ceil(2 · total / active)`.
    pub target: u32,
    /// Entries removed from overloaded tiles.
    pub moves: u32,
    /// Overloaded tiles left above the ceiling for lack of room next door.
    pub unresolved: u32,
}

/// Buffers reused across balancing passes.
#[derive(Clone, Debug, Default)]
pub struct BalanceScratch {
    moved: Vec<u32>,
    merge: MergeScratch,
}

/// Load ceiling for the current lists, or `None` when every tile is empty.
pub fn load_target(lists: &[TileList]) -> Option<usize> {
    let total: usize = lists.iter().map(TileList::len).sum();
    let active = lists.iter().filter(|l| !l.is_empty()).count();
    (active > 0).then(|| (2 * total).div_ceil(active))
}

/// Shed load from tiles above twice the mean into their left, right, up and down neighbors.
///
/// Each move takes the front-most entries (the list tail) and merges them into the neighbor in
/// depth order, bounded so that neither tile crosses the ceiling. A moved splat is rendered in
/// its new tile only.
pub fn balance(
    lists: &mut [TileList],
    grid: &TileGrid,
    depth: impl Fn(u32) -> Fx,
    scratch: &mut BalanceScratch,
) -> BalanceStats {
    let Some(target) = load_target(lists) else {
        return BalanceStats::default();
    };
    let mut stats = BalanceStats {
        target: target as u32,
        ..BalanceStats::default()
    };

    for ty in 0..grid.tiles_y {
        for tx in 0..grid.tiles_x {
            let idx = grid.fine_index(tx, ty);
            if lists[idx].len() <= target {
                continue;
            }
            let neighbors = [
                (tx > 0).then(|| grid.fine_index(tx - 1, ty)),
                (tx + 1 < grid.tiles_x).then(|| grid.fine_index(tx + 1, ty)),
                (ty > 0).then(|| grid.fine_index(tx, ty - 1)),
                (ty + 1 < grid.tiles_y).then(|| grid.fine_index(tx, ty + 1)),
            ];
            for nb in neighbors.into_iter().flatten() {
                let excess = lists[idx].len().saturating_sub(target);
                if excess == 0 {
                    break;
                }
                let room = target.saturating_sub(lists[nb].len());
                if room == 0 {
                    continue;
                }
                let BalanceScratch { moved, merge } = &mut *scratch;
                lists[idx].take_back(excess.min(room), moved);
                match lists[nb].merge_back_to_front(moved, &depth, merge) {
                    Some(_) => stats.moves += moved.len() as u32,
                    None => lists[idx].restore_back(moved),
                }
            }
            if lists[idx].len() > target {
                stats.unresolved += 1;
            }
        }
    }
    if stats.moves > 0 {
        tracing::trace!(ceiling = stats.target, moves = stats.moves, "tiles balanced");
    }
    stats
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/balance.rs"]
mod tests;
