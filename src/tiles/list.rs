use crate::foundation::bounded::PushStatus;
use crate::foundation::fixed::Fx;

/// Growable per-tile list of `Splat2D` indices.
///
/// Capacity doubles on demand up to a hard limit. A push that cannot grow the list is
/// dropped and reported as [`PushStatus::Truncated`].
#[derive(Clone, Debug)]
pub struct TileList {
    entries: Vec<u32>,
    max_capacity: usize,
}

impl TileList {
    /// Empty list with `initial` reserved slots that may grow to `max_capacity`.
    pub fn new(initial: usize, max_capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(initial.min(max_capacity)),
            max_capacity,
        }
    }

    fn grow(&mut self) -> bool {
        let cap = self.entries.capacity();
        if cap >= self.max_capacity {
            return false;
        }
        let target = cap.max(1).saturating_mul(2).min(self.max_capacity);
        let extra = target - self.entries.len();
        self.entries.try_reserve_exact(extra).is_ok()
    }

    /// Append `index`, doubling capacity when full.
    pub fn push(&mut self, index: u32) -> PushStatus {
        if self.entries.len() >= self.max_capacity {
            return PushStatus::Truncated;
        }
        if self.entries.len() == self.entries.capacity() && !self.grow() {
            return PushStatus::Truncated;
        }
        self.entries.push(index);
        PushStatus::Stored
    }

    /// Stored indices in list order.
    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.entries
    }

    /// Move the last `n` entries into `out` (cleared first), preserving their order.
    pub fn take_back(&mut self, n: usize, out: &mut Vec<u32>) {
        let at = self.entries.len().saturating_sub(n);
        out.clear();
        out.extend_from_slice(&self.entries[at..]);
        self.entries.truncate(at);
    }

    /// Put back entries previously removed with [`TileList::take_back`].
    pub(crate) fn restore_back(&mut self, tail: &[u32]) {
        self.entries.extend_from_slice(tail);
    }

    /// Merge `incoming` (already back to front) into this list by descending depth.
    ///
    /// Entries already present are skipped. Returns the number inserted, or `None` with the
    /// list untouched when the merged list would pass the limit or cannot grow. The merge runs
    /// in place from the back; only growth of the list itself allocates.
    pub fn merge_back_to_front(
        &mut self,
        incoming: &[u32],
        depth: impl Fn(u32) -> Fx,
        scratch: &mut MergeScratch,
    ) -> Option<usize> {
        scratch.collect_fresh(&self.entries, incoming);
        let fresh = &scratch.fresh;
        if fresh.is_empty() {
            return Some(0);
        }
        let (n, k) = (self.entries.len(), fresh.len());
        if n + k > self.max_capacity {
            return None;
        }
        if self.entries.capacity() < n + k {
            let target = self.entries.capacity().max(1).saturating_mul(2);
            let target = target.clamp(n + k, self.max_capacity);
            self.entries.try_reserve_exact(target - n).ok()?;
        }
        self.entries.resize(n + k, 0);

        let (mut i, mut j) = (n, k);
        for w in (0..n + k).rev() {
            // Ties keep the resident entry first.
            if j == 0 {
                break;
            }
            if i > 0 && depth(self.entries[i - 1]) < depth(fresh[j - 1]) {
                self.entries[w] = self.entries[i - 1];
                i -= 1;
            } else {
                self.entries[w] = fresh[j - 1];
                j -= 1;
            }
        }
        Some(k)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reserved slots.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Drop all entries, keeping the allocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Reusable buffers for [`TileList::merge_back_to_front`].
#[derive(Clone, Debug, Default)]
pub struct MergeScratch {
    /// Per-index generation stamp marking entries of the current `incoming` batch.
    stamp: Vec<u32>,
    generation: u32,
    fresh: Vec<u32>,
}

impl MergeScratch {
    /// Fill `fresh` with the entries of `incoming` not present in `resident`, keeping order.
    fn collect_fresh(&mut self, resident: &[u32], incoming: &[u32]) {
        self.fresh.clear();
        let Some(&max) = incoming.iter().max() else {
            return;
        };
        if self.stamp.len() <= max as usize {
            self.stamp.resize(max as usize + 1, 0);
        }
        if self.generation >= u32::MAX - 1 {
            self.stamp.fill(0);
            self.generation = 0;
        }
        // `generation` marks "incoming", `generation + 1` marks "incoming and resident".
        self.generation += 2;
        let (inc, dup) = (self.generation - 1, self.generation);
        for &i in incoming {
            self.stamp[i as usize] = inc;
        }
        for &r in resident {
            if let Some(s) = self.stamp.get_mut(r as usize)
                && *s == inc
            {
                *s = dup;
            }
        }
        for &i in incoming {
            if self.stamp[i as usize] == inc {
                self.fresh.push(i);
                // Repeated incoming indices are inserted once.
                self.stamp[i as usize] = dup;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/list.rs"]
mod tests;
