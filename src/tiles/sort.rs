//! Back-to-front ordering of tile lists.

use crate::config::INSERTION_SORT_MAX;
use crate::foundation::fixed::Fx;

/// Stable insertion sort by descending depth.
pub fn insertion_sort_back_to_front(entries: &mut [u32], depth: impl Fn(u32) -> Fx) {
    for i in 1..entries.len() {
        let cur = entries[i];
        let d = depth(cur);
        let mut j = i;
        while j > 0 && depth(entries[j - 1]) < d {
            entries[j] = entries[j - 1];
            j -= 1;
        }
        entries[j] = cur;
    }
}

/// Reusable counting-sort scratch.
#[derive(Clone, Debug, Default)]
pub struct BucketScratch {
    counts: Vec<u32>,
    out: Vec<u32>,
}

/// Bucket of `d` within `[min, max]`, with the far end in bucket 0.
fn far_bucket(d: Fx, min: Fx, max: Fx, buckets: usize) -> usize {
    let range = i64::from(max.raw()) - i64::from(min.raw());
    if range <= 0 || buckets <= 1 {
        return 0;
    }
    let off = (i64::from(d.raw()) - i64::from(min.raw())).clamp(0, range);
    let b = (off * (buckets as i64 - 1) / range) as usize;
    buckets - 1 - b
}

/// Sort one tile list back to front.
///
/// Lists up to [`INSERTION_SORT_MAX`] are insertion sorted. Longer lists are counting-sorted
/// into `buckets` depth buckets spanning `[min, max]` and then finished with an insertion pass,
/// so the result is exact and stable either way.
pub fn sort_back_to_front(
    entries: &mut [u32],
    depth: impl Fn(u32) -> Fx,
    min: Fx,
    max: Fx,
    buckets: usize,
    scratch: &mut BucketScratch,
) {
    if entries.len() <= INSERTION_SORT_MAX {
        insertion_sort_back_to_front(entries, depth);
        return;
    }
    let buckets = buckets.max(1);
    scratch.counts.clear();
    scratch.counts.resize(buckets + 1, 0);
    for &e in entries.iter() {
        scratch.counts[far_bucket(depth(e), min, max, buckets) + 1] += 1;
    }
    for b in 1..=buckets {
        scratch.counts[b] += scratch.counts[b - 1];
    }
    scratch.out.clear();
    scratch.out.resize(entries.len(), 0);
    for &e in entries.iter() {
        let b = far_bucket(depth(e), min, max, buckets);
        scratch.out[scratch.counts[b] as usize] = e;
        scratch.counts[b] += 1;
    }
    entries.copy_from_slice(&scratch.out);
    insertion_sort_back_to_front(entries, depth);
}

#[cfg(test)]
#[path = "../../tests/unit/tiles/sort.rs"]
mod tests;
