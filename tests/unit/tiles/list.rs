use super::*;

fn depth(i: u32) -> Fx {
    Fx::from_int(i as i32)
}

#[test]
fn capacity_doubles_until_the_limit() {
    let mut list = TileList::new(4, 16);
    assert_eq!(list.capacity(), 4);
    for i in 0..5 {
        assert_eq!(list.push(i), PushStatus::Stored);
    }
    assert!(list.capacity() >= 8);
    for i in 5..16 {
        assert_eq!(list.push(i), PushStatus::Stored);
    }
    assert_eq!(list.push(99), PushStatus::Truncated);
    assert_eq!(list.len(), 16);
    assert_eq!(list.as_slice()[15], 15);
}

#[test]
fn clear_keeps_allocation() {
    let mut list = TileList::new(8, 64);
    for i in 0..20 {
        list.push(i);
    }
    let cap = list.capacity();
    list.clear();
    assert!(list.is_empty());
    assert_eq!(list.capacity(), cap);
}

#[test]
fn take_back_returns_the_tail_in_order() {
    let mut list = TileList::new(8, 64);
    for i in 0..6 {
        list.push(i);
    }
    let mut tail = Vec::new();
    list.take_back(2, &mut tail);
    assert_eq!(tail, vec![4, 5]);
    assert_eq!(list.as_slice(), &[0, 1, 2, 3]);
    list.take_back(10, &mut tail);
    assert_eq!(tail, vec![0, 1, 2, 3]);
    assert!(list.is_empty());
}

#[test]
fn merge_keeps_descending_depth_and_skips_duplicates() {
    // Depth of index i is i, so back to front is descending index.
    let mut list = TileList::new(8, 64);
    for i in [9, 6, 3] {
        list.push(i);
    }
    let mut scratch = MergeScratch::default();
    let inserted = list.merge_back_to_front(&[8, 6, 2], depth, &mut scratch);
    assert_eq!(inserted, Some(2));
    assert_eq!(list.as_slice(), &[9, 8, 6, 3, 2]);
}

#[test]
fn merge_past_the_limit_changes_nothing() {
    let mut list = TileList::new(2, 3);
    list.push(5);
    list.push(1);
    let mut scratch = MergeScratch::default();
    assert_eq!(list.merge_back_to_front(&[4, 3], depth, &mut scratch), None);
    assert_eq!(list.as_slice(), &[5, 1]);
    assert_eq!(list.merge_back_to_front(&[4, 5], depth, &mut scratch), Some(1));
    assert_eq!(list.as_slice(), &[5, 4, 1]);
}

#[test]
fn restore_undoes_take_back() {
    let mut list = TileList::new(8, 64);
    for i in 0..5 {
        list.push(i);
    }
    let mut tail = Vec::new();
    list.take_back(3, &mut tail);
    list.restore_back(&tail);
    assert_eq!(list.as_slice(), &[0, 1, 2, 3, 4]);
}

#[test]
fn merge_ties_keep_resident_first() {
    let mut list = TileList::new(8, 64);
    for i in [7, 4, 1] {
        list.push(i);
    }
    let same_depth = |i: u32| Fx::from_int((i / 2) as i32);
    let mut scratch = MergeScratch::default();
    assert_eq!(list.merge_back_to_front(&[5, 0], same_depth, &mut scratch), Some(2));
    assert_eq!(list.as_slice(), &[7, 4, 5, 1, 0]);
}

#[test]
fn merge_grows_within_the_limit_and_reuses_scratch() {
    let mut list = TileList::new(2, 16);
    list.push(10);
    list.push(2);
    let mut scratch = MergeScratch::default();
    assert_eq!(list.merge_back_to_front(&[11, 9, 3, 1], depth, &mut scratch), Some(4));
    assert_eq!(list.as_slice(), &[11, 10, 9, 3, 2, 1]);
    assert!(list.capacity() >= 6);
    // Stale marks from the previous batch do not hide new entries.
    assert_eq!(list.merge_back_to_front(&[12, 10, 0], depth, &mut scratch), Some(2));
    assert_eq!(list.as_slice(), &[12, 11, 10, 9, 3, 2, 1, 0]);
}

#[test]
fn merge_inserts_repeated_incoming_once() {
    let mut list = TileList::new(4, 16);
    list.push(6);
    let mut scratch = MergeScratch::default();
    assert_eq!(list.merge_back_to_front(&[8, 8, 3], depth, &mut scratch), Some(2));
    assert_eq!(list.as_slice(), &[8, 6, 3]);
}
