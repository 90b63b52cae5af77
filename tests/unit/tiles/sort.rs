use super::*;
use crate::scene::desc::Rng64;

fn is_back_to_front(entries: &[u32], depths: &[Fx]) -> bool {
    entries
        .windows(2)
        .all(|w| depths[w[0] as usize] >= depths[w[1] as usize])
}

#[test]
fn short_lists_are_insertion_sorted_stably() {
    let depths = [Fx::from_int(5), Fx::from_int(10), Fx::from_int(5), Fx::from_int(7)];
    let mut entries = [0, 1, 2, 3];
    insertion_sort_back_to_front(&mut entries, |i| depths[i as usize]);
    assert_eq!(entries, [1, 3, 0, 2]);
}

#[test]
fn long_lists_use_buckets_and_stay_exact() {
    let mut rng = Rng64::new(7);
    let depths: Vec<Fx> = (0..500).map(|_| Fx::from_f64(rng.range(1.0, 60.0))).collect();
    let mut entries: Vec<u32> = (0..500).collect();
    let mut scratch = BucketScratch::default();
    sort_back_to_front(
        &mut entries,
        |i| depths[i as usize],
        Fx::ONE,
        Fx::from_int(60),
        16,
        &mut scratch,
    );
    assert!(is_back_to_front(&entries, &depths));
    let mut seen = entries.clone();
    seen.sort_unstable();
    assert_eq!(seen, (0..500).collect::<Vec<_>>());
}

#[test]
fn equal_depths_keep_input_order_in_long_lists() {
    let depths: Vec<Fx> = (0..40).map(|i| Fx::from_int(if i % 2 == 0 { 3 } else { 9 })).collect();
    let mut entries: Vec<u32> = (0..40).collect();
    let mut scratch = BucketScratch::default();
    sort_back_to_front(
        &mut entries,
        |i| depths[i as usize],
        Fx::from_int(3),
        Fx::from_int(9),
        256,
        &mut scratch,
    );
    let odd: Vec<u32> = (0..40).filter(|i| i % 2 == 1).collect();
    let even: Vec<u32> = (0..40).filter(|i| i % 2 == 0).collect();
    assert_eq!(&entries[..20], odd.as_slice());
    assert_eq!(&entries[20..], even.as_slice());
}

#[test]
fn degenerate_depth_range_still_sorts() {
    let depths: Vec<Fx> = (0..50).map(|i| Fx::from_int(i % 7)).collect();
    let mut entries: Vec<u32> = (0..50).collect();
    let mut scratch = BucketScratch::default();
    sort_back_to_front(&mut entries, |i| depths[i as usize], Fx::ONE, Fx::ONE, 256, &mut scratch);
    assert!(is_back_to_front(&entries, &depths));
}
