use super::*;

#[test]
fn push_past_capacity_truncates() {
    let mut l = BoundedList::with_capacity(2);
    assert_eq!(l.push(1u32), PushStatus::Stored);
    assert_eq!(l.push(2), PushStatus::Stored);
    assert_eq!(l.push(3), PushStatus::Truncated);
    assert!(PushStatus::Truncated.is_truncated());
    assert_eq!(l.as_slice(), &[1, 2]);
    assert_eq!(l.dropped(), 1);
    assert_eq!(l.capacity(), 2);
}

#[test]
fn clear_resets_contents_and_drop_count() {
    let mut l = BoundedList::with_capacity(1);
    l.push(1u32);
    l.push(2);
    l.clear();
    assert!(l.is_empty());
    assert_eq!(l.dropped(), 0);
    assert_eq!(l.push(5), PushStatus::Stored);
    assert_eq!(l.len(), 1);
}
