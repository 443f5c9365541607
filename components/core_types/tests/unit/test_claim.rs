//! Unit tests for the claim protocol

use core_types::{Claim, StackItem};

#[test]
fn test_claim_count_tracks_holders() {
    let value = Claim::new(vec![0u8; 4]);
    let holders: Vec<_> = (0..5).map(|_| value.claim()).collect();
    assert_eq!(value.claims(), 6);
    drop(holders);
    assert_eq!(value.claims(), 1);
}

#[test]
fn test_release_of_shared_value_keeps_it_alive() {
    let owner = Claim::new(String::from("context"));
    let observer = owner.downgrade();
    let other = owner.claim();

    assert!(owner.release().is_none());
    assert_eq!(observer.claims(), 1);
    assert_eq!(*other.borrow(), "context");

    assert_eq!(other.release().as_deref(), Some("context"));
    assert!(observer.is_released());
}

#[test]
fn test_item_shared_by_two_containers() {
    let leaf = StackItem::new_array(vec![StackItem::from(1i64)]);
    let weak = leaf.as_list().unwrap().downgrade();

    let first = StackItem::new_array(vec![leaf.clone()]);
    let second = StackItem::new_struct(vec![leaf]);
    assert_eq!(weak.claims(), 2);

    drop(first);
    assert_eq!(weak.claims(), 1);
    assert!(!weak.is_released());

    drop(second);
    assert!(weak.is_released());
}
