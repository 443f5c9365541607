//! Unit and property tests for RandomAccessStack

use core_types::{Claim, RandomAccessStack, WeakClaim};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push,
    Pop,
    Remove(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Push),
        2 => Just(Op::Pop),
        2 => (0usize..8).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn prop_count_matches_live_claims(ops in proptest::collection::vec(op(), 0..64)) {
        let mut stack: RandomAccessStack<Claim<usize>> = RandomAccessStack::new();
        let mut observers: Vec<WeakClaim<usize>> = Vec::new();

        for (n, op) in ops.into_iter().enumerate() {
            match op {
                Op::Push => {
                    let value = Claim::new(n);
                    observers.push(value.downgrade());
                    stack.push(value);
                }
                Op::Pop => {
                    stack.pop();
                }
                Op::Remove(index) => {
                    stack.remove(index);
                }
                Op::Clear => stack.clear(),
            }
        }

        let live = observers.iter().filter(|w| !w.is_released()).count();
        prop_assert_eq!(stack.count(), live);
        for slot in stack.iter() {
            prop_assert_eq!(slot.claims(), 1);
        }
        drop(stack);
        prop_assert!(observers.iter().all(|w| w.is_released()));
    }
}

#[test]
fn test_remove_middle_keeps_top() {
    let mut stack = RandomAccessStack::new();
    for value in ["bottom", "middle", "top"] {
        stack.push(value);
    }
    assert_eq!(stack.remove(1), Some("middle"));
    assert_eq!(stack.count(), 2);
    assert_eq!(stack.top(), Some(&"top"));
    assert_eq!(stack.peek(1), Some(&"bottom"));
}

#[test]
fn test_out_of_range_is_reported() {
    let mut stack: RandomAccessStack<u8> = RandomAccessStack::new();
    assert!(stack.peek(0).is_none());
    assert!(stack.remove(0).is_none());
    assert!(stack.pop().is_none());
    assert_eq!(stack.set(0, 1), Err(1));
}
