//! Property-based tests for the indexed min-heap.
//!
//! Random operation sequences are replayed against the heap, checking the heap
//! order and the position index after every call, and against
//! `orx_priority_queue::BinaryHeapWithMap` as an independent reference for the
//! order in which priorities come out.

use orx_priority_queue::*;
use polynav::{Error, IndexedMinHeap};
use proptest::prelude::*;

const CAPACITY: usize = 32;

#[derive(Clone, Debug)]
enum Op {
    Push(usize, u16),
    Pop,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..CAPACITY, 0u16..500).prop_map(|(v, p)| Op::Push(v, p)),
        1 => Just(Op::Pop),
    ]
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(op(), 0..200)) {
        let mut heap = IndexedMinHeap::new(CAPACITY);
        let mut last_popped: Option<f64> = None;

        for op in ops {
            match op {
                Op::Push(v, p) => {
                    let p = f64::from(p);
                    if heap.contains(v) {
                        let before = heap.priority(v).unwrap();
                        let lowered = heap.decrease_key(v, p);
                        prop_assert_eq!(lowered, p < before);
                        prop_assert_eq!(heap.priority(v), Some(p.min(before)));
                    } else {
                        heap.insert(v, p).unwrap();
                    }
                    // New or lowered keys may be smaller than what came out before.
                    last_popped = None;
                }
                Op::Pop => match heap.extract_min() {
                    Ok((v, p)) => {
                        prop_assert!(!heap.contains(v));
                        if let Some(prev) = last_popped {
                            prop_assert!(prev <= p);
                        }
                        last_popped = Some(p);
                    }
                    Err(Error::EmptyHeap) => prop_assert!(heap.is_empty()),
                    Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                },
            }
            prop_assert!(heap.is_consistent());
        }
    }

    #[test]
    fn extraction_order_matches_reference(ops in prop::collection::vec(op(), 0..200)) {
        let mut heap = IndexedMinHeap::new(CAPACITY);
        let mut reference: BinaryHeapWithMap<usize, f64> = BinaryHeapWithMap::new();

        for op in ops {
            match op {
                Op::Push(v, p) => {
                    let p = f64::from(p);
                    match heap.priority(v) {
                        Some(current) if current <= p => {}
                        Some(_) => {
                            reference.decrease_key(&v, p);
                        }
                        None => {
                            reference.push(v, p);
                        }
                    }
                    heap.push_or_decrease(v, p).unwrap();
                }
                Op::Pop => {
                    let ours = heap.extract_min().ok().map(|(_, p)| p);
                    let theirs = reference.pop().map(|(_, p)| p);
                    prop_assert_eq!(ours, theirs);
                }
            }
            prop_assert_eq!(heap.len(), reference.len());
        }

        while let Some((_, p)) = reference.pop() {
            prop_assert_eq!(heap.extract_min().unwrap().1, p);
        }
        prop_assert!(heap.is_empty());
    }

    #[test]
    fn drains_in_sorted_order(priorities in prop::collection::vec(0.0f64..1e6, 0..CAPACITY)) {
        let mut heap = IndexedMinHeap::new(CAPACITY);
        for (v, &p) in priorities.iter().enumerate() {
            heap.insert(v, p).unwrap();
        }
        let mut drained = Vec::new();
        while let Ok((_, p)) = heap.extract_min() {
            drained.push(p);
        }
        let mut expected = priorities.clone();
        expected.sort_by(f64::total_cmp);
        prop_assert_eq!(drained, expected);
    }
}

#[test]
fn duplicate_insert_is_rejected_without_side_effects() {
    let mut heap = IndexedMinHeap::new(4);
    heap.insert(2, 5.0).unwrap();
    assert!(matches!(heap.insert(2, 1.0), Err(Error::AlreadyPresent(2))));
    assert_eq!(heap.priority(2), Some(5.0));
    assert_eq!(heap.len(), 1);
    assert!(heap.is_consistent());
}
