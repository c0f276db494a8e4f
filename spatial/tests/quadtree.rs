use std::collections::BTreeSet;

use outpost_core::Rect;
use outpost_spatial::Quadtree;
use proptest::prelude::*;

const WORLD: Rect = Rect::new(0.0, 0.0, 4000.0, 4000.0);

fn unit_rects(count: u32) -> Vec<(Rect, u32)> {
    (0..count)
        .map(|index| {
            let column = index % 40;
            let row = index / 40;
            let x = column as f32 * 97.0 + 3.0;
            let y = row as f32 * 89.0 + 7.0;
            (Rect::new(x, y, 1.0, 1.0), index)
        })
        .collect()
}

fn assert_round_trip(count: u32) {
    let mut tree = Quadtree::new(WORLD);
    for (rect, value) in unit_rects(count) {
        tree.insert(rect, value);
    }

    let retrieved = tree.retrieve(&WORLD);
    assert_eq!(retrieved.len(), count as usize, "items lost or duplicated");

    let unique: BTreeSet<u32> = retrieved.iter().map(|item| item.value).collect();
    assert_eq!(unique.len(), count as usize, "duplicate items retrieved");
    assert_eq!(tree.len(), count as usize);
}

#[test]
fn round_trip_below_capacity() {
    assert_round_trip(7);
}

#[test]
fn round_trip_at_capacity() {
    assert_round_trip(10);
}

#[test]
fn round_trip_above_capacity_forces_split() {
    assert_round_trip(11);
    assert_round_trip(250);
}

#[test]
fn split_tree_never_exceeds_depth_cap() {
    let mut tree = Quadtree::with_limits(Rect::new(0.0, 0.0, 64.0, 64.0), 1, 3);
    for index in 0..200u32 {
        let offset = (index % 16) as f32 * 0.25;
        tree.insert(Rect::new(1.0 + offset, 1.0 + offset, 0.1, 0.1), index);
    }

    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.retrieve(&tree.bounds()).len(), 200);
}

#[test]
fn retrieve_skips_unrelated_quadrants() {
    let mut tree = Quadtree::with_limits(Rect::new(0.0, 0.0, 100.0, 100.0), 2, 4);
    tree.insert(Rect::new(5.0, 5.0, 2.0, 2.0), "top-left");
    tree.insert(Rect::new(10.0, 10.0, 2.0, 2.0), "top-left-2");
    tree.insert(Rect::new(80.0, 80.0, 2.0, 2.0), "bottom-right");
    tree.insert(Rect::new(45.0, 45.0, 10.0, 10.0), "centre");

    let candidates: BTreeSet<&str> = tree
        .retrieve(&Rect::new(70.0, 70.0, 5.0, 5.0))
        .into_iter()
        .map(|item| item.value)
        .collect();

    assert!(candidates.contains("bottom-right"));
    assert!(
        candidates.contains("centre"),
        "straddling items stay in the parent"
    );
    assert!(!candidates.contains("top-left"));
    assert!(!candidates.contains("top-left-2"));
}

#[test]
fn query_applies_exact_overlap() {
    let mut tree = Quadtree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    tree.insert(Rect::new(10.0, 10.0, 5.0, 5.0), 1u8);
    tree.insert(Rect::new(30.0, 30.0, 5.0, 5.0), 2u8);

    let hits: Vec<u8> = tree
        .query(&Rect::new(12.0, 12.0, 5.0, 5.0))
        .into_iter()
        .map(|item| item.value)
        .collect();
    assert_eq!(hits, vec![1]);
}

#[test]
fn clear_empties_the_tree() {
    let mut tree = Quadtree::new(WORLD);
    for (rect, value) in unit_rects(50) {
        tree.insert(rect, value);
    }
    tree.clear();

    assert!(tree.is_empty());
    assert_eq!(tree.depth(), 0);
    assert!(tree.retrieve(&WORLD).is_empty());
}

proptest! {
    #[test]
    fn every_inserted_item_is_retrieved_exactly_once(
        cells in proptest::collection::btree_set((0u32..400, 0u32..400), 0..120)
    ) {
        let mut tree = Quadtree::new(Rect::new(0.0, 0.0, 4000.0, 4000.0));
        for (index, (column, row)) in cells.iter().enumerate() {
            tree.insert(
                Rect::new(*column as f32 * 10.0, *row as f32 * 10.0, 1.0, 1.0),
                index,
            );
        }

        let mut values: Vec<usize> = tree
            .retrieve(&tree.bounds())
            .into_iter()
            .map(|item| item.value)
            .collect();
        values.sort_unstable();
        let expected: Vec<usize> = (0..cells.len()).collect();
        prop_assert_eq!(values, expected);
    }
}
