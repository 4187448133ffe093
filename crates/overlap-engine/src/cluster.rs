//! Overlap clustering.
//!
//! For a given block, collect the blocks that overlap it *and each other*.
//! The group is grown by a single greedy scan over the input in its original
//! order: a candidate joins only if it overlaps every block already in the
//! group. This is not a transitive closure. Two blocks that each overlap a
//! third but not one another never share a group, and which of them wins
//! depends on input order.

use crate::block::TimeBlock;

/// Whether two blocks overlap in time.
///
/// The pair is ordered by start; they overlap when the earlier block ends
/// strictly after the later one starts. Blocks that only touch end-to-start
/// do not overlap.
///
/// # Examples
///
/// ```
/// use overlap_engine::{overlaps, PlanItem};
///
/// let a = PlanItem::new("a", "", 0, 30);
/// let b = PlanItem::new("b", "", 30, 30);
/// let c = PlanItem::new("c", "", 29, 30);
/// assert!(!overlaps(&a, &b));
/// assert!(overlaps(&a, &c));
/// ```
pub fn overlaps<A: TimeBlock + ?Sized, B: TimeBlock + ?Sized>(a: &A, b: &B) -> bool {
    if a.start_minutes() < b.start_minutes() {
        a.end_minutes() > b.start_minutes()
    } else {
        b.end_minutes() > a.start_minutes()
    }
}

/// The overlap group of `items[index]`, sorted by start time.
///
/// The group always contains the block itself, first among blocks with the
/// same start. Other blocks are considered in input order and skipped by
/// position, so duplicates of the block elsewhere in `items` are candidates
/// like any other block. Returns an empty group when `index` is out of range.
///
/// # Examples
///
/// ```
/// use overlap_engine::{cluster, PlanItem, TimeBlock};
///
/// let items = vec![
///     PlanItem::new("a", "", 0, 30),
///     PlanItem::new("b", "", 20, 30),
///     PlanItem::new("c", "", 40, 30),
/// ];
/// let ids: Vec<&str> = cluster(1, &items).into_iter().map(|b| b.id()).collect();
/// // "c" overlaps "b" but not "a", which was accepted first.
/// assert_eq!(ids, ["a", "b"]);
/// ```
pub fn cluster<B: TimeBlock>(index: usize, items: &[B]) -> Vec<&B> {
    let Some(item) = items.get(index) else {
        return Vec::new();
    };

    let mut group = vec![item];
    for (i, candidate) in items.iter().enumerate() {
        if i == index {
            continue;
        }
        if group.iter().all(|member| overlaps(*member, candidate)) {
            group.push(candidate);
        }
    }

    // Stable, so the block itself stays ahead of later equal starts.
    group.sort_by_key(|block| block.start_minutes());
    group
}
