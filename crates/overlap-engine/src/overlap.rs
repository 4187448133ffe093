//! Side-by-side layout for a whole list of blocks.
//!
//! [`compute_overlap`] walks the blocks in input order, builds each block's
//! overlap group and packs it into a single table shared by all groups.
//! Groups share members, so most blocks are seen several times; only the
//! first group a block appears in decides its placement.

use serde::Serialize;
use tracing::debug;

use crate::block::TimeBlock;
use crate::cluster::cluster;
use crate::error::Result;
use crate::packer::{place_into, Overlap, PlacementTable};
use crate::placing::HorizontalPlacing;

/// An input item together with its rendering geometry.
///
/// Serializes as the item's own fields plus a `placing` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placed<T, P = HorizontalPlacing> {
    #[serde(flatten)]
    pub item: T,
    pub placing: P,
}

/// Compute a placement for every block.
///
/// The result holds one record per distinct id. Blocks that overlap nothing
/// get the full track (`start 0, span 1, columns 1`).
///
/// # Errors
///
/// Returns an [`OverlapError`](crate::OverlapError) if packing any group
/// breaks an invariant; see [`place_into`]. The first failing group aborts
/// the whole layout, and no partial table is returned.
///
/// This is not limited to hand-built or corrupted input. Ordinary calendars
/// can produce [`IncompatibleColumns`](crate::OverlapError::IncompatibleColumns)
/// when a block first placed in a quarter-width group later meets a group
/// that only needs halves. Five blocks are enough:
///
/// ```
/// use overlap_engine::{compute_overlap, OverlapError, PlanItem};
///
/// let items = vec![
///     PlanItem::new("b0", "", 90, 90),
///     PlanItem::new("b1", "", 89, 29),
///     PlanItem::new("b2", "", 176, 64),
///     PlanItem::new("b3", "", 89, 89),
///     PlanItem::new("b4", "", 105, 8),
/// ];
/// assert_eq!(
///     compute_overlap(&items),
///     Err(OverlapError::IncompatibleColumns { columns: 2, previous: 4 })
/// );
/// ```
///
/// [`add_placing`] and [`add_placing_with`] propagate the same error, so
/// callers that must always draw something should fall back to full-width
/// geometry themselves.
///
/// # Examples
///
/// ```
/// use overlap_engine::{compute_overlap, PlanItem};
///
/// let items = vec![
///     PlanItem::new("a", "", 0, 30),
///     PlanItem::new("b", "", 10, 20),
///     PlanItem::new("c", "", 20, 10),
///     PlanItem::new("lunch", "", 720, 60),
/// ];
/// let table = compute_overlap(&items).unwrap();
///
/// let c = table.get("c").unwrap();
/// assert_eq!((c.start, c.span, c.columns), (2, 1, 3));
/// let lunch = table.get("lunch").unwrap();
/// assert_eq!((lunch.start, lunch.span, lunch.columns), (0, 1, 1));
/// ```
pub fn compute_overlap<B: TimeBlock>(items: &[B]) -> Result<PlacementTable> {
    let mut table = PlacementTable::new();
    for index in 0..items.len() {
        let group = cluster(index, items);
        place_into(&group, &mut table)?;
    }
    debug!(blocks = items.len(), placed = table.len(), "computed overlap layout");
    Ok(table)
}

/// Attach percentage geometry to every item.
///
/// Shorthand for [`add_placing_with`] using [`HorizontalPlacing::from_overlap`].
pub fn add_placing<T: TimeBlock>(items: Vec<T>) -> Result<Vec<Placed<T>>> {
    add_placing_with(items, HorizontalPlacing::from_overlap)
}

/// Attach geometry produced by `to_placing` to every item, keeping order.
///
/// `to_placing` receives the item's record, or `None` if it has none.
///
/// # Examples
///
/// ```
/// use overlap_engine::{add_placing_with, PlanItem};
///
/// let items = vec![PlanItem::new("a", "", 0, 60), PlanItem::new("b", "", 30, 60)];
/// let placed = add_placing_with(items, |overlap| overlap.map(|o| o.start)).unwrap();
///
/// assert_eq!(placed[0].placing, Some(0));
/// assert_eq!(placed[1].placing, Some(1));
/// ```
pub fn add_placing_with<T, P, F>(items: Vec<T>, mut to_placing: F) -> Result<Vec<Placed<T, P>>>
where
    T: TimeBlock,
    F: FnMut(Option<&Overlap>) -> P,
{
    let table = compute_overlap(&items)?;
    Ok(items
        .into_iter()
        .map(|item| {
            let placing = to_placing(table.get(item.id()));
            Placed { item, placing }
        })
        .collect())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::PlanItem;
    use crate::cluster::overlaps;
    use crate::error::OverlapError;
    use crate::fraction::Fraction;
    use std::num::NonZeroUsize;
    use crate::packer::place;
    use proptest::prelude::*;

    fn block(id: &str, start: i64, end: i64) -> PlanItem {
        PlanItem::new(id, "", start, end - start)
    }

    fn triple(table: &PlacementTable, id: &str) -> (i64, i64, i64) {
        let o = table
            .get(id)
            .unwrap_or_else(|| panic!("no placement for {id}"));
        (o.start, o.span, o.columns)
    }

    fn assert_disjoint(table: &PlacementTable, ids: &[&str]) {
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let (x, y) = (table.get(a).unwrap(), table.get(b).unwrap());
                let apart = x.end() <= y.offset() || y.end() <= x.offset();
                assert!(apart, "{a} {x:?} collides with {b} {y:?}");
            }
        }
    }

    // ── compute_overlap scenarios ───────────────────────────────────────

    #[test]
    fn test_empty_input() {
        let items: Vec<PlanItem> = Vec::new();
        assert!(compute_overlap(&items).unwrap().is_empty());
    }

    #[test]
    fn test_lone_block_is_full_width() {
        let items = vec![block("a", 540, 600)];
        let table = compute_overlap(&items).unwrap();
        assert_eq!(triple(&table, "a"), (0, 1, 1));
    }

    #[test]
    fn test_three_staggered_blocks_ending_together() {
        let items = vec![block("a", 0, 30), block("b", 10, 30), block("c", 20, 30)];
        let table = compute_overlap(&items).unwrap();
        assert_eq!(triple(&table, "a"), (0, 1, 3));
        assert_eq!(triple(&table, "b"), (1, 1, 3));
        assert_eq!(triple(&table, "c"), (2, 1, 3));
    }

    #[test]
    fn test_nested_block_takes_second_half() {
        let items = vec![block("outer", 0, 60), block("inner", 30, 40)];
        let table = compute_overlap(&items).unwrap();
        assert_eq!(triple(&table, "outer"), (0, 1, 2));
        assert_eq!(triple(&table, "inner"), (1, 1, 2));
    }

    #[test]
    fn test_sequential_blocks_are_each_full_width() {
        let items = vec![block("a", 0, 30), block("b", 30, 60), block("c", 60, 90)];
        let table = compute_overlap(&items).unwrap();
        for id in ["a", "b", "c"] {
            assert_eq!(triple(&table, id), (0, 1, 1), "block {id}");
        }
    }

    #[test]
    fn test_chain_with_disjoint_fourth_block() {
        let items = vec![
            block("1", 0, 30),
            block("2", 20, 50),
            block("3", 40, 70),
            block("4", 100, 110),
        ];
        let table = compute_overlap(&items).unwrap();

        assert_eq!(triple(&table, "1"), (0, 1, 2));
        assert_eq!(triple(&table, "2"), (1, 1, 2));
        // "3" never shares a group with "1", so it reuses the left half.
        assert_eq!(triple(&table, "3"), (0, 1, 2));
        assert_eq!(triple(&table, "4"), (0, 1, 1));
    }

    #[test]
    fn test_reversed_equal_blocks_get_one_column_each() {
        let forward = vec![block("a", 0, 60), block("b", 0, 60), block("c", 0, 60)];
        let mut reversed = forward.clone();
        reversed.reverse();

        for items in [forward, reversed] {
            let table = compute_overlap(&items).unwrap();
            let mut starts: Vec<i64> = ["a", "b", "c"]
                .iter()
                .map(|id| {
                    let (start, span, columns) = triple(&table, id);
                    assert_eq!((span, columns), (1, 3));
                    start
                })
                .collect();
            starts.sort_unstable();
            assert_eq!(starts, [0, 1, 2]);
        }
    }

    #[test]
    fn test_reversed_input_follows_scan_order() {
        let items = vec![block("c", 0, 60), block("b", 0, 60), block("a", 0, 60)];
        let table = compute_overlap(&items).unwrap();
        assert_eq!(triple(&table, "c"), (0, 1, 3));
        assert_eq!(triple(&table, "b"), (1, 1, 3));
        assert_eq!(triple(&table, "a"), (2, 1, 3));
    }

    #[test]
    fn test_later_group_packs_around_earlier_placement() {
        let items = vec![
            block("x", 0, 30),
            block("y", 10, 100),
            block("z", 40, 100),
            block("w", 50, 100),
        ];
        let table = compute_overlap(&items).unwrap();

        assert_eq!(triple(&table, "x"), (0, 1, 2));
        // "y" keeps the half it got alongside "x".
        assert_eq!(triple(&table, "y"), (1, 1, 2));
        assert_eq!(triple(&table, "z"), (0, 1, 4));
        assert_eq!(triple(&table, "w"), (1, 1, 4));

        assert_disjoint(&table, &["y", "z", "w"]);
        let total: Fraction = ["y", "z", "w"]
            .iter()
            .map(|id| table.get(id).unwrap().width())
            .sum();
        assert_eq!(total, Fraction::ONE);
    }

    #[test]
    fn test_blocks_placed_in_separate_passes_can_share_columns() {
        // "a" and "b" overlap, but "a" is packed with "c" and "b" with "d"
        // before any group holds both, so they land in the same column.
        let items = vec![
            block("a", 0, 100),
            block("c", 0, 40),
            block("d", 120, 160),
            block("b", 50, 150),
        ];
        let table = compute_overlap(&items).unwrap();

        assert!(overlaps(&items[0], &items[3]));
        assert_eq!(triple(&table, "a"), (0, 1, 2));
        assert_eq!(triple(&table, "c"), (1, 1, 2));
        assert_eq!(triple(&table, "b"), (0, 1, 2));
        assert_eq!(triple(&table, "d"), (1, 1, 2));
    }

    #[test]
    fn test_zero_length_blocks_are_tolerated() {
        let items = vec![block("meeting", 0, 60), block("ping", 30, 30), block("end", 60, 60)];
        let table = compute_overlap(&items).unwrap();
        assert_eq!(triple(&table, "meeting"), (0, 1, 2));
        assert_eq!(triple(&table, "ping"), (1, 1, 2));
        assert_eq!(triple(&table, "end"), (0, 1, 1));
    }

    #[test]
    fn test_new_block_shrinks_beside_earlier_placement() {
        // "y" holds the middle third from the first pass. "w" only meets "y",
        // is entitled to two thirds, and gets the single free column before it.
        let items = vec![
            block("x", 0, 60),
            block("y", 0, 120),
            block("z", 0, 60),
            block("w", 90, 120),
        ];
        let table = compute_overlap(&items).unwrap();

        assert_eq!(triple(&table, "y"), (1, 1, 3));
        assert_eq!(triple(&table, "w"), (0, 1, 3));
        assert_disjoint(&table, &["y", "w"]);
        let total = table.get("y").unwrap().width() + table.get("w").unwrap().width();
        assert_eq!(total, Fraction::new(2, 3));
    }

    fn quarter_then_halves() -> Vec<PlanItem> {
        vec![
            block("b0", 90, 180),
            block("b1", 89, 118),
            block("b2", 176, 240),
            block("b3", 89, 178),
            block("b4", 105, 113),
        ]
    }

    #[test]
    fn test_ordinary_calendar_can_hit_incompatible_columns() {
        // The first pass puts b0, b1, b3 and b4 in quarters. The b2 pass sees
        // b3 and b0 holding half the track and one new block, so it needs two
        // columns, which a four-column record cannot be mapped onto.
        let items = quarter_then_halves();
        assert_eq!(
            compute_overlap(&items),
            Err(OverlapError::IncompatibleColumns {
                columns: 2,
                previous: 4
            })
        );
    }

    #[test]
    fn test_add_placing_fails_for_whole_list() {
        let err = add_placing(quarter_then_halves()).unwrap_err();
        assert!(err.to_string().contains("Incompatible columns"), "got: {err}");
    }

    // ── add_placing ─────────────────────────────────────────────────────

    #[test]
    fn test_add_placing_keeps_input_order() {
        let items = vec![block("b", 30, 40), block("a", 0, 60), block("solo", 90, 120)];
        let placed = add_placing(items).unwrap();

        let ids: Vec<&str> = placed.iter().map(|p| p.item.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "solo"]);

        assert_eq!(placed[0].placing.x_offset_percent, 50.0);
        assert_eq!(placed[1].placing.x_offset_percent, 0.0);
        assert_eq!(placed[2].placing, HorizontalPlacing::FULL);
    }

    #[test]
    fn test_placed_serializes_flat() {
        let placed = add_placing(vec![PlanItem::new("a", "Focus", 60, 30)]).unwrap();
        let json = serde_json::to_value(&placed[0]).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["text"], "Focus");
        assert_eq!(json["startMinutes"], 60);
        assert_eq!(json["placing"]["widthPercent"], 100.0);
    }

    #[test]
    fn test_add_placing_with_custom_mapper_sees_every_item() {
        let items = vec![block("a", 0, 60), block("b", 30, 90)];
        let mut seen = 0;
        let placed = add_placing_with(items, |overlap| {
            seen += 1;
            overlap.copied()
        })
        .unwrap();
        assert_eq!(seen, 2);
        assert_eq!(
            placed[1].placing,
            Some(Overlap {
                start: 1,
                span: 1,
                columns: 2
            })
        );
    }

    // ── Properties ──────────────────────────────────────────────────────

    fn arb_items(max: usize) -> impl Strategy<Value = Vec<PlanItem>> {
        prop::collection::vec((0i64..300, 0i64..120), 0..max).prop_map(|spans| {
            spans
                .into_iter()
                .enumerate()
                .map(|(i, (start, duration))| PlanItem::new(format!("b{i}"), "", start, duration))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_common_minute_splits_evenly(
            bounds in prop::collection::vec((0i64..100, 101i64..200), 1..8),
        ) {
            let items: Vec<PlanItem> = bounds
                .iter()
                .enumerate()
                .map(|(i, (start, end))| block(&format!("b{i}"), *start, *end))
                .collect();
            let n = items.len() as i64;

            let table = compute_overlap(&items).unwrap();
            let mut starts = Vec::new();
            for item in &items {
                let o = table.get(&item.id).unwrap();
                prop_assert_eq!((o.span, o.columns), (1, n));
                starts.push(o.start);
            }
            starts.sort_unstable();
            prop_assert_eq!(starts, (0..n).collect::<Vec<_>>());
        }

        #[test]
        fn prop_records_are_well_formed(items in arb_items(12)) {
            let result = compute_overlap(&items);
            prop_assume!(result.is_ok(), "layout rejected: {:?}", result);
            let table = result.unwrap();

            prop_assert_eq!(table.len(), items.len());
            for (_, o) in table.iter() {
                prop_assert!(o.start >= 0);
                prop_assert!(o.span >= 1);
                prop_assert!(o.start + o.span <= o.columns);
            }
        }

        #[test]
        fn prop_repacking_any_group_is_a_no_op(items in arb_items(12)) {
            let result = compute_overlap(&items);
            prop_assume!(result.is_ok(), "layout rejected: {:?}", result);
            let table = result.unwrap();

            for index in 0..items.len() {
                let group = cluster(index, &items);
                prop_assert_eq!(&place(&group, &table).unwrap(), &table);
            }
        }

        #[test]
        fn prop_layout_errors_come_from_group_shape(items in arb_items(12)) {
            // Records written by the engine itself are always well formed and
            // leave a free column for every new block.
            if let Err(err) = compute_overlap(&items) {
                prop_assert!(
                    matches!(
                        err,
                        OverlapError::IncompatibleColumns { .. }
                            | OverlapError::OverfullCluster { .. }
                    ),
                    "unexpected error: {}",
                    err
                );
            }
        }

        #[test]
        fn prop_each_pass_splits_the_free_track(items in arb_items(12)) {
            let mut table = PlacementTable::new();
            for index in 0..items.len() {
                let group = cluster(index, &items);
                let before = table.clone();
                if place_into(&group, &mut table).is_err() {
                    prop_assert_eq!(&table, &before);
                    break;
                }

                let (placed, new): (Vec<&str>, Vec<&str>) = group
                    .iter()
                    .map(|b| b.id.as_str())
                    .partition(|id| before.contains(id));
                let Some(new_count) = NonZeroUsize::new(new.len()) else {
                    prop_assert_eq!(&table, &before);
                    continue;
                };

                let occupied: Fraction = placed.iter().map(|id| before.get(id).unwrap().width()).sum();
                let share = (Fraction::ONE - occupied).div_count(new_count);

                let mut shrunk = false;
                for (i, id) in new.iter().enumerate() {
                    let x = table.get(id).unwrap();
                    prop_assert!(x.width() <= share);
                    shrunk |= x.width() < share;
                    for other in placed.iter().chain(&new[i + 1..]) {
                        let y = table.get(other).unwrap();
                        let apart = x.end() <= y.offset() || y.end() <= x.offset();
                        prop_assert!(apart, "{} {:?} collides with {} {:?}", id, x, other, y);
                    }
                }

                // A new block only gets less than its share when a placed
                // member splits the free columns.
                let total: Fraction = group.iter().map(|b| table.get(&b.id).unwrap().width()).sum();
                if shrunk {
                    prop_assert!(total < Fraction::ONE, "total {}", total);
                } else {
                    prop_assert_eq!(total, Fraction::ONE);
                }
            }
        }
    }
}
