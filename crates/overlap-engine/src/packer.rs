//! Fractional slot packing.
//!
//! Given one overlap group and the placements recorded so far, assign every
//! not-yet-placed block a horizontal slot range. The free part of the track
//! (one minus the width already claimed by placed members) is split evenly
//! between the new blocks using exact fractions. The common denominator of
//! that share becomes the number of columns for the new records.
//!
//! Placements are never revisited: a block that already has a record keeps
//! it, even if the group it now appears in would lay it out differently.
//! Placed members are only rescaled locally to find out which columns they
//! cover.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::block::TimeBlock;
use crate::error::{OverlapError, Result};
use crate::fraction::Fraction;

// ── Overlap record ──────────────────────────────────────────────────────────

/// Horizontal placement of one block.
///
/// The block covers columns `[start, start + span)` of a track divided into
/// `columns` equal parts. Records in the same group may use different column
/// counts when they were placed in different passes, so always compare them
/// through [`Overlap::offset`] and [`Overlap::width`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Overlap {
    pub start: i64,
    pub span: i64,
    pub columns: i64,
}

impl Overlap {
    /// Left edge as a fraction of the track.
    pub fn offset(&self) -> Fraction {
        Fraction::new(self.start, self.columns)
    }

    /// Width as a fraction of the track.
    pub fn width(&self) -> Fraction {
        Fraction::new(self.span, self.columns)
    }

    /// Right edge as a fraction of the track.
    pub fn end(&self) -> Fraction {
        Fraction::new(self.start + self.span, self.columns)
    }
}

// ── Placement table ─────────────────────────────────────────────────────────

/// Placements by block id.
///
/// The table only grows. Once a block has a record it is never replaced or
/// removed, which is what keeps earlier placements stable while later groups
/// are packed around them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlacementTable {
    entries: HashMap<String, Overlap>,
}

impl PlacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Overlap> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, record)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Overlap)> {
        self.entries.iter().map(|(id, overlap)| (id.as_str(), overlap))
    }

    /// Record a placement unless `id` already has one. Returns whether the
    /// record was stored.
    pub(crate) fn insert_new(&mut self, id: &str, overlap: Overlap) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), overlap);
        true
    }
}

// ── place ───────────────────────────────────────────────────────────────────

/// Pack one overlap group, returning an extended copy of `table`.
///
/// `table` itself is left untouched. See [`place_into`] for the algorithm.
///
/// # Errors
///
/// Same as [`place_into`].
///
/// # Examples
///
/// ```
/// use overlap_engine::{place, PlacementTable, PlanItem};
///
/// let a = PlanItem::new("a", "", 0, 60);
/// let b = PlanItem::new("b", "", 30, 10);
/// let table = place(&[&a, &b], &PlacementTable::new()).unwrap();
///
/// let a = table.get("a").unwrap();
/// assert_eq!((a.start, a.span, a.columns), (0, 1, 2));
/// let b = table.get("b").unwrap();
/// assert_eq!((b.start, b.span, b.columns), (1, 1, 2));
/// ```
pub fn place<B: TimeBlock>(group: &[B], table: &PlacementTable) -> Result<PlacementTable> {
    let mut extended = table.clone();
    place_into(group, &mut extended)?;
    Ok(extended)
}

/// Pack one overlap group into `table` in place.
///
/// Blocks of `group` that already have a record are left as they are. The
/// rest share what is left of the track:
///
/// 1. `occupied` is the exact sum of the placed members' widths.
/// 2. Each new block is entitled to `(1 - occupied) / new_count`; call it
///    `n / d` in lowest terms. The new records use `d` columns.
/// 3. Placed members are rescaled to `d` columns and their ranges marked as
///    taken.
/// 4. New blocks, in group order, start at the first free column and span
///    `n` columns, shrunk to stop at the next taken column if one comes
///    sooner.
///
/// On error `table` is left exactly as it was.
///
/// # Errors
///
/// - [`OverlapError::MalformedRecord`] if a placed member's record does not
///   describe a non-empty range inside its own track.
/// - [`OverlapError::OverfullCluster`] if placed members already claim the
///   whole track (or more) while new blocks still need room.
/// - [`OverlapError::IncompatibleColumns`] if a placed record's column count
///   does not divide the new column count.
/// - [`OverlapError::NoFreeSlot`] if every column is taken before all new
///   blocks are placed.
pub fn place_into<B: TimeBlock>(group: &[B], table: &mut PlacementTable) -> Result<()> {
    let (placed, unplaced): (Vec<&B>, Vec<&B>) =
        group.iter().partition(|block| table.contains(block.id()));

    let Some(new_count) = NonZeroUsize::new(unplaced.len()) else {
        return Ok(());
    };

    let placed: Vec<Overlap> = placed
        .iter()
        .filter_map(|block| Some((block.id(), *table.get(block.id())?)))
        .map(|(id, previous)| check_record(id, &previous).map(|()| previous))
        .collect::<Result<_>>()?;

    let occupied: Fraction = placed.iter().map(Overlap::width).sum();
    if occupied >= Fraction::ONE {
        warn!(%occupied, new_blocks = new_count.get(), "overlap group has no room left");
        return Err(OverlapError::OverfullCluster { occupied });
    }

    let share = (Fraction::ONE - occupied).div_count(new_count);
    let columns = share.denom();
    let inherent_span = share.numer();

    debug!(
        placed = placed.len(),
        new_blocks = new_count.get(),
        %occupied,
        %share,
        columns,
        "packing overlap group"
    );

    let mut track = Track::new(columns);
    for previous in &placed {
        track.mark_rescaled(previous, columns)?;
    }

    let mut records = Vec::with_capacity(unplaced.len());
    for block in unplaced {
        let Some(start) = track.first_free() else {
            warn!(id = block.id(), columns, "overlap group ran out of columns");
            return Err(OverlapError::NoFreeSlot {
                id: block.id().to_string(),
                columns,
            });
        };

        let room = match track.next_taken_after(start) {
            Some(taken) => taken - start,
            None => columns - start,
        };
        let span = inherent_span.min(room);
        track.mark(start, start + span);

        trace!(id = block.id(), start, span, columns, "placed block");
        records.push((block, Overlap { start, span, columns }));
    }

    for (block, overlap) in records {
        // A repeated id inside one group keeps its first record.
        table.insert_new(block.id(), overlap);
    }
    Ok(())
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// A placed record must cover at least one column of its own track.
fn check_record(id: &str, overlap: &Overlap) -> Result<()> {
    let Overlap { start, span, columns } = *overlap;
    if columns >= 1 && start >= 0 && span >= 1 && span <= columns - start {
        return Ok(());
    }
    warn!(id, start, span, columns, "malformed placement record");
    Err(OverlapError::MalformedRecord {
        id: id.to_string(),
        start,
        span,
        columns,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Taken,
}

/// Column occupancy for one packing pass.
struct Track {
    slots: Vec<Slot>,
}

impl Track {
    fn new(columns: i64) -> Self {
        Self {
            slots: vec![Slot::Empty; columns.max(0) as usize],
        }
    }

    fn len(&self) -> i64 {
        self.slots.len() as i64
    }

    /// Mark a placed record's range after scaling it to `columns`. The record
    /// must already have passed [`check_record`].
    fn mark_rescaled(&mut self, previous: &Overlap, columns: i64) -> Result<()> {
        if columns % previous.columns != 0 {
            warn!(columns, previous = previous.columns, "cannot rescale placed block");
            return Err(OverlapError::IncompatibleColumns {
                columns,
                previous: previous.columns,
            });
        }
        let scale = columns / previous.columns;
        let start = previous.start * scale;
        self.mark(start, start + previous.span * scale);
        Ok(())
    }

    /// Mark `[from, to)` as taken, clamped to the track.
    fn mark(&mut self, from: i64, to: i64) {
        let to = to.clamp(0, self.len());
        let from = from.clamp(0, to);
        for slot in &mut self.slots[from as usize..to as usize] {
            *slot = Slot::Taken;
        }
    }

    fn first_free(&self) -> Option<i64> {
        self.slots
            .iter()
            .position(|slot| *slot == Slot::Empty)
            .map(|i| i as i64)
    }

    fn next_taken_after(&self, index: i64) -> Option<i64> {
        let from = (index + 1) as usize;
        self.slots
            .get(from..)?
            .iter()
            .position(|slot| *slot == Slot::Taken)
            .map(|offset| (from + offset) as i64)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
