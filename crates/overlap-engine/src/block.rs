//! Time blocks: the items the engine lays out.
//!
//! The engine only needs three things from an item: a stable identity, a
//! start, and an end, all expressed as whole minutes from a shared origin
//! (usually midnight of the day being rendered). Anything that can answer
//! those questions implements [`TimeBlock`].
//!
//! # Preconditions
//!
//! `end_minutes()` should be `>= start_minutes()`. The engine does not reject
//! zero-length or inverted blocks; a zero-length block simply overlaps
//! nothing that starts at or after it.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// An interval with identity, measured in minutes from a common origin.
pub trait TimeBlock {
    /// Opaque identifier, unique within one call and stable across calls.
    fn id(&self) -> &str;

    fn start_minutes(&self) -> i64;

    /// Derived end of the block. Must be deterministic.
    fn end_minutes(&self) -> i64;
}

impl<T: TimeBlock + ?Sized> TimeBlock for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn start_minutes(&self) -> i64 {
        (**self).start_minutes()
    }

    fn end_minutes(&self) -> i64 {
        (**self).end_minutes()
    }
}

/// A planned agenda entry: a labelled block with a start and a duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub start_minutes: i64,
    pub duration_minutes: i64,
}

impl PlanItem {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        start_minutes: i64,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start_minutes,
            duration_minutes,
        }
    }

    /// Build an item from two wall-clock times on the same day.
    ///
    /// Minutes are counted from midnight. An `end` earlier than `start` is
    /// read as running past midnight into the next day.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveTime;
    /// use overlap_engine::{PlanItem, TimeBlock};
    ///
    /// let start = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
    /// let end = NaiveTime::from_hms_opt(10, 15, 0).unwrap();
    /// let item = PlanItem::from_clock_times("standup", "Standup", start, end);
    /// assert_eq!(item.start_minutes(), 570);
    /// assert_eq!(item.end_minutes(), 615);
    /// ```
    pub fn from_clock_times(
        id: impl Into<String>,
        text: impl Into<String>,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        let start_minutes = minutes_since_midnight(start);
        let mut end_minutes = minutes_since_midnight(end);
        if end_minutes < start_minutes {
            end_minutes += MINUTES_PER_DAY;
        }
        Self::new(id, text, start_minutes, end_minutes - start_minutes)
    }
}

impl TimeBlock for PlanItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn start_minutes(&self) -> i64 {
        self.start_minutes
    }

    fn end_minutes(&self) -> i64 {
        self.start_minutes + self.duration_minutes
    }
}

fn minutes_since_midnight(t: NaiveTime) -> i64 {
    (t.num_seconds_from_midnight() / 60) as i64
}
