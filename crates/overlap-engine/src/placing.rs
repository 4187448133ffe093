//! Presentation geometry for placed blocks.
//!
//! Renderers usually position blocks with percentages of the column they
//! are drawn in. [`HorizontalPlacing`] is that view of an [`Overlap`]
//! record. This is the only place where fractions become floating point.

use serde::{Deserialize, Serialize};

use crate::packer::Overlap;

/// Width and left offset of a block, as percentages of the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPlacing {
    pub width_percent: f64,
    pub x_offset_percent: f64,
}

impl HorizontalPlacing {
    /// Full width, flush left.
    pub const FULL: HorizontalPlacing = HorizontalPlacing {
        width_percent: 100.0,
        x_offset_percent: 0.0,
    };

    /// Geometry for an optional placement record.
    ///
    /// A block without a record is drawn across the whole track.
    ///
    /// # Examples
    ///
    /// ```
    /// use overlap_engine::{HorizontalPlacing, Overlap};
    ///
    /// let overlap = Overlap { start: 1, span: 1, columns: 4 };
    /// let placing = HorizontalPlacing::from_overlap(Some(&overlap));
    /// assert_eq!(placing.width_percent, 25.0);
    /// assert_eq!(placing.x_offset_percent, 25.0);
    ///
    /// assert_eq!(HorizontalPlacing::from_overlap(None), HorizontalPlacing::FULL);
    /// ```
    pub fn from_overlap(overlap: Option<&Overlap>) -> Self {
        match overlap {
            Some(overlap) => HorizontalPlacing {
                width_percent: overlap.width().to_f64() * 100.0,
                x_offset_percent: overlap.offset().to_f64() * 100.0,
            },
            None => HorizontalPlacing::FULL,
        }
    }
}

impl Default for HorizontalPlacing {
    fn default() -> Self {
        HorizontalPlacing::FULL
    }
}
