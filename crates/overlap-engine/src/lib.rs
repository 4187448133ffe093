//! # overlap-engine
//!
//! Deterministic side-by-side layout for overlapping calendar blocks.
//!
//! Given a day's worth of time blocks, the engine decides which blocks share
//! horizontal space and assigns each one an exact slice of the track, so a
//! renderer can draw overlapping blocks next to each other while blocks that
//! overlap nothing keep the full width. All widths are exact fractions: the
//! members of a group always add up to precisely one track.
//!
//! Every call is a pure function of its input. Nothing is cached between
//! calls and nothing is mutated in place.
//!
//! ## Modules
//!
//! - [`fraction`]: Exact rational numbers in lowest terms
//! - [`block`]: The [`TimeBlock`] trait and the [`PlanItem`] agenda entry
//! - [`cluster`](mod@cluster): Overlap test and order-sensitive overlap groups
//! - [`packer`]: Exact fractional slot packing into a [`PlacementTable`]
//! - [`overlap`]: Whole-list layout: [`compute_overlap`] and [`add_placing`]
//! - [`placing`]: Percentage geometry for renderers
//! - [`error`]: Error types

pub mod block;
pub mod cluster;
pub mod error;
pub mod fraction;
pub mod overlap;
pub mod packer;
pub mod placing;

pub use block::{PlanItem, TimeBlock};
pub use cluster::{cluster, overlaps};
pub use error::OverlapError;
pub use fraction::Fraction;
pub use overlap::{add_placing, add_placing_with, compute_overlap, Placed};
pub use packer::{place, place_into, Overlap, PlacementTable};
pub use placing::HorizontalPlacing;
