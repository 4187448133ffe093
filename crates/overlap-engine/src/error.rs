//! Error types for overlap-engine operations.
//!
//! Every variant is an invariant violation: the clustering step produced a
//! group the packer cannot lay out, or the placement table was fed records
//! that do not belong together. They are reported instead of clamped, since
//! a clamped layout would silently draw blocks on top of each other.

use thiserror::Error;

use crate::fraction::Fraction;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlapError {
    #[error("Overfull cluster: already placed blocks claim {occupied} of the track")]
    OverfullCluster { occupied: Fraction },

    #[error("Incompatible columns: cannot rescale {previous} columns onto {columns}")]
    IncompatibleColumns { columns: i64, previous: i64 },

    #[error("Malformed record for '{id}': columns [{start}, {start} + {span}) of {columns}")]
    MalformedRecord {
        id: String,
        start: i64,
        span: i64,
        columns: i64,
    },

    #[error("No free slot for '{id}' in a track of {columns} columns")]
    NoFreeSlot { id: String, columns: i64 },
}

pub type Result<T> = std::result::Result<T, OverlapError>;
