//! The two read-only registries: per-opcode header composition and
//! per-work-request capabilities. Both are built before any concurrent access
//! and never mutated; lookups are pure and lock-free.

mod opcode_table;
mod wr_table;

pub use opcode_table::*;
pub use wr_table::*;

use thiserror::Error;

use crate::protocol::{opcode::Opcode, section::HeaderSection};

/// Errors reported by registry and layout queries. None of these are
/// transient: each one means the caller supplied an input the static tables
/// do not define, and the caller's move is to reject the operation, not retry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Raw opcode byte falls outside the defined range or in a reserved gap.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    /// Offset requested for a section absent from the opcode's presence mask.
    #[error("{section:?} is not present in {opcode:?}")]
    SectionNotPresent {
        opcode: Opcode,
        section: HeaderSection,
    },
    /// No descriptor matches the encode-side signature exactly.
    #[error("no opcode matches {0:?}")]
    NoMatchingOpcode(Signature),
}
