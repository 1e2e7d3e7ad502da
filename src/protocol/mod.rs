//! # Packet structure
//!
//! ```text
//! +-----------------------+
//! |          BTH          |  always present
//! +-----------------------+
//! |  RDETH?  |   DETH?    |  transport extended headers (RD, UD)
//! +-----------------------+
//! | RETH? | ATMETH? | AETH?  per-operation extended headers
//! +-----------------------+
//! |        ATMACK?        |
//! +-----------------------+
//! |   IMMDT?  |   IETH?   |  trailer
//! +-----------------------+
//! |                       |
//! |        Payload?       |
//! |                       |
//! +-----------------------+
//! ```
//!
//! Which sections an opcode carries, and at what offsets, is declared by the
//! opcode registry in [`crate::registry`]; the codecs here only know each
//! section's field layout.
//!
//! # Invariants
//!
//! - sections always appear in the order above
//! - the payload, when present, starts exactly at the fixed header length

pub mod hdr;
pub mod opcode;
pub mod section;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodingError {
    #[error("malformed {field} field")]
    Decoding { field: &'static str },
}
