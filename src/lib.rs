//! # softib
//!
//! Wire-format metadata core of a software RDMA transport.
//!
//! Two read-only registries, built once and shared by any number of readers,
//! answer the questions every packet encoder, packet decoder, and send-path
//! validator must agree on:
//!
//! - which header sections does a packet opcode carry, at what byte offsets,
//!   and what role does the packet play in a multi-packet message
//!   ([`registry::OpcodeTable`]);
//! - is a work request legal on a queue pair of a given transport type, and
//!   what capabilities does the pair imply ([`registry::capability_of`]).
//!
//! [`layout`] composes the two for the concrete encode- and decode-side
//! queries; [`protocol::hdr`] holds the field-level codecs of the individual
//! header sections.

pub mod layout;
pub mod protocol;
pub mod registry;

pub use layout::{classify, wire_opcode, PacketClass};
pub use protocol::opcode::{Opcode, SegRole, TransportService};
pub use protocol::section::HeaderSection;
pub use registry::{
    capability_of, LayoutError, OpcodeInfo, OpcodeTable, PacketOp, PktFlags, QpType, Signature,
    TableBuildError, WrCaps, WrType,
};
