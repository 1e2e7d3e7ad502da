use std::collections::HashMap;
use std::sync::OnceLock;

use bitflags::bitflags;
use thiserror::Error;

use crate::protocol::{
    opcode::{Opcode, SegRole, TransportService},
    section::{HeaderSection, MAX_HDR_LEN},
};

use super::LayoutError;

bitflags! {
    /// Presence and semantic flags of one packet opcode.
    ///
    /// The low bits declare which optional header sections the packet carries;
    /// the high bits describe what the packet means to the send and receive
    /// paths.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PktFlags: u32 {
        /// Reliable-datagram extended header present.
        const RDETH = 1 << 0;
        /// Datagram extended header present.
        const DETH = 1 << 1;
        /// RDMA extended header present.
        const RETH = 1 << 2;
        /// Atomic-request header present.
        const ATMETH = 1 << 3;
        /// Acknowledge extended header present.
        const AETH = 1 << 4;
        /// Atomic-acknowledge header present.
        const ATMACK = 1 << 5;
        /// Immediate-data header present.
        const IMMDT = 1 << 6;
        /// Invalidate-key header present.
        const IETH = 1 << 7;
        /// Packet carries a payload.
        const PAYLOAD = 1 << 8;

        /// Requester-to-responder packet.
        const REQ = 1 << 9;
        /// Responder-to-requester acknowledgment.
        const ACK = 1 << 10;
        /// Send operation.
        const SEND = 1 << 11;
        /// RDMA write operation.
        const WRITE = 1 << 12;
        /// RDMA read operation.
        const READ = 1 << 13;
        /// Atomic operation.
        const ATOMIC = 1 << 14;
        /// Consumes a receive work request at the responder.
        const RWR = 1 << 15;
        /// Completes a work request.
        const COMP = 1 << 16;
        /// First fragment of a message.
        const START = 1 << 17;
        /// Interior fragment of a message.
        const MIDDLE = 1 << 18;
        /// Last fragment of a message.
        const END = 1 << 19;
    }
}

impl PktFlags {
    const CATEGORIES: PktFlags = PktFlags::SEND
        .union(PktFlags::WRITE)
        .union(PktFlags::READ)
        .union(PktFlags::ATOMIC);

    /// The presence bit declaring `section`, or `None` for the base header,
    /// which every packet carries.
    fn presence_bit(section: HeaderSection) -> Option<PktFlags> {
        match section {
            HeaderSection::Bth => None,
            HeaderSection::Rdeth => Some(PktFlags::RDETH),
            HeaderSection::Deth => Some(PktFlags::DETH),
            HeaderSection::Reth => Some(PktFlags::RETH),
            HeaderSection::Atmeth => Some(PktFlags::ATMETH),
            HeaderSection::Aeth => Some(PktFlags::AETH),
            HeaderSection::Atmack => Some(PktFlags::ATMACK),
            HeaderSection::ImmDt => Some(PktFlags::IMMDT),
            HeaderSection::Ieth => Some(PktFlags::IETH),
            HeaderSection::Payload => Some(PktFlags::PAYLOAD),
        }
    }
}

/// Raised when the authored opcode table fails its construction-time
/// cross-check. Never recoverable: a table that fails here must not serve
/// lookups.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableBuildError {
    #[error("{0:?} is listed more than once")]
    DuplicateOpcode(Opcode),
    #[error("{0:?} has no descriptor")]
    MissingOpcode(Opcode),
    #[error("{name}: start/middle/end flags are not a valid segment role")]
    SegmentFlags { name: &'static str },
    #[error("{name}: expected exactly one of request/acknowledgment")]
    Direction { name: &'static str },
    #[error("{name}: request must carry exactly one operation category")]
    Category { name: &'static str },
    #[error("{name}: fixed header length {len} exceeds {MAX_HDR_LEN}")]
    HeaderTooLong { name: &'static str, len: usize },
    #[error("signature of {second:?} collides with {first:?}")]
    AmbiguousSignature { first: Opcode, second: Opcode },
}

/// Packet operation kind, as carried in an encode signature and reported by
/// decode-side classification.
///
/// The two atomic requests are distinct kinds: their header composition is
/// identical, so the kind is what tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketOp {
    Send,
    Write,
    Read,
    CompareSwap,
    FetchAdd,
    ReadResponse,
    Acknowledge,
    AtomicAcknowledge,
    /// A queue-local operation. Appears only in encode signatures built from
    /// work requests; no descriptor ever has this kind, so selecting it always
    /// reports `NoMatchingOpcode`.
    Local,
}

/// The boolean identity of one opcode: everything the encode side knows when
/// it must pick a wire opcode. Derived from each descriptor at build time and
/// indexed, so encode selection and decode classification are inverses by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    pub transport: TransportService,
    pub op: PacketOp,
    pub role: SegRole,
    pub immediate: bool,
    pub invalidate: bool,
}

impl Signature {
    fn of(opcode: Opcode, info: &OpcodeInfo) -> Signature {
        let flags = info.flags;
        let op = if flags.contains(PktFlags::ACK) {
            if flags.contains(PktFlags::ATMACK) {
                PacketOp::AtomicAcknowledge
            } else if flags.contains(PktFlags::PAYLOAD) {
                PacketOp::ReadResponse
            } else {
                PacketOp::Acknowledge
            }
        } else if flags.contains(PktFlags::SEND) {
            PacketOp::Send
        } else if flags.contains(PktFlags::WRITE) {
            PacketOp::Write
        } else if flags.contains(PktFlags::READ) {
            PacketOp::Read
        } else {
            match opcode {
                Opcode::RcCompareSwap | Opcode::RdCompareSwap => PacketOp::CompareSwap,
                _ => PacketOp::FetchAdd,
            }
        };
        Signature {
            transport: opcode.transport(),
            op,
            role: info.segment_role(),
            immediate: flags.contains(PktFlags::IMMDT),
            invalidate: flags.contains(PktFlags::IETH),
        }
    }
}

/// Immutable descriptor of one packet opcode: semantic flags, fixed header
/// length, and the byte offset of every present section.
#[derive(Debug, Clone)]
pub struct OpcodeInfo {
    opcode: Opcode,
    name: &'static str,
    flags: PktFlags,
    hdr_len: usize,
    offsets: [Option<usize>; HeaderSection::COUNT],
}

impl OpcodeInfo {
    /// Derives header length and section offsets from the authored flags and
    /// the canonical wire order, then checks the descriptor's own invariants.
    fn derive(
        opcode: Opcode,
        name: &'static str,
        flags: PktFlags,
    ) -> Result<OpcodeInfo, TableBuildError> {
        let seg_ok = matches!(
            (
                flags.contains(PktFlags::START),
                flags.contains(PktFlags::MIDDLE),
                flags.contains(PktFlags::END),
            ),
            (true, false, false) | (false, true, false) | (false, false, true) | (true, false, true)
        );
        if !seg_ok {
            return Err(TableBuildError::SegmentFlags { name });
        }

        if flags.contains(PktFlags::REQ) == flags.contains(PktFlags::ACK) {
            return Err(TableBuildError::Direction { name });
        }
        let categories = (flags & PktFlags::CATEGORIES).bits().count_ones();
        let category_ok = if flags.contains(PktFlags::REQ) {
            categories == 1
        } else {
            categories == 0
        };
        if !category_ok {
            return Err(TableBuildError::Category { name });
        }

        let mut offsets = [None; HeaderSection::COUNT];
        let mut off = 0;
        for section in HeaderSection::WIRE_ORDER {
            let present = match PktFlags::presence_bit(section) {
                None => true,
                Some(bit) => flags.contains(bit),
            };
            if present {
                offsets[section.index()] = Some(off);
                off += section.size().unwrap_or(0);
            }
        }
        if off > MAX_HDR_LEN {
            return Err(TableBuildError::HeaderTooLong { name, len: off });
        }

        Ok(OpcodeInfo {
            opcode,
            name,
            flags,
            hdr_len: off,
            offsets,
        })
    }

    #[must_use]
    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Diagnostic label; never used for control decisions.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    #[inline]
    pub fn flags(&self) -> PktFlags {
        self.flags
    }

    /// Total byte length of the fixed (non-payload) header sections.
    #[must_use]
    #[inline]
    pub fn hdr_len(&self) -> usize {
        self.hdr_len
    }

    /// Byte offset of `section`, failing when the section is absent from this
    /// opcode's presence mask.
    pub fn offset_of(&self, section: HeaderSection) -> Result<usize, LayoutError> {
        self.offsets[section.index()]
            .ok_or(LayoutError::SectionNotPresent {
                opcode: self.opcode,
                section,
            })
    }

    /// Present sections with their offsets, in wire order. The walk a parser
    /// follows; the payload, when present, comes last at `hdr_len`.
    pub fn sections(&self) -> impl Iterator<Item = (HeaderSection, usize)> + '_ {
        HeaderSection::WIRE_ORDER
            .into_iter()
            .filter_map(|section| self.offsets[section.index()].map(|off| (section, off)))
    }

    /// Role of this packet in message reassembly.
    #[must_use]
    pub fn segment_role(&self) -> SegRole {
        match (
            self.flags.contains(PktFlags::START),
            self.flags.contains(PktFlags::END),
        ) {
            (true, true) => SegRole::Only,
            (true, false) => SegRole::First,
            (false, true) => SegRole::Last,
            (false, false) => SegRole::Middle,
        }
    }
}

/// The packet opcode registry: one immutable descriptor per defined opcode,
/// plus the signature index the encode side probes.
///
/// Built once, read-only afterwards; lookups take `&self` and the global
/// instance is shared freely across threads.
pub struct OpcodeTable {
    infos: HashMap<Opcode, OpcodeInfo>,
    by_signature: HashMap<Signature, Opcode>,
}

impl OpcodeTable {
    /// Builds every descriptor and runs the exhaustive cross-check. An error
    /// here is a defect in the authored table, not a runtime condition.
    pub fn new() -> Result<OpcodeTable, TableBuildError> {
        let mut infos = HashMap::with_capacity(Opcode::COUNT);
        for (opcode, name, flags) in authored_rows() {
            let info = OpcodeInfo::derive(opcode, name, flags)?;
            if infos.insert(opcode, info).is_some() {
                return Err(TableBuildError::DuplicateOpcode(opcode));
            }
        }
        for opcode in Opcode::ALL {
            if !infos.contains_key(&opcode) {
                return Err(TableBuildError::MissingOpcode(opcode));
            }
        }

        let mut by_signature = HashMap::with_capacity(Opcode::COUNT);
        for opcode in Opcode::ALL {
            let sig = Signature::of(opcode, &infos[&opcode]);
            if let Some(first) = by_signature.insert(sig, opcode) {
                return Err(TableBuildError::AmbiguousSignature {
                    first,
                    second: opcode,
                });
            }
        }

        Ok(OpcodeTable {
            infos,
            by_signature,
        })
    }

    /// The process-wide table. Built on first use; an inconsistent authored
    /// table aborts here, before any lookup can be served.
    pub fn global() -> &'static OpcodeTable {
        static TABLE: OnceLock<OpcodeTable> = OnceLock::new();
        TABLE.get_or_init(|| match OpcodeTable::new() {
            Ok(table) => table,
            Err(e) => panic!("packet opcode table failed its self-check: {e}"),
        })
    }

    /// Descriptor of a known opcode. Infallible: the enumeration is closed and
    /// the build check proved every value has a descriptor.
    #[must_use]
    pub fn get(&self, opcode: Opcode) -> &OpcodeInfo {
        &self.infos[&opcode]
    }

    /// Descriptor of a raw wire byte, failing on reserved gaps.
    pub fn lookup(&self, raw: u8) -> Result<&OpcodeInfo, LayoutError> {
        let opcode = Opcode::try_from(raw).map_err(|_e| LayoutError::UnknownOpcode(raw))?;
        Ok(self.get(opcode))
    }

    /// The one opcode whose identity matches `sig` exactly. Never
    /// approximates: a combination outside the defined table is an error.
    pub fn select(&self, sig: Signature) -> Result<Opcode, LayoutError> {
        self.by_signature
            .get(&sig)
            .copied()
            .ok_or(LayoutError::NoMatchingOpcode(sig))
    }
}

/// The authored table: name and flags per opcode. Offsets and lengths are
/// never written by hand; `OpcodeInfo::derive` computes them from these flags.
#[rustfmt::skip]
fn authored_rows() -> [(Opcode, &'static str, PktFlags); Opcode::COUNT] {
    use Opcode::*;
    use PktFlags as F;
    let req_send = |rest: PktFlags| F::PAYLOAD | F::REQ | F::SEND | rest;
    let req_write = |rest: PktFlags| F::PAYLOAD | F::REQ | F::WRITE | rest;
    [
        (RcSendFirst, "RC_SEND_FIRST",
            req_send(F::RWR | F::START)),
        (RcSendMiddle, "RC_SEND_MIDDLE",
            req_send(F::MIDDLE)),
        (RcSendLast, "RC_SEND_LAST",
            req_send(F::COMP | F::END)),
        (RcSendLastWithImmediate, "RC_SEND_LAST_WITH_IMMEDIATE",
            req_send(F::IMMDT | F::COMP | F::END)),
        (RcSendOnly, "RC_SEND_ONLY",
            req_send(F::COMP | F::RWR | F::START | F::END)),
        (RcSendOnlyWithImmediate, "RC_SEND_ONLY_WITH_IMMEDIATE",
            req_send(F::IMMDT | F::COMP | F::RWR | F::START | F::END)),
        (RcRdmaWriteFirst, "RC_RDMA_WRITE_FIRST",
            req_write(F::RETH | F::START)),
        (RcRdmaWriteMiddle, "RC_RDMA_WRITE_MIDDLE",
            req_write(F::MIDDLE)),
        (RcRdmaWriteLast, "RC_RDMA_WRITE_LAST",
            req_write(F::END)),
        (RcRdmaWriteLastWithImmediate, "RC_RDMA_WRITE_LAST_WITH_IMMEDIATE",
            req_write(F::IMMDT | F::COMP | F::RWR | F::END)),
        (RcRdmaWriteOnly, "RC_RDMA_WRITE_ONLY",
            req_write(F::RETH | F::START | F::END)),
        (RcRdmaWriteOnlyWithImmediate, "RC_RDMA_WRITE_ONLY_WITH_IMMEDIATE",
            req_write(F::RETH | F::IMMDT | F::COMP | F::RWR | F::START | F::END)),
        (RcRdmaReadRequest, "RC_RDMA_READ_REQUEST",
            F::RETH | F::REQ | F::READ | F::START | F::END),
        (RcRdmaReadResponseFirst, "RC_RDMA_READ_RESPONSE_FIRST",
            F::AETH | F::PAYLOAD | F::ACK | F::START),
        (RcRdmaReadResponseMiddle, "RC_RDMA_READ_RESPONSE_MIDDLE",
            F::PAYLOAD | F::ACK | F::MIDDLE),
        (RcRdmaReadResponseLast, "RC_RDMA_READ_RESPONSE_LAST",
            F::AETH | F::PAYLOAD | F::ACK | F::END),
        (RcRdmaReadResponseOnly, "RC_RDMA_READ_RESPONSE_ONLY",
            F::AETH | F::PAYLOAD | F::ACK | F::START | F::END),
        (RcAcknowledge, "RC_ACKNOWLEDGE",
            F::AETH | F::ACK | F::START | F::END),
        (RcAtomicAcknowledge, "RC_ATOMIC_ACKNOWLEDGE",
            F::AETH | F::ATMACK | F::ACK | F::START | F::END),
        (RcCompareSwap, "RC_COMPARE_SWAP",
            F::ATMETH | F::REQ | F::ATOMIC | F::START | F::END),
        (RcFetchAdd, "RC_FETCH_ADD",
            F::ATMETH | F::REQ | F::ATOMIC | F::START | F::END),
        (RcSendLastWithInvalidate, "RC_SEND_LAST_WITH_INVALIDATE",
            req_send(F::IETH | F::COMP | F::END)),
        (RcSendOnlyWithInvalidate, "RC_SEND_ONLY_WITH_INVALIDATE",
            req_send(F::IETH | F::COMP | F::RWR | F::START | F::END)),

        (UcSendFirst, "UC_SEND_FIRST",
            req_send(F::RWR | F::START)),
        (UcSendMiddle, "UC_SEND_MIDDLE",
            req_send(F::MIDDLE)),
        (UcSendLast, "UC_SEND_LAST",
            req_send(F::COMP | F::END)),
        (UcSendLastWithImmediate, "UC_SEND_LAST_WITH_IMMEDIATE",
            req_send(F::IMMDT | F::COMP | F::END)),
        (UcSendOnly, "UC_SEND_ONLY",
            req_send(F::COMP | F::RWR | F::START | F::END)),
        (UcSendOnlyWithImmediate, "UC_SEND_ONLY_WITH_IMMEDIATE",
            req_send(F::IMMDT | F::COMP | F::RWR | F::START | F::END)),
        (UcRdmaWriteFirst, "UC_RDMA_WRITE_FIRST",
            req_write(F::RETH | F::START)),
        (UcRdmaWriteMiddle, "UC_RDMA_WRITE_MIDDLE",
            req_write(F::MIDDLE)),
        (UcRdmaWriteLast, "UC_RDMA_WRITE_LAST",
            req_write(F::END)),
        (UcRdmaWriteLastWithImmediate, "UC_RDMA_WRITE_LAST_WITH_IMMEDIATE",
            req_write(F::IMMDT | F::COMP | F::RWR | F::END)),
        (UcRdmaWriteOnly, "UC_RDMA_WRITE_ONLY",
            req_write(F::RETH | F::START | F::END)),
        (UcRdmaWriteOnlyWithImmediate, "UC_RDMA_WRITE_ONLY_WITH_IMMEDIATE",
            req_write(F::RETH | F::IMMDT | F::COMP | F::RWR | F::START | F::END)),

        (RdSendFirst, "RD_SEND_FIRST",
            req_send(F::RDETH | F::DETH | F::RWR | F::START)),
        (RdSendMiddle, "RD_SEND_MIDDLE",
            req_send(F::RDETH | F::DETH | F::MIDDLE)),
        (RdSendLast, "RD_SEND_LAST",
            req_send(F::RDETH | F::DETH | F::COMP | F::END)),
        (RdSendLastWithImmediate, "RD_SEND_LAST_WITH_IMMEDIATE",
            req_send(F::RDETH | F::DETH | F::IMMDT | F::COMP | F::END)),
        (RdSendOnly, "RD_SEND_ONLY",
            req_send(F::RDETH | F::DETH | F::COMP | F::RWR | F::START | F::END)),
        (RdSendOnlyWithImmediate, "RD_SEND_ONLY_WITH_IMMEDIATE",
            req_send(F::RDETH | F::DETH | F::IMMDT | F::COMP | F::RWR | F::START | F::END)),
        (RdRdmaWriteFirst, "RD_RDMA_WRITE_FIRST",
            req_write(F::RDETH | F::DETH | F::RETH | F::START)),
        (RdRdmaWriteMiddle, "RD_RDMA_WRITE_MIDDLE",
            req_write(F::RDETH | F::DETH | F::MIDDLE)),
        (RdRdmaWriteLast, "RD_RDMA_WRITE_LAST",
            req_write(F::RDETH | F::DETH | F::END)),
        (RdRdmaWriteLastWithImmediate, "RD_RDMA_WRITE_LAST_WITH_IMMEDIATE",
            req_write(F::RDETH | F::DETH | F::IMMDT | F::COMP | F::RWR | F::END)),
        (RdRdmaWriteOnly, "RD_RDMA_WRITE_ONLY",
            req_write(F::RDETH | F::DETH | F::RETH | F::START | F::END)),
        (RdRdmaWriteOnlyWithImmediate, "RD_RDMA_WRITE_ONLY_WITH_IMMEDIATE",
            req_write(F::RDETH | F::DETH | F::RETH | F::IMMDT | F::COMP | F::RWR | F::START | F::END)),
        (RdRdmaReadRequest, "RD_RDMA_READ_REQUEST",
            F::RDETH | F::DETH | F::RETH | F::REQ | F::READ | F::START | F::END),
        (RdRdmaReadResponseFirst, "RD_RDMA_READ_RESPONSE_FIRST",
            F::RDETH | F::AETH | F::PAYLOAD | F::ACK | F::START),
        (RdRdmaReadResponseMiddle, "RD_RDMA_READ_RESPONSE_MIDDLE",
            F::RDETH | F::PAYLOAD | F::ACK | F::MIDDLE),
        (RdRdmaReadResponseLast, "RD_RDMA_READ_RESPONSE_LAST",
            F::RDETH | F::AETH | F::PAYLOAD | F::ACK | F::END),
        (RdRdmaReadResponseOnly, "RD_RDMA_READ_RESPONSE_ONLY",
            F::RDETH | F::AETH | F::PAYLOAD | F::ACK | F::START | F::END),
        (RdAcknowledge, "RD_ACKNOWLEDGE",
            F::RDETH | F::AETH | F::ACK | F::START | F::END),
        (RdAtomicAcknowledge, "RD_ATOMIC_ACKNOWLEDGE",
            F::RDETH | F::AETH | F::ATMACK | F::ACK | F::START | F::END),
        (RdCompareSwap, "RD_COMPARE_SWAP",
            F::RDETH | F::DETH | F::ATMETH | F::REQ | F::ATOMIC | F::START | F::END),
        (RdFetchAdd, "RD_FETCH_ADD",
            F::RDETH | F::DETH | F::ATMETH | F::REQ | F::ATOMIC | F::START | F::END),

        (UdSendOnly, "UD_SEND_ONLY",
            req_send(F::DETH | F::COMP | F::RWR | F::START | F::END)),
        (UdSendOnlyWithImmediate, "UD_SEND_ONLY_WITH_IMMEDIATE",
            req_send(F::DETH | F::IMMDT | F::COMP | F::RWR | F::START | F::END)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::section::{
        AETH_BYTES, ATMACK_BYTES, BTH_BYTES, IMMDT_BYTES, RETH_BYTES,
    };

    #[test]
    fn table_builds() {
        OpcodeTable::new().unwrap();
    }

    #[test]
    fn global_is_shared() {
        let a = OpcodeTable::global();
        let b = OpcodeTable::global();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn layout_totality() {
        let table = OpcodeTable::global();
        for opcode in Opcode::ALL {
            let info = table.get(opcode);
            let sum: usize = HeaderSection::WIRE_ORDER
                .iter()
                .filter(|s| info.offset_of(**s).is_ok())
                .filter_map(|s| s.size())
                .sum();
            assert_eq!(info.hdr_len(), sum, "{}", info.name());
        }
    }

    #[test]
    fn offset_consistency() {
        let table = OpcodeTable::global();
        for opcode in Opcode::ALL {
            let info = table.get(opcode);
            let mut expected = 0;
            for (section, off) in info.sections() {
                assert_eq!(off, expected, "{} {:?}", info.name(), section);
                expected += section.size().unwrap_or(0);
            }
            if info.flags().contains(PktFlags::PAYLOAD) {
                assert_eq!(
                    info.offset_of(HeaderSection::Payload).unwrap(),
                    info.hdr_len()
                );
            } else {
                assert!(info.offset_of(HeaderSection::Payload).is_err());
            }
        }
    }

    #[test]
    fn segmentation_exclusivity() {
        let table = OpcodeTable::global();
        for opcode in Opcode::ALL {
            let flags = table.get(opcode).flags();
            let middle = flags.contains(PktFlags::MIDDLE);
            let edge = flags.intersects(PktFlags::START | PktFlags::END);
            assert!(!(middle && edge), "{opcode:?}");
            assert!(middle || edge, "{opcode:?}");
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let table = OpcodeTable::global();
        for opcode in Opcode::ALL {
            let sig = Signature::of(opcode, table.get(opcode));
            assert_eq!(table.select(sig), Ok(opcode));
        }
    }

    #[test]
    fn bth_offset_is_always_zero() {
        let table = OpcodeTable::global();
        for opcode in Opcode::ALL {
            assert_eq!(table.get(opcode).offset_of(HeaderSection::Bth), Ok(0));
        }
    }

    // Opcode "reliable-connection send-only": a bare base header plus payload.
    #[test]
    fn rc_send_only_layout() {
        let info = OpcodeTable::global().get(Opcode::RcSendOnly);
        assert!(info.flags().contains(
            PktFlags::PAYLOAD
                | PktFlags::REQ
                | PktFlags::RWR
                | PktFlags::COMP
                | PktFlags::START
                | PktFlags::END
        ));
        assert_eq!(info.hdr_len(), BTH_BYTES);
        assert_eq!(
            info.offset_of(HeaderSection::Payload).unwrap(),
            BTH_BYTES
        );
        assert_eq!(info.segment_role(), SegRole::Only);
    }

    // Opcode "reliable-connection RDMA-write-only-with-immediate": base,
    // RDMA extended, immediate, payload, in that order.
    #[test]
    fn rc_write_only_with_immediate_layout() {
        let info = OpcodeTable::global().get(Opcode::RcRdmaWriteOnlyWithImmediate);
        assert!(info
            .flags()
            .contains(PktFlags::RETH | PktFlags::IMMDT | PktFlags::PAYLOAD));
        let walk: Vec<_> = info.sections().collect();
        assert_eq!(
            walk,
            vec![
                (HeaderSection::Bth, 0),
                (HeaderSection::Reth, BTH_BYTES),
                (HeaderSection::ImmDt, BTH_BYTES + RETH_BYTES),
                (HeaderSection::Payload, BTH_BYTES + RETH_BYTES + IMMDT_BYTES),
            ]
        );
        assert_eq!(info.hdr_len(), BTH_BYTES + RETH_BYTES + IMMDT_BYTES);
    }

    #[test]
    fn atomic_acknowledge_section_order() {
        let info = OpcodeTable::global().get(Opcode::RcAtomicAcknowledge);
        let walk: Vec<_> = info.sections().collect();
        assert_eq!(
            walk,
            vec![
                (HeaderSection::Bth, 0),
                (HeaderSection::Aeth, BTH_BYTES),
                (HeaderSection::Atmack, BTH_BYTES + AETH_BYTES),
            ]
        );
        assert_eq!(info.hdr_len(), BTH_BYTES + AETH_BYTES + ATMACK_BYTES);
    }

    #[test]
    fn lookup_rejects_reserved_values() {
        let table = OpcodeTable::global();
        assert_eq!(
            table.lookup(0x15).unwrap_err(),
            LayoutError::UnknownOpcode(0x15)
        );
        assert_eq!(
            table.lookup(0xff).unwrap_err(),
            LayoutError::UnknownOpcode(0xff)
        );
        assert!(table.lookup(0x04).is_ok());
    }

    #[test]
    fn absent_section_is_an_error() {
        let info = OpcodeTable::global().get(Opcode::RcSendOnly);
        assert_eq!(
            info.offset_of(HeaderSection::Reth),
            Err(LayoutError::SectionNotPresent {
                opcode: Opcode::RcSendOnly,
                section: HeaderSection::Reth,
            })
        );
    }

    #[test]
    fn atomics_differ_only_by_kind() {
        let table = OpcodeTable::global();
        let cswp = table.get(Opcode::RcCompareSwap);
        let fadd = table.get(Opcode::RcFetchAdd);
        assert_eq!(cswp.flags(), fadd.flags());
        let sig_cswp = Signature::of(Opcode::RcCompareSwap, cswp);
        let sig_fadd = Signature::of(Opcode::RcFetchAdd, fadd);
        assert_eq!(sig_cswp.op, PacketOp::CompareSwap);
        assert_eq!(sig_fadd.op, PacketOp::FetchAdd);
        assert_ne!(sig_cswp, sig_fadd);
    }

    #[test]
    fn derive_rejects_conflicting_segment_flags() {
        let flags = PktFlags::PAYLOAD
            | PktFlags::REQ
            | PktFlags::SEND
            | PktFlags::MIDDLE
            | PktFlags::END;
        assert_eq!(
            OpcodeInfo::derive(Opcode::RcSendMiddle, "BROKEN", flags).unwrap_err(),
            TableBuildError::SegmentFlags { name: "BROKEN" }
        );
    }

    #[test]
    fn derive_rejects_directionless_descriptor() {
        let flags = PktFlags::PAYLOAD | PktFlags::SEND | PktFlags::START;
        assert_eq!(
            OpcodeInfo::derive(Opcode::RcSendFirst, "BROKEN", flags).unwrap_err(),
            TableBuildError::Direction { name: "BROKEN" }
        );
    }

    #[test]
    fn derive_rejects_multi_category_request() {
        let flags =
            PktFlags::PAYLOAD | PktFlags::REQ | PktFlags::SEND | PktFlags::WRITE | PktFlags::START;
        assert_eq!(
            OpcodeInfo::derive(Opcode::RcSendFirst, "BROKEN", flags).unwrap_err(),
            TableBuildError::Category { name: "BROKEN" }
        );
    }
}
