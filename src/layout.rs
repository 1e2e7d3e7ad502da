//! Layout and validation queries layered over the registries.
//!
//! Stateless and reentrant: every function is a pure probe of the immutable
//! tables, so any number of threads may call in without coordination.

use crate::protocol::{
    opcode::{Opcode, SegRole, TransportService},
    section::HeaderSection,
};
use crate::registry::{LayoutError, OpcodeTable, PacketOp, PktFlags, Signature, WrType};

/// Everything a packet parser needs to know about a received opcode: the
/// service type, the reassembly role, and the ordered walk of present
/// sections down to the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketClass {
    pub opcode: Opcode,
    pub transport: TransportService,
    pub role: SegRole,
    pub flags: PktFlags,
    pub hdr_len: usize,
    /// Present sections and byte offsets in wire order; the payload, when
    /// carried, is the final entry at offset `hdr_len`.
    pub sections: Vec<(HeaderSection, usize)>,
}

/// Classifies a received raw opcode byte, failing on reserved values.
pub fn classify(raw: u8) -> Result<PacketClass, LayoutError> {
    let info = OpcodeTable::global().lookup(raw)?;
    Ok(PacketClass {
        opcode: info.opcode(),
        transport: info.opcode().transport(),
        role: info.segment_role(),
        flags: info.flags(),
        hdr_len: info.hdr_len(),
        sections: info.sections().collect(),
    })
}

/// The wire opcode for one fragment of a work request.
///
/// Immediate-data and invalidate-key trailers ride only on the fragment that
/// ends the message, so the caller states the work-request type and the
/// fragment's position and this layer derives what that packet carries.
/// Combinations outside the defined table fail with
/// [`LayoutError::NoMatchingOpcode`]; queue-local requests always do, since
/// they produce no packet.
pub fn wire_opcode(
    wr: WrType,
    transport: TransportService,
    role: SegRole,
) -> Result<Opcode, LayoutError> {
    OpcodeTable::global().select(signature_for(wr, transport, role))
}

fn signature_for(wr: WrType, transport: TransportService, role: SegRole) -> Signature {
    let (op, wants_imm, wants_inv) = match wr {
        WrType::Send => (PacketOp::Send, false, false),
        WrType::SendWithImm => (PacketOp::Send, true, false),
        WrType::SendWithInv => (PacketOp::Send, false, true),
        WrType::RdmaWrite => (PacketOp::Write, false, false),
        WrType::RdmaWriteWithImm => (PacketOp::Write, true, false),
        WrType::RdmaRead | WrType::RdmaReadWithInv => (PacketOp::Read, false, false),
        WrType::AtomicCmpAndSwp => (PacketOp::CompareSwap, false, false),
        WrType::AtomicFetchAndAdd => (PacketOp::FetchAdd, false, false),
        WrType::LocalInv | WrType::RegMr | WrType::BindMw => (PacketOp::Local, false, false),
    };
    let ends_message = matches!(role, SegRole::Last | SegRole::Only);
    Signature {
        transport,
        op,
        role,
        immediate: wants_imm && ends_message,
        invalidate: wants_inv && ends_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::section::{BTH_BYTES, IMMDT_BYTES, RETH_BYTES};

    #[test]
    fn send_with_immediate_progression() {
        let t = TransportService::Rc;
        let wr = WrType::SendWithImm;
        assert_eq!(
            wire_opcode(wr, t, SegRole::First),
            Ok(Opcode::RcSendFirst)
        );
        assert_eq!(
            wire_opcode(wr, t, SegRole::Middle),
            Ok(Opcode::RcSendMiddle)
        );
        assert_eq!(
            wire_opcode(wr, t, SegRole::Last),
            Ok(Opcode::RcSendLastWithImmediate)
        );
        assert_eq!(
            wire_opcode(wr, t, SegRole::Only),
            Ok(Opcode::RcSendOnlyWithImmediate)
        );
    }

    #[test]
    fn write_with_immediate_on_unreliable_connection() {
        assert_eq!(
            wire_opcode(WrType::RdmaWriteWithImm, TransportService::Uc, SegRole::Last),
            Ok(Opcode::UcRdmaWriteLastWithImmediate)
        );
        assert_eq!(
            wire_opcode(WrType::RdmaWriteWithImm, TransportService::Uc, SegRole::Only),
            Ok(Opcode::UcRdmaWriteOnlyWithImmediate)
        );
    }

    #[test]
    fn send_with_invalidate_rides_the_end() {
        assert_eq!(
            wire_opcode(WrType::SendWithInv, TransportService::Rc, SegRole::Only),
            Ok(Opcode::RcSendOnlyWithInvalidate)
        );
        assert_eq!(
            wire_opcode(WrType::SendWithInv, TransportService::Rc, SegRole::First),
            Ok(Opcode::RcSendFirst)
        );
    }

    #[test]
    fn reads_and_atomics_are_single_fragment() {
        assert_eq!(
            wire_opcode(WrType::RdmaRead, TransportService::Rc, SegRole::Only),
            Ok(Opcode::RcRdmaReadRequest)
        );
        assert_eq!(
            wire_opcode(WrType::AtomicCmpAndSwp, TransportService::Rc, SegRole::Only),
            Ok(Opcode::RcCompareSwap)
        );
        assert_eq!(
            wire_opcode(WrType::AtomicFetchAndAdd, TransportService::Rc, SegRole::Only),
            Ok(Opcode::RcFetchAdd)
        );
        assert!(wire_opcode(WrType::RdmaRead, TransportService::Rc, SegRole::First).is_err());
    }

    #[test]
    fn undefined_combinations_fail_loudly() {
        // No read opcode exists outside RC and RD.
        assert!(wire_opcode(WrType::RdmaRead, TransportService::Uc, SegRole::Only).is_err());
        // UD is single-packet only.
        assert!(wire_opcode(WrType::Send, TransportService::Ud, SegRole::First).is_err());
        assert_eq!(
            wire_opcode(WrType::Send, TransportService::Ud, SegRole::Only),
            Ok(Opcode::UdSendOnly)
        );
    }

    #[test]
    fn local_requests_produce_no_packet() {
        for wr in [WrType::LocalInv, WrType::RegMr, WrType::BindMw] {
            for role in [SegRole::First, SegRole::Middle, SegRole::Last, SegRole::Only] {
                assert!(matches!(
                    wire_opcode(wr, TransportService::Rc, role),
                    Err(LayoutError::NoMatchingOpcode(_))
                ));
            }
        }
    }

    #[test]
    fn classify_write_only_with_immediate() {
        let class = classify(u8::from(Opcode::RcRdmaWriteOnlyWithImmediate)).unwrap();
        assert_eq!(class.transport, TransportService::Rc);
        assert_eq!(class.role, SegRole::Only);
        assert_eq!(class.hdr_len, BTH_BYTES + RETH_BYTES + IMMDT_BYTES);
        assert_eq!(
            class.sections,
            vec![
                (HeaderSection::Bth, 0),
                (HeaderSection::Reth, BTH_BYTES),
                (HeaderSection::ImmDt, BTH_BYTES + RETH_BYTES),
                (HeaderSection::Payload, class.hdr_len),
            ]
        );
    }

    #[test]
    fn classify_rejects_reserved_bytes() {
        assert_eq!(classify(0x2c), Err(LayoutError::UnknownOpcode(0x2c)));
    }

    #[test]
    fn classification_feeds_back_into_selection() {
        // Decode-side classification and encode-side selection are inverses
        // for every per-fragment opcode a work request can produce.
        let cases = [
            (WrType::Send, TransportService::Rc),
            (WrType::SendWithImm, TransportService::Uc),
            (WrType::RdmaWriteWithImm, TransportService::Rc),
            (WrType::Send, TransportService::Rd),
        ];
        for (wr, transport) in cases {
            for role in [SegRole::First, SegRole::Middle, SegRole::Last, SegRole::Only] {
                let Ok(opcode) = wire_opcode(wr, transport, role) else {
                    continue;
                };
                let class = classify(u8::from(opcode)).unwrap();
                assert_eq!(class.role, role);
                assert_eq!(class.transport, transport);
                assert_eq!(wire_opcode(wr, transport, class.role), Ok(opcode));
            }
        }
    }
}
