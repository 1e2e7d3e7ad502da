pub const BTH_BYTES: usize = 12;
pub const RDETH_BYTES: usize = 4;
pub const DETH_BYTES: usize = 8;
pub const RETH_BYTES: usize = 16;
pub const ATMETH_BYTES: usize = 28;
pub const AETH_BYTES: usize = 4;
pub const ATMACK_BYTES: usize = 8;
pub const IMMDT_BYTES: usize = 4;
pub const IETH_BYTES: usize = 4;

/// Upper bound on the fixed header sections of any defined opcode.
pub const MAX_HDR_LEN: usize = 80;

/// One portion of a packet header.
///
/// Every kind except `Payload` has a fixed byte size. Declaration order is the
/// wire order: the base header first, transport extended headers next,
/// per-operation extended headers after that, the immediate/invalidate trailer
/// second to last, and the payload always trailing the fixed sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderSection {
    /// Base transport header.
    Bth,
    /// Reliable-datagram extended header.
    Rdeth,
    /// Datagram extended header.
    Deth,
    /// RDMA extended header.
    Reth,
    /// Atomic-request header.
    Atmeth,
    /// Acknowledge extended header.
    Aeth,
    /// Atomic-acknowledge header.
    Atmack,
    /// Immediate-data header.
    ImmDt,
    /// Invalidate-key header.
    Ieth,
    /// Variable-length payload.
    Payload,
}

impl HeaderSection {
    pub const COUNT: usize = 10;

    /// All sections in the order they appear on the wire.
    pub const WIRE_ORDER: [HeaderSection; Self::COUNT] = [
        HeaderSection::Bth,
        HeaderSection::Rdeth,
        HeaderSection::Deth,
        HeaderSection::Reth,
        HeaderSection::Atmeth,
        HeaderSection::Aeth,
        HeaderSection::Atmack,
        HeaderSection::ImmDt,
        HeaderSection::Ieth,
        HeaderSection::Payload,
    ];

    /// Byte size of the section, or `None` for the variable-length payload.
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        match self {
            HeaderSection::Bth => Some(BTH_BYTES),
            HeaderSection::Rdeth => Some(RDETH_BYTES),
            HeaderSection::Deth => Some(DETH_BYTES),
            HeaderSection::Reth => Some(RETH_BYTES),
            HeaderSection::Atmeth => Some(ATMETH_BYTES),
            HeaderSection::Aeth => Some(AETH_BYTES),
            HeaderSection::Atmack => Some(ATMACK_BYTES),
            HeaderSection::ImmDt => Some(IMMDT_BYTES),
            HeaderSection::Ieth => Some(IETH_BYTES),
            HeaderSection::Payload => None,
        }
    }

    #[must_use]
    #[inline]
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_order_covers_every_kind_once() {
        for (i, section) in HeaderSection::WIRE_ORDER.iter().enumerate() {
            assert_eq!(section.index(), i);
        }
    }

    #[test]
    fn only_payload_is_unsized() {
        for section in HeaderSection::WIRE_ORDER {
            match section {
                HeaderSection::Payload => assert!(section.size().is_none()),
                _ => assert!(section.size().is_some()),
            }
        }
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(HeaderSection::Bth.size(), Some(12));
        assert_eq!(HeaderSection::Atmeth.size(), Some(28));
        assert_eq!(HeaderSection::Atmack.size(), Some(8));
    }
}
