use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Transport service class carried in an opcode's high bits.
///
/// Management-datagram queue pairs use the `Ud` opcode space on the wire, so
/// they have no service class of their own here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportService {
    /// Reliable connection.
    Rc,
    /// Unreliable connection.
    Uc,
    /// Reliable datagram.
    Rd,
    /// Unreliable datagram.
    Ud,
}

/// Role of a packet in reassembling a multi-packet message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegRole {
    First,
    Middle,
    Last,
    /// Both first and last: the sole fragment of its message.
    Only,
}

/// Wire-level packet opcode: operation and transport service type combined.
///
/// Discriminants are the on-wire values. Reserved gaps (0x15, 0x18..=0x1f,
/// 0x2c..=0x3f, 0x55..=0x63, 0x66..) are unrepresentable; converting a raw
/// byte in a gap fails, which is the `UnknownOpcode` signal at the decode
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    RcSendFirst = 0x00,
    RcSendMiddle = 0x01,
    RcSendLast = 0x02,
    RcSendLastWithImmediate = 0x03,
    RcSendOnly = 0x04,
    RcSendOnlyWithImmediate = 0x05,
    RcRdmaWriteFirst = 0x06,
    RcRdmaWriteMiddle = 0x07,
    RcRdmaWriteLast = 0x08,
    RcRdmaWriteLastWithImmediate = 0x09,
    RcRdmaWriteOnly = 0x0a,
    RcRdmaWriteOnlyWithImmediate = 0x0b,
    RcRdmaReadRequest = 0x0c,
    RcRdmaReadResponseFirst = 0x0d,
    RcRdmaReadResponseMiddle = 0x0e,
    RcRdmaReadResponseLast = 0x0f,
    RcRdmaReadResponseOnly = 0x10,
    RcAcknowledge = 0x11,
    RcAtomicAcknowledge = 0x12,
    RcCompareSwap = 0x13,
    RcFetchAdd = 0x14,
    RcSendLastWithInvalidate = 0x16,
    RcSendOnlyWithInvalidate = 0x17,

    UcSendFirst = 0x20,
    UcSendMiddle = 0x21,
    UcSendLast = 0x22,
    UcSendLastWithImmediate = 0x23,
    UcSendOnly = 0x24,
    UcSendOnlyWithImmediate = 0x25,
    UcRdmaWriteFirst = 0x26,
    UcRdmaWriteMiddle = 0x27,
    UcRdmaWriteLast = 0x28,
    UcRdmaWriteLastWithImmediate = 0x29,
    UcRdmaWriteOnly = 0x2a,
    UcRdmaWriteOnlyWithImmediate = 0x2b,

    RdSendFirst = 0x40,
    RdSendMiddle = 0x41,
    RdSendLast = 0x42,
    RdSendLastWithImmediate = 0x43,
    RdSendOnly = 0x44,
    RdSendOnlyWithImmediate = 0x45,
    RdRdmaWriteFirst = 0x46,
    RdRdmaWriteMiddle = 0x47,
    RdRdmaWriteLast = 0x48,
    RdRdmaWriteLastWithImmediate = 0x49,
    RdRdmaWriteOnly = 0x4a,
    RdRdmaWriteOnlyWithImmediate = 0x4b,
    RdRdmaReadRequest = 0x4c,
    RdRdmaReadResponseFirst = 0x4d,
    RdRdmaReadResponseMiddle = 0x4e,
    RdRdmaReadResponseLast = 0x4f,
    RdRdmaReadResponseOnly = 0x50,
    RdAcknowledge = 0x51,
    RdAtomicAcknowledge = 0x52,
    RdCompareSwap = 0x53,
    RdFetchAdd = 0x54,

    UdSendOnly = 0x64,
    UdSendOnlyWithImmediate = 0x65,
}

impl Opcode {
    pub const COUNT: usize = 58;

    /// Every defined opcode, in wire-value order.
    pub const ALL: [Opcode; Self::COUNT] = [
        Opcode::RcSendFirst,
        Opcode::RcSendMiddle,
        Opcode::RcSendLast,
        Opcode::RcSendLastWithImmediate,
        Opcode::RcSendOnly,
        Opcode::RcSendOnlyWithImmediate,
        Opcode::RcRdmaWriteFirst,
        Opcode::RcRdmaWriteMiddle,
        Opcode::RcRdmaWriteLast,
        Opcode::RcRdmaWriteLastWithImmediate,
        Opcode::RcRdmaWriteOnly,
        Opcode::RcRdmaWriteOnlyWithImmediate,
        Opcode::RcRdmaReadRequest,
        Opcode::RcRdmaReadResponseFirst,
        Opcode::RcRdmaReadResponseMiddle,
        Opcode::RcRdmaReadResponseLast,
        Opcode::RcRdmaReadResponseOnly,
        Opcode::RcAcknowledge,
        Opcode::RcAtomicAcknowledge,
        Opcode::RcCompareSwap,
        Opcode::RcFetchAdd,
        Opcode::RcSendLastWithInvalidate,
        Opcode::RcSendOnlyWithInvalidate,
        Opcode::UcSendFirst,
        Opcode::UcSendMiddle,
        Opcode::UcSendLast,
        Opcode::UcSendLastWithImmediate,
        Opcode::UcSendOnly,
        Opcode::UcSendOnlyWithImmediate,
        Opcode::UcRdmaWriteFirst,
        Opcode::UcRdmaWriteMiddle,
        Opcode::UcRdmaWriteLast,
        Opcode::UcRdmaWriteLastWithImmediate,
        Opcode::UcRdmaWriteOnly,
        Opcode::UcRdmaWriteOnlyWithImmediate,
        Opcode::RdSendFirst,
        Opcode::RdSendMiddle,
        Opcode::RdSendLast,
        Opcode::RdSendLastWithImmediate,
        Opcode::RdSendOnly,
        Opcode::RdSendOnlyWithImmediate,
        Opcode::RdRdmaWriteFirst,
        Opcode::RdRdmaWriteMiddle,
        Opcode::RdRdmaWriteLast,
        Opcode::RdRdmaWriteLastWithImmediate,
        Opcode::RdRdmaWriteOnly,
        Opcode::RdRdmaWriteOnlyWithImmediate,
        Opcode::RdRdmaReadRequest,
        Opcode::RdRdmaReadResponseFirst,
        Opcode::RdRdmaReadResponseMiddle,
        Opcode::RdRdmaReadResponseLast,
        Opcode::RdRdmaReadResponseOnly,
        Opcode::RdAcknowledge,
        Opcode::RdAtomicAcknowledge,
        Opcode::RdCompareSwap,
        Opcode::RdFetchAdd,
        Opcode::UdSendOnly,
        Opcode::UdSendOnlyWithImmediate,
    ];

    /// Transport service type, from the wire value's high bits.
    #[must_use]
    pub fn transport(&self) -> TransportService {
        match u8::from(*self) >> 5 {
            0b000 => TransportService::Rc,
            0b001 => TransportService::Uc,
            0b010 => TransportService::Rd,
            _ => TransportService::Ud,
        }
    }
}
