use bitflags::bitflags;

use crate::protocol::opcode::TransportService;

bitflags! {
    /// Capabilities implied by a (work-request type, queue-pair type) pair.
    ///
    /// The empty mask means the pair is illegal: callers check `!is_empty()`
    /// before treating a request as postable, then individual bits (such as
    /// `INLINE`) to pick an encoding strategy. Exactly one of the operation
    /// category bits is set in any non-empty mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WrCaps: u32 {
        /// Inline payload encoding is permitted.
        const INLINE = 1 << 0;
        const SEND = 1 << 1;
        const WRITE = 1 << 2;
        const READ = 1 << 3;
        const ATOMIC = 1 << 4;
        /// Queue-local operation; produces no packet.
        const LOCAL = 1 << 5;
    }
}

impl WrCaps {
    pub const CATEGORIES: WrCaps = WrCaps::SEND
        .union(WrCaps::WRITE)
        .union(WrCaps::READ)
        .union(WrCaps::ATOMIC)
        .union(WrCaps::LOCAL);
}

/// Work-request types a caller may post. Closed, versionless set fixed by the
/// wire specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrType {
    Send,
    SendWithImm,
    RdmaWrite,
    RdmaWriteWithImm,
    RdmaRead,
    AtomicCmpAndSwp,
    AtomicFetchAndAdd,
    SendWithInv,
    RdmaReadWithInv,
    LocalInv,
    RegMr,
    BindMw,
}

impl WrType {
    pub const COUNT: usize = 12;

    pub const ALL: [WrType; Self::COUNT] = [
        WrType::Send,
        WrType::SendWithImm,
        WrType::RdmaWrite,
        WrType::RdmaWriteWithImm,
        WrType::RdmaRead,
        WrType::AtomicCmpAndSwp,
        WrType::AtomicFetchAndAdd,
        WrType::SendWithInv,
        WrType::RdmaReadWithInv,
        WrType::LocalInv,
        WrType::RegMr,
        WrType::BindMw,
    ];
}

/// Queue-pair transport types. `Gsi` is the management-datagram variant; it
/// exists only on this side of the registry and shares the `Ud` opcode space
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QpType {
    Rc,
    Uc,
    Rd,
    Ud,
    Gsi,
}

impl QpType {
    pub const COUNT: usize = 5;

    pub const ALL: [QpType; Self::COUNT] =
        [QpType::Rc, QpType::Uc, QpType::Rd, QpType::Ud, QpType::Gsi];

    /// Wire transport service class packets of this queue pair carry.
    #[must_use]
    pub fn transport(&self) -> TransportService {
        match self {
            QpType::Rc => TransportService::Rc,
            QpType::Uc => TransportService::Uc,
            QpType::Rd => TransportService::Rd,
            QpType::Ud | QpType::Gsi => TransportService::Ud,
        }
    }
}

/// Capability mask of a (work-request type, queue-pair type) pair.
///
/// Total over both enumerations; the empty mask is the "unsupported" signal,
/// a value rather than an error, so the send-path validator stays a single
/// probe with no error branch.
#[must_use]
pub fn capability_of(wr: WrType, qp: QpType) -> WrCaps {
    use QpType::*;
    use WrType::*;
    match (wr, qp) {
        (Send | SendWithImm, Gsi | Rc | Uc | Ud) => WrCaps::INLINE | WrCaps::SEND,
        (SendWithInv, Rc | Uc | Ud) => WrCaps::INLINE | WrCaps::SEND,
        (RdmaWrite | RdmaWriteWithImm, Rc | Uc) => WrCaps::INLINE | WrCaps::WRITE,
        (RdmaRead | RdmaReadWithInv, Rc) => WrCaps::READ,
        (AtomicCmpAndSwp | AtomicFetchAndAdd, Rc) => WrCaps::ATOMIC,
        (LocalInv | RegMr, Rc) => WrCaps::LOCAL,
        (BindMw, Rc | Uc) => WrCaps::LOCAL,
        _ => WrCaps::empty(),
    }
}
