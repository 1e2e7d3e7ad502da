use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{
    opcode::Opcode,
    section::{
        AETH_BYTES, ATMACK_BYTES, ATMETH_BYTES, BTH_BYTES, DETH_BYTES, IETH_BYTES, IMMDT_BYTES,
        RDETH_BYTES, RETH_BYTES,
    },
    DecodingError,
};

const U24_MAX: u32 = 0x00ff_ffff;

const BTH_SOLICITED_MASK: u8 = 0x80;
const BTH_MIGRATION_MASK: u8 = 0x40;
const BTH_PAD_MASK: u8 = 0x30;
const BTH_TVER_MASK: u8 = 0x0f;
const BTH_ACK_MASK: u32 = 0x8000_0000;

/// Base transport header.
///
/// ```text
/// 0       1       2               4 (BYTE)
/// +-------+-------+---------------+
/// |opcode |se|m|pd|     pkey      |
/// +-------+-------+---------------+
/// | resv  |        dest qp        |
/// +-------+-----------------------+
/// |a| resv|          psn          |
/// +-------+-----------------------+
/// ```
pub struct Bth {
    opcode: Opcode,
    solicited: bool,
    migration: bool,
    pad_count: u8,
    pkey: u16,
    dest_qp: u32,
    ack_request: bool,
    psn: u32,
}

pub struct BthBuilder {
    pub opcode: Opcode,
    pub solicited: bool,
    pub migration: bool,
    /// Payload pad count, `0..=3`.
    pub pad_count: u8,
    pub pkey: u16,
    /// 24-bit destination queue pair number.
    pub dest_qp: u32,
    pub ack_request: bool,
    /// 24-bit packet sequence number.
    pub psn: u32,
}

impl BthBuilder {
    pub fn build(self) -> Bth {
        let this = Bth {
            opcode: self.opcode,
            solicited: self.solicited,
            migration: self.migration,
            pad_count: self.pad_count,
            pkey: self.pkey,
            dest_qp: self.dest_qp,
            ack_request: self.ack_request,
            psn: self.psn,
        };
        this.check_rep();
        this
    }
}

impl Bth {
    #[inline]
    fn check_rep(&self) {
        assert!(self.pad_count <= 3);
        assert!(self.dest_qp <= U24_MAX);
        assert!(self.psn <= U24_MAX);
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let opcode = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "opcode" })?;
        let opcode =
            Opcode::try_from(opcode).map_err(|_e| DecodingError::Decoding { field: "opcode" })?;
        let flags = rdr
            .read_u8()
            .map_err(|_e| DecodingError::Decoding { field: "flags" })?;
        if flags & BTH_TVER_MASK != 0 {
            return Err(DecodingError::Decoding { field: "tver" });
        }
        let pkey = rdr
            .read_u16::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "pkey" })?;
        let qpn = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "dest_qp" })?;
        let apsn = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "psn" })?;

        let this = Bth {
            opcode,
            solicited: flags & BTH_SOLICITED_MASK != 0,
            migration: flags & BTH_MIGRATION_MASK != 0,
            pad_count: (flags & BTH_PAD_MASK) >> 4,
            pkey,
            dest_qp: qpn & U24_MAX,
            ack_request: apsn & BTH_ACK_MASK != 0,
            psn: apsn & U24_MAX,
        };
        this.check_rep();
        Ok(this)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u8(u8::from(self.opcode)).unwrap();
        let mut flags = (self.pad_count << 4) & BTH_PAD_MASK;
        if self.solicited {
            flags |= BTH_SOLICITED_MASK;
        }
        if self.migration {
            flags |= BTH_MIGRATION_MASK;
        }
        hdr.write_u8(flags).unwrap();
        hdr.write_u16::<BigEndian>(self.pkey).unwrap();
        hdr.write_u32::<BigEndian>(self.dest_qp).unwrap();
        let mut apsn = self.psn;
        if self.ack_request {
            apsn |= BTH_ACK_MASK;
        }
        hdr.write_u32::<BigEndian>(apsn).unwrap();
        assert_eq!(hdr.len(), BTH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[must_use]
    #[inline]
    pub fn solicited(&self) -> bool {
        self.solicited
    }

    #[must_use]
    #[inline]
    pub fn migration(&self) -> bool {
        self.migration
    }

    #[must_use]
    #[inline]
    pub fn pad_count(&self) -> u8 {
        self.pad_count
    }

    #[must_use]
    #[inline]
    pub fn pkey(&self) -> u16 {
        self.pkey
    }

    #[must_use]
    #[inline]
    pub fn dest_qp(&self) -> u32 {
        self.dest_qp
    }

    #[must_use]
    #[inline]
    pub fn ack_request(&self) -> bool {
        self.ack_request
    }

    #[must_use]
    #[inline]
    pub fn psn(&self) -> u32 {
        self.psn
    }
}

/// Reliable-datagram extended header: 24-bit end-to-end context.
pub struct Rdeth {
    ee_context: u32,
}

impl Rdeth {
    pub fn new(ee_context: u32) -> Self {
        let this = Rdeth { ee_context };
        this.check_rep();
        this
    }

    #[inline]
    fn check_rep(&self) {
        assert!(self.ee_context <= U24_MAX);
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let word = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "ee_context" })?;
        Ok(Rdeth::new(word & U24_MAX))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u32::<BigEndian>(self.ee_context).unwrap();
        assert_eq!(hdr.len(), RDETH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn ee_context(&self) -> u32 {
        self.ee_context
    }
}

/// Datagram extended header: queue key and 24-bit source queue pair.
pub struct Deth {
    qkey: u32,
    src_qp: u32,
}

pub struct DethBuilder {
    pub qkey: u32,
    /// 24-bit source queue pair number.
    pub src_qp: u32,
}

impl DethBuilder {
    pub fn build(self) -> Deth {
        let this = Deth {
            qkey: self.qkey,
            src_qp: self.src_qp,
        };
        this.check_rep();
        this
    }
}

impl Deth {
    #[inline]
    fn check_rep(&self) {
        assert!(self.src_qp <= U24_MAX);
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let qkey = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "qkey" })?;
        let sqp = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "src_qp" })?;
        let this = Deth {
            qkey,
            src_qp: sqp & U24_MAX,
        };
        this.check_rep();
        Ok(this)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u32::<BigEndian>(self.qkey).unwrap();
        hdr.write_u32::<BigEndian>(self.src_qp).unwrap();
        assert_eq!(hdr.len(), DETH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn qkey(&self) -> u32 {
        self.qkey
    }

    #[must_use]
    #[inline]
    pub fn src_qp(&self) -> u32 {
        self.src_qp
    }
}

/// RDMA extended header: remote address, key, and DMA length.
pub struct Reth {
    va: u64,
    rkey: u32,
    dma_len: u32,
}

pub struct RethBuilder {
    pub va: u64,
    pub rkey: u32,
    pub dma_len: u32,
}

impl RethBuilder {
    pub fn build(self) -> Reth {
        Reth {
            va: self.va,
            rkey: self.rkey,
            dma_len: self.dma_len,
        }
    }
}

impl Reth {
    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let va = rdr
            .read_u64::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "va" })?;
        let rkey = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "rkey" })?;
        let dma_len = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "dma_len" })?;
        Ok(Reth { va, rkey, dma_len })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u64::<BigEndian>(self.va).unwrap();
        hdr.write_u32::<BigEndian>(self.rkey).unwrap();
        hdr.write_u32::<BigEndian>(self.dma_len).unwrap();
        assert_eq!(hdr.len(), RETH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn va(&self) -> u64 {
        self.va
    }

    #[must_use]
    #[inline]
    pub fn rkey(&self) -> u32 {
        self.rkey
    }

    #[must_use]
    #[inline]
    pub fn dma_len(&self) -> u32 {
        self.dma_len
    }
}

/// Atomic-request header: remote address, key, swap/add and compare operands.
pub struct Atmeth {
    va: u64,
    rkey: u32,
    swap_add: u64,
    comp: u64,
}

pub struct AtmethBuilder {
    pub va: u64,
    pub rkey: u32,
    pub swap_add: u64,
    pub comp: u64,
}

impl AtmethBuilder {
    pub fn build(self) -> Atmeth {
        Atmeth {
            va: self.va,
            rkey: self.rkey,
            swap_add: self.swap_add,
            comp: self.comp,
        }
    }
}

impl Atmeth {
    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let va = rdr
            .read_u64::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "va" })?;
        let rkey = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "rkey" })?;
        let swap_add = rdr
            .read_u64::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "swap_add" })?;
        let comp = rdr
            .read_u64::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "comp" })?;
        Ok(Atmeth {
            va,
            rkey,
            swap_add,
            comp,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u64::<BigEndian>(self.va).unwrap();
        hdr.write_u32::<BigEndian>(self.rkey).unwrap();
        hdr.write_u64::<BigEndian>(self.swap_add).unwrap();
        hdr.write_u64::<BigEndian>(self.comp).unwrap();
        assert_eq!(hdr.len(), ATMETH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn va(&self) -> u64 {
        self.va
    }

    #[must_use]
    #[inline]
    pub fn rkey(&self) -> u32 {
        self.rkey
    }

    #[must_use]
    #[inline]
    pub fn swap_add(&self) -> u64 {
        self.swap_add
    }

    #[must_use]
    #[inline]
    pub fn comp(&self) -> u64 {
        self.comp
    }
}

/// Acknowledge extended header: syndrome and 24-bit message sequence number.
pub struct Aeth {
    syndrome: u8,
    msn: u32,
}

pub struct AethBuilder {
    pub syndrome: u8,
    /// 24-bit message sequence number.
    pub msn: u32,
}

impl AethBuilder {
    pub fn build(self) -> Aeth {
        let this = Aeth {
            syndrome: self.syndrome,
            msn: self.msn,
        };
        this.check_rep();
        this
    }
}

impl Aeth {
    #[inline]
    fn check_rep(&self) {
        assert!(self.msn <= U24_MAX);
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let word = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "smsn" })?;
        let this = Aeth {
            syndrome: (word >> 24) as u8,
            msn: word & U24_MAX,
        };
        this.check_rep();
        Ok(this)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u32::<BigEndian>(u32::from(self.syndrome) << 24 | self.msn)
            .unwrap();
        assert_eq!(hdr.len(), AETH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn syndrome(&self) -> u8 {
        self.syndrome
    }

    #[must_use]
    #[inline]
    pub fn msn(&self) -> u32 {
        self.msn
    }
}

/// Atomic-acknowledge header: the original value read at the responder.
pub struct Atmack {
    orig: u64,
}

impl Atmack {
    pub fn new(orig: u64) -> Self {
        Atmack { orig }
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let orig = rdr
            .read_u64::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "orig" })?;
        Ok(Atmack { orig })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u64::<BigEndian>(self.orig).unwrap();
        assert_eq!(hdr.len(), ATMACK_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn orig(&self) -> u64 {
        self.orig
    }
}

/// Immediate-data header, passed through to the receive completion opaquely.
pub struct ImmDt {
    imm: u32,
}

impl ImmDt {
    pub fn new(imm: u32) -> Self {
        ImmDt { imm }
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let imm = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "imm" })?;
        Ok(ImmDt { imm })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u32::<BigEndian>(self.imm).unwrap();
        assert_eq!(hdr.len(), IMMDT_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn imm(&self) -> u32 {
        self.imm
    }
}

/// Invalidate-key header: the remote key the receiver must invalidate.
pub struct Ieth {
    rkey: u32,
}

impl Ieth {
    pub fn new(rkey: u32) -> Self {
        Ieth { rkey }
    }

    pub fn from_bytes(rdr: &mut io::Cursor<&[u8]>) -> Result<Self, DecodingError> {
        let rkey = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "rkey" })?;
        Ok(Ieth { rkey })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u32::<BigEndian>(self.rkey).unwrap();
        assert_eq!(hdr.len(), IETH_BYTES);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn rkey(&self) -> u32 {
        self.rkey
    }
}
