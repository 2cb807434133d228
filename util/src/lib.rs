//! Shared byte-order plumbing used by the encoder and the output writer.

/// The compiler's single source of truth for word endianness: RV32I instruction
/// words are always emitted little-endian, regardless of the host's native order.
pub type Endian = byteorder::LittleEndian;
