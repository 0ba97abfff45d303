//! Stream processing: buffering, access unit extraction, decoding and
//! sample output.

pub mod buffer;
pub mod decode;
pub mod emit;
pub mod extract;
pub mod pipeline;

/// Two s16 mono 44.1 kHz SFA access units holding the samples
/// `[0, 1000, -1000, 32767]` and `[-32768, 1]`.
pub const EXAMPLE_DATA: &[u8] = &[
    0xF8, 0x7A, 0x10, 0x70, 0x00, 0x04, 0xCC, 0x00, 0x00, 0x03, 0xE8, 0xFC, 0x18, 0x7F, 0xFF,
    0xA2, 0x83, 0xF8, 0x7A, 0x10, 0x70, 0x00, 0x02, 0x82, 0x80, 0x00, 0x00, 0x01, 0xDE, 0xE5,
];
