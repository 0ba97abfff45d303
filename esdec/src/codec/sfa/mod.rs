//! Simple Framed Audio: PCM payloads behind a sync word and CRC-protected
//! header. See [`header`] for the bit layout.

pub mod decoder;
pub mod header;
pub mod parser;
pub mod writer;

pub use decoder::SfaDecoder;
pub use header::FrameHeader;
pub use parser::SfaParser;
pub use writer::{SfaWriter, encode_access_unit};
