//! Parser and decoder interfaces consumed by the pipeline.
//!
//! A [`Parser`] finds access unit boundaries in a byte window. A [`Decoder`]
//! accepts access units through [`Decoder::submit`] and hands out decoded
//! frames through [`Decoder::poll`]. Implementations are looked up by
//! [`CodecId`] with [`find_parser`] and [`find_decoder`].

use std::fmt::{Display, Formatter};
use std::ops::Range;

use crate::structs::frame::{RawFrame, StreamInfo};
use crate::utils::errors::{DecodeError, ParseError, SetupError};

/// Simple Framed Audio, the built-in codec.
pub mod sfa;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    Sfa,
    Aac,
}

impl Display for CodecId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecId::Sfa => write!(f, "sfa"),
            CodecId::Aac => write!(f, "aac"),
        }
    }
}

/// One coded frame, borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessUnit<'a> {
    data: &'a [u8],
}

impl<'a> AccessUnit<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for AccessUnit<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

/// Input to [`Decoder::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    Data(AccessUnit<'a>),
    /// No more compressed input; drain everything still buffered.
    Flush,
}

impl Packet<'_> {
    pub fn is_flush(&self) -> bool {
        matches!(self, Packet::Flush)
    }
}

/// Result of one [`Parser::feed`] call.
///
/// `access_unit` is a range into the window and always lies within the
/// first `consumed` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    pub consumed: usize,
    pub access_unit: Option<Range<usize>>,
}

impl Parsed {
    /// The window does not hold a complete access unit yet.
    pub fn need_more() -> Self {
        Self::default()
    }

    /// Bytes dropped while searching for the next access unit.
    pub fn skip(consumed: usize) -> Self {
        Self {
            consumed,
            access_unit: None,
        }
    }

    pub fn unit(range: Range<usize>) -> Self {
        Self {
            consumed: range.end,
            access_unit: Some(range),
        }
    }
}

/// Format of one access unit as read from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitInfo {
    pub stream: StreamInfo,
    pub sample_count: usize,
}

/// Output of [`Decoder::poll`].
#[derive(Debug)]
pub enum Poll {
    Frame(RawFrame),
    /// More input is needed before the next frame.
    NotReady,
    /// The decoder was flushed and has no frames left.
    EndOfStream,
}

pub trait Parser {
    fn codec(&self) -> CodecId;

    /// Locates the next access unit in `window`.
    fn feed(&mut self, window: &[u8]) -> Result<Parsed, ParseError>;

    /// Upper bound on the length of a single access unit, if the format has one.
    fn max_access_unit_len(&self) -> Option<usize> {
        None
    }

    /// Reads the format of an access unit without decoding its payload.
    fn probe(&self, _unit: AccessUnit<'_>) -> Option<UnitInfo> {
        None
    }
}

pub trait Decoder {
    fn codec(&self) -> CodecId;

    fn submit(&mut self, packet: Packet<'_>) -> Result<(), DecodeError>;

    fn poll(&mut self) -> Result<Poll, DecodeError>;

    /// Format of the most recently decoded access unit.
    fn stream_info(&self) -> Option<StreamInfo>;
}

impl<P: Parser + ?Sized> Parser for Box<P> {
    fn codec(&self) -> CodecId {
        (**self).codec()
    }

    fn feed(&mut self, window: &[u8]) -> Result<Parsed, ParseError> {
        (**self).feed(window)
    }

    fn max_access_unit_len(&self) -> Option<usize> {
        (**self).max_access_unit_len()
    }

    fn probe(&self, unit: AccessUnit<'_>) -> Option<UnitInfo> {
        (**self).probe(unit)
    }
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn codec(&self) -> CodecId {
        (**self).codec()
    }

    fn submit(&mut self, packet: Packet<'_>) -> Result<(), DecodeError> {
        (**self).submit(packet)
    }

    fn poll(&mut self) -> Result<Poll, DecodeError> {
        (**self).poll()
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        (**self).stream_info()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecoderOptions {
    /// Access units held back before the first frame is released.
    pub lookahead: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { lookahead: 1 }
    }
}

pub fn find_parser(codec: CodecId) -> Result<Box<dyn Parser>, SetupError> {
    match codec {
        CodecId::Sfa => Ok(Box::new(sfa::parser::SfaParser::default())),
        CodecId::Aac => Err(SetupError::ParserNotFound(codec)),
    }
}

pub fn find_decoder(
    codec: CodecId,
    options: &DecoderOptions,
) -> Result<Box<dyn Decoder>, SetupError> {
    match codec {
        CodecId::Sfa => Ok(Box::new(sfa::decoder::SfaDecoder::with_lookahead(
            options.lookahead,
        ))),
        CodecId::Aac => Err(SetupError::DecoderNotFound(codec)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_sfa_only() {
        assert_eq!(find_parser(CodecId::Sfa).unwrap().codec(), CodecId::Sfa);
        let decoder = find_decoder(CodecId::Sfa, &DecoderOptions::default()).unwrap();
        assert_eq!(decoder.codec(), CodecId::Sfa);
        assert!(decoder.stream_info().is_none());

        assert!(matches!(
            find_parser(CodecId::Aac),
            Err(SetupError::ParserNotFound(CodecId::Aac))
        ));
        assert!(matches!(
            find_decoder(CodecId::Aac, &DecoderOptions::default()),
            Err(SetupError::DecoderNotFound(CodecId::Aac))
        ));
    }

    #[test]
    fn parsed_unit_consumes_through_end() {
        let parsed = Parsed::unit(3..10);
        assert_eq!(parsed.consumed, 10);
        assert_eq!(parsed.access_unit, Some(3..10));
        assert_eq!(Parsed::need_more().consumed, 0);
    }
}
