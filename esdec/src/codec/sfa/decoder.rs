use std::collections::VecDeque;

use log::trace;

use super::header::{CRC_LEN, FrameHeader, HEADER_LEN, swap_big_endian};
use crate::codec::{CodecId, Decoder, Packet, Poll};
use crate::structs::frame::{Layout, RawFrame, StreamInfo};
use crate::utils::crc::PAYLOAD_CRC;
use crate::utils::errors::DecodeError;

/// Decodes SFA access units into native-endian frames.
///
/// Decoded frames are held back until more than `lookahead` are queued, the
/// way codecs with inter-frame delay behave. Only a flush releases the tail.
#[derive(Debug, Default)]
pub struct SfaDecoder {
    lookahead: usize,
    queue: VecDeque<RawFrame>,
    flushing: bool,
    finished: bool,
    info: Option<StreamInfo>,
    units: usize,
}

impl SfaDecoder {
    pub fn with_lookahead(lookahead: usize) -> Self {
        Self {
            lookahead,
            ..Default::default()
        }
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Access units decoded so far.
    pub fn units(&self) -> usize {
        self.units
    }

    fn decode_unit(&mut self, bytes: &[u8]) -> Result<RawFrame, DecodeError> {
        let header = FrameHeader::read(bytes)?;

        let expected = header.access_unit_len();
        if bytes.len() != expected {
            return Err(DecodeError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let payload = &bytes[HEADER_LEN..expected - CRC_LEN];
        let read = u16::from_be_bytes([bytes[expected - 2], bytes[expected - 1]]);
        let calculated = PAYLOAD_CRC.checksum(payload);
        if calculated != read {
            return Err(DecodeError::CrcMismatch { calculated, read });
        }

        let width = header.sample_type.bytes();
        let mut data = payload.to_vec();
        swap_big_endian(&mut data, width);

        let frame = match header.layout {
            Layout::Packed => {
                RawFrame::packed(header.sample_type, header.channels, header.sample_rate, data)
            }
            Layout::Planar => {
                let planes = data
                    .chunks_exact(header.sample_count * width)
                    .map(<[u8]>::to_vec)
                    .collect();
                RawFrame::planar(header.sample_type, header.sample_rate, planes)
            }
        };

        Ok(frame)
    }
}

impl Decoder for SfaDecoder {
    fn codec(&self) -> CodecId {
        CodecId::Sfa
    }

    fn submit(&mut self, packet: Packet<'_>) -> Result<(), DecodeError> {
        if self.flushing {
            return Err(DecodeError::AfterEndOfStream);
        }

        match packet {
            Packet::Data(unit) => {
                if self.queue.len() > self.lookahead {
                    return Err(DecodeError::Busy(self.queue.len()));
                }

                let frame = self.decode_unit(unit.as_ref())?;
                trace!(
                    "Decoded access unit {}: {} samples",
                    self.units, frame.sample_count
                );

                self.info = Some(frame.info());
                self.units += 1;
                self.queue.push_back(frame);
            }
            Packet::Flush => {
                trace!("Flushing {} queued frames", self.queue.len());
                self.flushing = true;
            }
        }

        Ok(())
    }

    fn poll(&mut self) -> Result<Poll, DecodeError> {
        if self.finished {
            return Ok(Poll::EndOfStream);
        }

        if self.flushing || self.queue.len() > self.lookahead {
            if let Some(frame) = self.queue.pop_front() {
                return Ok(Poll::Frame(frame));
            }
        }

        if self.flushing {
            self.finished = true;
            return Ok(Poll::EndOfStream);
        }

        Ok(Poll::NotReady)
    }

    fn stream_info(&self) -> Option<StreamInfo> {
        self.info
    }
}
