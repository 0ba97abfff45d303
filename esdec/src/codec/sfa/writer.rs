//! Builds SFA access units from native-endian samples.

use std::io::{self, Write};

use anyhow::{Result, ensure};

use super::header::{FrameHeader, swap_big_endian};
use crate::structs::frame::{Layout, RawFrame};
use crate::utils::crc::PAYLOAD_CRC;

/// Encodes one access unit. `samples` must be laid out as `header.layout`
/// describes (planes concatenated for planar) and be in native byte order.
pub fn encode_access_unit(header: &FrameHeader, samples: &[u8]) -> Result<Vec<u8>> {
    ensure!(
        samples.len() == header.payload_len(),
        "payload is {} bytes, header declares {}",
        samples.len(),
        header.payload_len()
    );

    let mut payload = samples.to_vec();
    swap_big_endian(&mut payload, header.sample_type.bytes());

    let mut unit = header.to_bytes()?;
    unit.reserve(payload.len() + 2);
    unit.extend_from_slice(&payload);
    unit.extend_from_slice(&PAYLOAD_CRC.checksum(&payload).to_be_bytes());

    Ok(unit)
}

/// Appends encoded access units to a byte sink.
#[derive(Debug)]
pub struct SfaWriter<W: Write> {
    writer: W,
    units: usize,
    bytes_written: u64,
}

impl<W: Write> SfaWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            units: 0,
            bytes_written: 0,
        }
    }

    pub fn write_unit(&mut self, header: &FrameHeader, samples: &[u8]) -> Result<usize> {
        let unit = encode_access_unit(header, samples)?;
        self.writer.write_all(&unit)?;
        self.units += 1;
        self.bytes_written += unit.len() as u64;
        Ok(unit.len())
    }

    /// Encodes a decoded frame back into an access unit.
    pub fn write_frame(&mut self, frame: &RawFrame) -> Result<usize> {
        let header = FrameHeader {
            sample_type: frame.sample_type,
            layout: frame.layout,
            channels: frame.channels,
            sample_rate: frame.sample_rate,
            sample_count: frame.sample_count,
        };

        match frame.layout {
            Layout::Packed => self.write_unit(&header, &frame.planes[0]),
            Layout::Planar => self.write_unit(&header, &frame.planes.concat()),
        }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
