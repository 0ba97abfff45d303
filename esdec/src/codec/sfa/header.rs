//! SFA access unit header.
//!
//! ```text
//! sync            16  0xF87A
//! sample_type      4  0 u8, 1 s16, 2 s32, 3 f32, 4 f64, 5 s64
//! planar           1
//! channels - 1     3
//! rate_index       4  SAMPLE_RATES
//! reserved         4  0
//! sample_count    16  1..=MAX_SAMPLES_PER_UNIT
//! header_crc       8  CRC-8 over the preceding six bytes
//! ```
//!
//! The header is followed by the big-endian payload and a CRC-16 of it.

use std::io;

use crate::structs::frame::{Layout, SampleType, StreamInfo};
use crate::utils::bitstream_io::{BsIoSliceReader, BsIoVecWriter};
use crate::utils::crc::HEADER_CRC;
use crate::utils::errors::ParseError;

pub const SYNC_WORD: u16 = 0xF87A;
pub const SYNC_BYTES: [u8; 2] = SYNC_WORD.to_be_bytes();
pub const HEADER_LEN: usize = 7;
pub const CRC_LEN: usize = 2;
pub const MAX_SAMPLES_PER_UNIT: usize = 1024;
pub const MAX_PAYLOAD_LEN: usize = 16384;
pub const MAX_ACCESS_UNIT_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN + CRC_LEN;

pub const SAMPLE_RATES: [u32; 14] = [
    8000, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000, 64000, 88200, 96000, 176400,
    192000,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub sample_type: SampleType,
    pub layout: Layout,
    pub channels: usize,
    pub sample_rate: u32,
    pub sample_count: usize,
}

impl FrameHeader {
    /// Parses and validates the first [`HEADER_LEN`] bytes of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<Self, ParseError> {
        let reader = &mut BsIoSliceReader::from_slice(bytes);

        let sync = reader.get_n::<u16>(16)?;
        if sync != SYNC_WORD {
            return Err(ParseError::InvalidSync(sync));
        }

        let sample_type_code = reader.get_n::<u8>(4)?;
        let planar = reader.get()?;
        let channels = reader.get_n::<u8>(3)? as usize + 1;
        let rate_index = reader.get_n::<u8>(4)?;
        let reserved = reader.get_n::<u8>(4)?;
        let sample_count = reader.get_n::<u16>(16)? as usize;
        let read_crc = reader.get_n::<u8>(8)?;

        let calculated = HEADER_CRC.checksum(&bytes[..HEADER_LEN - 1]);
        if calculated != read_crc {
            return Err(ParseError::HeaderCrcMismatch {
                calculated,
                read: read_crc,
            });
        }

        let sample_type = sample_type_from_code(sample_type_code)?;
        let sample_rate = *SAMPLE_RATES
            .get(rate_index as usize)
            .ok_or(ParseError::InvalidSampleRate(rate_index))?;

        if reserved != 0 {
            return Err(ParseError::ReservedBitsNonZero(reserved));
        }

        if sample_count == 0 || sample_count > MAX_SAMPLES_PER_UNIT {
            return Err(ParseError::InvalidSampleCount {
                actual: sample_count,
                max: MAX_SAMPLES_PER_UNIT,
            });
        }

        let header = Self {
            sample_type,
            layout: if planar { Layout::Planar } else { Layout::Packed },
            channels,
            sample_rate,
            sample_count,
        };

        if header.payload_len() > MAX_PAYLOAD_LEN {
            return Err(ParseError::PayloadTooLong {
                actual: header.payload_len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        Ok(header)
    }

    /// Serializes the header including its CRC.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let rate_index = SAMPLE_RATES
            .iter()
            .position(|&rate| rate == self.sample_rate)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported sample rate {}", self.sample_rate),
                )
            })?;

        if !(1..=8).contains(&self.channels) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported channel count {}", self.channels),
            ));
        }

        let mut writer = BsIoVecWriter::default();
        writer.put_n::<u16>(16, SYNC_WORD)?;
        writer.put_n::<u8>(4, sample_type_code(self.sample_type))?;
        writer.put(self.layout == Layout::Planar)?;
        writer.put_n::<u8>(3, (self.channels - 1) as u8)?;
        writer.put_n::<u8>(4, rate_index as u8)?;
        writer.put_n::<u8>(4, 0)?;
        writer.put_n::<u16>(16, self.sample_count as u16)?;

        let mut bytes = writer.finish()?;
        bytes.push(HEADER_CRC.checksum(&bytes));

        Ok(bytes)
    }

    pub fn payload_len(&self) -> usize {
        self.sample_count * self.channels * self.sample_type.bytes()
    }

    pub fn access_unit_len(&self) -> usize {
        HEADER_LEN + self.payload_len() + CRC_LEN
    }

    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            sample_type: self.sample_type,
            layout: self.layout,
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }
}

fn sample_type_from_code(code: u8) -> Result<SampleType, ParseError> {
    Ok(match code {
        0 => SampleType::U8,
        1 => SampleType::S16,
        2 => SampleType::S32,
        3 => SampleType::F32,
        4 => SampleType::F64,
        5 => SampleType::S64,
        _ => return Err(ParseError::InvalidSampleType(code)),
    })
}

fn sample_type_code(sample_type: SampleType) -> u8 {
    match sample_type {
        SampleType::U8 => 0,
        SampleType::S16 => 1,
        SampleType::S32 => 2,
        SampleType::F32 => 3,
        SampleType::F64 => 4,
        SampleType::S64 => 5,
    }
}

/// Swaps every `width`-byte sample between big-endian and native order.
pub(crate) fn swap_big_endian(data: &mut [u8], width: usize) {
    if cfg!(target_endian = "little") && width > 1 {
        data.chunks_exact_mut(width).for_each(<[u8]>::reverse);
    }
}
