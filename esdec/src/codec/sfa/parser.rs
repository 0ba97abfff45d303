use log::{debug, trace};

use super::header::{FrameHeader, HEADER_LEN, MAX_ACCESS_UNIT_LEN, SYNC_BYTES};
use crate::codec::{AccessUnit, CodecId, Parsed, Parser, UnitInfo};
use crate::utils::errors::ParseError;

/// Finds SFA access units by sync word and header CRC.
///
/// The parser never copies: it reports the unit's range in the window it was
/// given. A candidate sync whose header fails validation is skipped one byte at
/// a time, so false syncs inside payload data cost a single byte each.
#[derive(Debug, Default)]
pub struct SfaParser {
    locked: bool,
    units: usize,
    skipped: usize,
}

impl SfaParser {
    /// Whether the last candidate header was valid.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip(&mut self, count: usize) -> Parsed {
        self.skipped += count;
        Parsed::skip(count)
    }
}

impl Parser for SfaParser {
    fn codec(&self) -> CodecId {
        CodecId::Sfa
    }

    fn feed(&mut self, window: &[u8]) -> Result<Parsed, ParseError> {
        let Some(offset) = window.windows(2).position(|pair| pair == SYNC_BYTES) else {
            // Keep a trailing first sync byte, its partner may arrive with the next read.
            let keep = usize::from(window.last() == Some(&SYNC_BYTES[0]));
            return Ok(self.skip(window.len() - keep));
        };

        if offset > 0 {
            if self.locked {
                debug!("Lost sync, skipping {offset} bytes");
                self.locked = false;
            }
            return Ok(self.skip(offset));
        }

        if window.len() < HEADER_LEN {
            return Ok(Parsed::need_more());
        }

        let header = match FrameHeader::read(&window[..HEADER_LEN]) {
            Ok(header) => header,
            Err(e) => {
                trace!("Rejected sync candidate: {e}");
                self.locked = false;
                return Ok(self.skip(1));
            }
        };

        let len = header.access_unit_len();
        if window.len() < len {
            return Ok(Parsed::need_more());
        }

        self.locked = true;
        self.units += 1;

        Ok(Parsed::unit(0..len))
    }

    fn max_access_unit_len(&self) -> Option<usize> {
        Some(MAX_ACCESS_UNIT_LEN)
    }

    fn probe(&self, unit: AccessUnit<'_>) -> Option<UnitInfo> {
        let header = FrameHeader::read(unit.as_ref()).ok()?;
        Some(UnitInfo {
            stream: header.info(),
            sample_count: header.sample_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::EXAMPLE_DATA;

    #[test]
    fn finds_both_example_units() -> Result<(), ParseError> {
        let mut parser = SfaParser::default();

        let first = parser.feed(EXAMPLE_DATA)?;
        assert_eq!(first, Parsed::unit(0..17));

        let second = parser.feed(&EXAMPLE_DATA[17..])?;
        assert_eq!(second, Parsed::unit(0..13));
        assert!(parser.is_locked());
        assert_eq!(parser.units(), 2);
        Ok(())
    }

    #[test]
    fn waits_for_incomplete_unit() -> Result<(), ParseError> {
        let mut parser = SfaParser::default();
        assert_eq!(parser.feed(&EXAMPLE_DATA[..5])?, Parsed::need_more());
        assert_eq!(parser.feed(&EXAMPLE_DATA[..16])?, Parsed::need_more());
        assert_eq!(parser.feed(&EXAMPLE_DATA[..17])?, Parsed::unit(0..17));
        Ok(())
    }

    #[test]
    fn skips_garbage_before_sync() -> Result<(), ParseError> {
        let mut parser = SfaParser::default();
        let mut data = vec![0x00, 0x11, 0x22];
        data.extend_from_slice(EXAMPLE_DATA);

        assert_eq!(parser.feed(&data)?, Parsed::skip(3));
        assert_eq!(parser.feed(&data[3..])?, Parsed::unit(0..17));
        assert_eq!(parser.skipped(), 3);
        Ok(())
    }

    #[test]
    fn keeps_dangling_sync_byte() -> Result<(), ParseError> {
        let mut parser = SfaParser::default();
        assert_eq!(parser.feed(&[0x01, 0x02, 0xF8])?, Parsed::skip(2));
        assert_eq!(parser.feed(&[0xF8])?, Parsed::skip(0));
        Ok(())
    }

    #[test]
    fn probe_reads_header_only() {
        let parser = SfaParser::default();
        let info = parser.probe(AccessUnit::new(&EXAMPLE_DATA[17..24])).unwrap();

        assert_eq!(info.sample_count, 2);
        assert_eq!(info.stream.channels, 1);
        assert_eq!(info.stream.sample_rate, 44100);
        assert!(parser.probe(AccessUnit::new(&[0u8; 7])).is_none());
    }

    #[test]
    fn false_sync_costs_one_byte() -> Result<(), ParseError> {
        let mut parser = SfaParser::default();
        let data = [0xF8, 0x7A, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(parser.feed(&data)?, Parsed::skip(1));
        assert!(!parser.is_locked());
        Ok(())
    }
}
