use log::trace;

use crate::codec::{AccessUnit, Parser};
use crate::process::buffer::InputBuffer;
use crate::utils::errors::ExtractError;

/// Outcome of one parser call over the buffer window.
#[derive(Debug, PartialEq, Eq)]
pub enum Extracted<'a> {
    /// A complete access unit, borrowed from the buffer.
    Unit(AccessUnit<'a>),
    /// The parser dropped bytes while resynchronizing.
    Skipped(usize),
    /// The window holds no complete access unit.
    NeedMore,
}

/// Drives a [`Parser`] over an [`InputBuffer`].
///
/// Consumed bytes are removed from the buffer by moving its cursor; access
/// units are handed out as borrows of the buffer and must be released before
/// the buffer is refilled.
#[derive(Debug, Default)]
pub struct Extractor {
    units: u64,
    consumed: u64,
    skipped: u64,
}

impl Extractor {
    pub fn extract<'b, P: Parser + ?Sized>(
        &mut self,
        parser: &mut P,
        buffer: &'b mut InputBuffer,
    ) -> anyhow::Result<Extracted<'b>> {
        let available = buffer.len();
        let parsed = parser.feed(buffer.window())?;

        if parsed.consumed > available {
            return Err(ExtractError::Overconsumed {
                consumed: parsed.consumed,
                available,
            }
            .into());
        }

        if let Some(range) = &parsed.access_unit {
            if range.start >= range.end || range.end > parsed.consumed {
                return Err(ExtractError::InvalidUnitBounds {
                    start: range.start,
                    end: range.end,
                    consumed: parsed.consumed,
                }
                .into());
            }
        }

        if parsed.consumed == 0 {
            if buffer.is_full() {
                return Err(ExtractError::AccessUnitTooLarge {
                    capacity: buffer.capacity(),
                }
                .into());
            }
            return Ok(Extracted::NeedMore);
        }

        self.consumed += parsed.consumed as u64;
        let bytes = buffer.take(parsed.consumed);

        match parsed.access_unit {
            Some(range) => {
                self.units += 1;
                self.skipped += range.start as u64;
                trace!("Access unit {}: {} bytes", self.units, range.len());
                Ok(Extracted::Unit(AccessUnit::new(&bytes[range])))
            }
            None => {
                self.skipped += parsed.consumed as u64;
                Ok(Extracted::Skipped(parsed.consumed))
            }
        }
    }

    /// Access units extracted so far.
    pub fn units(&self) -> u64 {
        self.units
    }

    /// Bytes consumed by the parser, including skipped ones.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Bytes consumed without belonging to an access unit.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::sfa::SfaParser;
    use crate::codec::{CodecId, Parsed};
    use crate::process::EXAMPLE_DATA;
    use crate::utils::errors::ParseError;

    /// Returns a fixed answer regardless of the window.
    struct FixedParser(Parsed);

    impl Parser for FixedParser {
        fn codec(&self) -> CodecId {
            CodecId::Sfa
        }

        fn feed(&mut self, _window: &[u8]) -> Result<Parsed, ParseError> {
            Ok(self.0.clone())
        }
    }

    fn loaded(data: &[u8], capacity: usize) -> anyhow::Result<InputBuffer> {
        let mut buffer = InputBuffer::new(capacity, 1);
        let mut reader = data;
        buffer.fill(&mut reader)?;
        Ok(buffer)
    }

    #[test]
    fn extracts_units_in_order() -> anyhow::Result<()> {
        let mut buffer = loaded(EXAMPLE_DATA, 64)?;
        let mut parser = SfaParser::default();
        let mut extractor = Extractor::default();

        let first = extractor.extract(&mut parser, &mut buffer)?;
        assert_eq!(first, Extracted::Unit(AccessUnit::new(&EXAMPLE_DATA[..17])));

        let second = extractor.extract(&mut parser, &mut buffer)?;
        assert_eq!(second, Extracted::Unit(AccessUnit::new(&EXAMPLE_DATA[17..])));

        assert!(buffer.is_empty());
        assert_eq!(extractor.extract(&mut parser, &mut buffer)?, Extracted::NeedMore);
        assert_eq!(extractor.units(), 2);
        assert_eq!(extractor.consumed(), EXAMPLE_DATA.len() as u64);
        Ok(())
    }

    #[test]
    fn resync_is_not_an_error() -> anyhow::Result<()> {
        let mut data = vec![0xAA; 5];
        data.extend_from_slice(EXAMPLE_DATA);
        let mut buffer = loaded(&data, 64)?;
        let mut parser = SfaParser::default();
        let mut extractor = Extractor::default();

        assert_eq!(
            extractor.extract(&mut parser, &mut buffer)?,
            Extracted::Skipped(5)
        );
        assert!(matches!(
            extractor.extract(&mut parser, &mut buffer)?,
            Extracted::Unit(_)
        ));
        assert_eq!(extractor.skipped(), 5);
        Ok(())
    }

    #[test]
    fn full_buffer_without_unit_is_fatal() -> anyhow::Result<()> {
        let mut buffer = loaded(&EXAMPLE_DATA[..16], 16)?;
        let mut parser = SfaParser::default();
        let err = Extractor::default()
            .extract(&mut parser, &mut buffer)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::AccessUnitTooLarge { capacity: 16 })
        ));
        Ok(())
    }

    #[test]
    fn rejects_parser_contract_violations() -> anyhow::Result<()> {
        let mut buffer = loaded(&[0u8; 8], 16)?;

        let mut overconsume = FixedParser(Parsed::skip(9));
        let err = Extractor::default()
            .extract(&mut overconsume, &mut buffer)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::Overconsumed {
                consumed: 9,
                available: 8
            })
        ));

        let mut out_of_bounds = FixedParser(Parsed {
            consumed: 2,
            access_unit: Some(0..4),
        });
        let err = Extractor::default()
            .extract(&mut out_of_bounds, &mut buffer)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::InvalidUnitBounds { .. })
        ));
        Ok(())
    }

    #[test]
    fn unit_may_follow_leading_junk() -> anyhow::Result<()> {
        let mut buffer = loaded(&[9u8, 9, 1, 2, 3], 16)?;
        let mut parser = FixedParser(Parsed {
            consumed: 5,
            access_unit: Some(2..5),
        });
        let mut extractor = Extractor::default();

        assert_eq!(
            extractor.extract(&mut parser, &mut buffer)?,
            Extracted::Unit(AccessUnit::new(&[1, 2, 3]))
        );
        assert_eq!(extractor.skipped(), 2);
        Ok(())
    }
}
