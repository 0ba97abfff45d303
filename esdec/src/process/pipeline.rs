use std::io::{Read, Write};

use anyhow::{Context, Result};
use log::{Level, debug, info};

use crate::codec::{AccessUnit, Decoder, Parser};
use crate::log_or_err;
use crate::process::buffer::{DEFAULT_CAPACITY, DEFAULT_REFILL_THRESHOLD, InputBuffer};
use crate::process::decode::FrameDecodeDriver;
use crate::process::emit::SampleEmitter;
use crate::process::extract::{Extracted, Extractor};
use crate::structs::format::OutputFormat;
use crate::structs::frame::StreamInfo;
use crate::utils::errors::{ConfigError, ExtractError, FormatError, SetupError};

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Size of the read-ahead window in bytes.
    pub buffer_capacity: usize,
    /// Refill once fewer than this many unparsed bytes remain.
    pub refill_threshold: usize,
    /// Warnings at or above this level become errors.
    pub fail_level: Level,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_CAPACITY,
            refill_threshold: DEFAULT_REFILL_THRESHOLD,
            fail_level: Level::Error,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self, max_access_unit_len: Option<usize>) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if self.refill_threshold >= self.buffer_capacity {
            return Err(ConfigError::ThresholdTooLarge {
                threshold: self.refill_threshold,
                capacity: self.buffer_capacity,
            });
        }

        if let Some(required) = max_access_unit_len {
            if required > self.buffer_capacity {
                return Err(ConfigError::CapacityTooSmall {
                    capacity: self.buffer_capacity,
                    required,
                });
            }
        }

        Ok(())
    }

    fn buffer(&self) -> InputBuffer {
        InputBuffer::new(self.buffer_capacity, self.refill_threshold)
    }
}

/// Progress snapshot handed to the observer after every access unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    pub bytes_read: u64,
    pub access_units: u64,
    pub frames: u64,
    pub samples: u64,
    /// Playback time decoded so far, summed frame by frame.
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeSummary {
    pub bytes_read: u64,
    pub access_units: u64,
    pub skipped_bytes: u64,
    pub trailing_bytes: u64,
    pub frames: u64,
    pub samples: u64,
    pub duration_secs: f64,
    pub bytes_written: u64,
    pub stream_info: Option<StreamInfo>,
}

impl DecodeSummary {
    /// Describes the bytes that were written, for the playback hint.
    pub fn output_format(&self) -> Result<OutputFormat, FormatError> {
        let info = self.stream_info.ok_or(FormatError::NoStreamInfo)?;
        OutputFormat::resolve(&info)
    }
}

/// Reads a byte stream, splits it into access units and decodes them.
///
/// ```rust
/// use esdec::codec::{DecoderOptions, sfa::{SfaDecoder, SfaParser}};
/// use esdec::process::{EXAMPLE_DATA, emit::SampleEmitter, pipeline::{Pipeline, PipelineConfig}};
///
/// let mut pipeline = Pipeline::new(
///     SfaParser::default(),
///     SfaDecoder::with_lookahead(DecoderOptions::default().lookahead),
///     PipelineConfig::default(),
/// )?;
///
/// let mut source = EXAMPLE_DATA;
/// let mut emitter = SampleEmitter::new(Vec::new());
/// let summary = pipeline.run(&mut source, &mut emitter)?;
///
/// assert_eq!(summary.access_units, 2);
/// assert_eq!(emitter.into_inner().len(), 6 * 2);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Pipeline<P, D> {
    parser: P,
    driver: FrameDecodeDriver<D>,
    extractor: Extractor,
    config: PipelineConfig,
}

impl<P: Parser, D: Decoder> Pipeline<P, D> {
    pub fn new(parser: P, decoder: D, config: PipelineConfig) -> Result<Self> {
        if parser.codec() != decoder.codec() {
            return Err(SetupError::CodecMismatch {
                parser: parser.codec(),
                decoder: decoder.codec(),
            }
            .into());
        }

        config.validate(parser.max_access_unit_len())?;

        Ok(Self {
            parser,
            driver: FrameDecodeDriver::new(decoder),
            extractor: Extractor::default(),
            config,
        })
    }

    pub fn run<R, W>(
        &mut self,
        source: &mut R,
        emitter: &mut SampleEmitter<W>,
    ) -> Result<DecodeSummary>
    where
        R: Read + ?Sized,
        W: Write,
    {
        self.run_with_progress(source, emitter, |_| {})
    }

    /// Runs the decode loop to completion, flushes the decoder and calls
    /// `progress` after every decoded access unit.
    pub fn run_with_progress<R, W, F>(
        &mut self,
        source: &mut R,
        emitter: &mut SampleEmitter<W>,
        mut progress: F,
    ) -> Result<DecodeSummary>
    where
        R: Read + ?Sized,
        W: Write,
        F: FnMut(&Progress),
    {
        let mut buffer = self.config.buffer();

        info!(
            "Decoding {} stream ({} byte buffer, refill below {} bytes)",
            self.parser.codec(),
            self.config.buffer_capacity,
            self.config.refill_threshold
        );

        let driver = &mut self.driver;
        let trailing_bytes = scan_units(
            &mut self.parser,
            &mut self.extractor,
            &mut buffer,
            source,
            &self.config,
            |_, unit, position| {
                driver.decode(unit, |frame| {
                    emitter.emit(&frame).context("Failed to write samples")?;
                    Ok(())
                })?;

                progress(&Progress {
                    bytes_read: position.bytes_read,
                    access_units: position.access_units,
                    frames: emitter.frames(),
                    samples: emitter.samples(),
                    duration_secs: emitter.duration_secs(),
                });
                Ok(())
            },
        )?;

        self.driver.flush(|frame| {
            emitter.emit(&frame).context("Failed to write samples")?;
            Ok(())
        })?;
        emitter.flush().context("Failed to flush output")?;

        let summary = DecodeSummary {
            bytes_read: buffer.bytes_read(),
            access_units: self.extractor.units(),
            skipped_bytes: self.extractor.skipped(),
            trailing_bytes,
            frames: emitter.frames(),
            samples: emitter.samples(),
            duration_secs: emitter.duration_secs(),
            bytes_written: emitter.bytes_written(),
            stream_info: self.driver.stream_info(),
        };

        info!(
            "Decoded {} access units into {} frames ({} samples, {} bytes written)",
            summary.access_units, summary.frames, summary.samples, summary.bytes_written
        );

        Ok(summary)
    }

    pub fn driver(&self) -> &FrameDecodeDriver<D> {
        &self.driver
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }
}

/// Splits `source` into access units without decoding them and passes each
/// to `on_unit` along with the parser, which may probe it. Returns the summary
/// of what was read.
pub fn scan<P, R, F>(
    parser: &mut P,
    source: &mut R,
    config: &PipelineConfig,
    mut on_unit: F,
) -> Result<ScanSummary>
where
    P: Parser + ?Sized,
    R: Read + ?Sized,
    F: FnMut(&P, AccessUnit<'_>) -> Result<()>,
{
    config.validate(parser.max_access_unit_len())?;

    let mut buffer = config.buffer();
    let mut extractor = Extractor::default();
    let trailing_bytes = scan_units(
        parser,
        &mut extractor,
        &mut buffer,
        source,
        config,
        |parser, unit, _| on_unit(parser, unit),
    )?;

    Ok(ScanSummary {
        bytes_read: buffer.bytes_read(),
        access_units: extractor.units(),
        skipped_bytes: extractor.skipped(),
        trailing_bytes,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub bytes_read: u64,
    pub access_units: u64,
    pub skipped_bytes: u64,
    pub trailing_bytes: u64,
}

/// Where the reader stood when an access unit was extracted.
#[derive(Debug, Clone, Copy)]
struct Position {
    bytes_read: u64,
    access_units: u64,
}

/// The extraction loop shared by decoding and scanning. Returns the number of
/// trailing bytes that never formed an access unit.
fn scan_units<P, R, F>(
    parser: &mut P,
    extractor: &mut Extractor,
    buffer: &mut InputBuffer,
    source: &mut R,
    config: &PipelineConfig,
    mut on_unit: F,
) -> Result<u64>
where
    P: Parser + ?Sized,
    R: Read + ?Sized,
    F: FnMut(&P, AccessUnit<'_>, Position) -> Result<()>,
{
    buffer.fill(source).context("Failed to read input")?;
    let mut resync_run = 0;

    loop {
        if buffer.is_empty() && buffer.is_eof() {
            end_resync(config, &mut resync_run)?;
            return Ok(0);
        }

        let bytes_read = buffer.bytes_read();
        match extractor.extract(parser, buffer)? {
            Extracted::Unit(unit) => {
                end_resync(config, &mut resync_run)?;
                let position = Position {
                    bytes_read,
                    access_units: extractor.units(),
                };
                on_unit(&*parser, unit, position)?;
            }
            Extracted::Skipped(count) => {
                debug!("Parser skipped {count} bytes");
                resync_run += count;
            }
            Extracted::NeedMore => {
                if buffer.is_eof() {
                    end_resync(config, &mut resync_run)?;
                    let trailing = buffer.len();
                    buffer.clear();
                    log_or_err!(config, Level::Warn, ExtractError::TrailingBytes(trailing));
                    return Ok(trailing as u64);
                }
                buffer.fill(source).context("Failed to read input")?;
                continue;
            }
        }

        buffer.refill(source).context("Failed to read input")?;
    }
}

/// Reports a finished run of skipped bytes with its total length.
fn end_resync(config: &PipelineConfig, run: &mut usize) -> Result<()> {
    if *run > 0 {
        let skipped = std::mem::take(run);
        log_or_err!(config, Level::Warn, ExtractError::Resync(skipped));
    }
    Ok(())
}
