#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! ### Stream Organization
//!
//! An elementary stream is a plain concatenation of access units with no
//! container around them. Each SFA access unit is a 7-byte header (sync word,
//! sample format, layout, channel count, rate index, sample count and a
//! CRC-8), a big-endian PCM payload and a CRC-16 of the payload.
//!
//! ### Decoding Model
//!
//! Decoders follow a submit/poll protocol. After a unit is submitted the
//! caller polls until the decoder asks for more input; frames may lag behind
//! their input by a fixed lookahead. A final flush releases the held-back
//! frames and ends with an end-of-stream marker.
//!
//! ## Quick Start
//!
//! 1. Pick a parser and a decoder with [`codec::find_parser`] and
//!    [`codec::find_decoder`]
//! 2. Run them over a byte source with [`process::pipeline::Pipeline`]
//! 3. Describe the written samples with [`process::pipeline::DecodeSummary::output_format`]
//!
//! ```rust
//! use esdec::codec::{CodecId, DecoderOptions, find_decoder, find_parser};
//! use esdec::process::{EXAMPLE_DATA, emit::SampleEmitter, pipeline::{Pipeline, PipelineConfig}};
//!
//! let parser = find_parser(CodecId::Sfa)?;
//! let decoder = find_decoder(CodecId::Sfa, &DecoderOptions::default())?;
//! let mut pipeline = Pipeline::new(parser, decoder, PipelineConfig::default())?;
//!
//! let mut source = EXAMPLE_DATA;
//! let mut emitter = SampleEmitter::new(Vec::new());
//! let summary = pipeline.run(&mut source, &mut emitter)?;
//!
//! let format = summary.output_format()?;
//! assert_eq!(format.channels, 1);
//! assert_eq!(format.sample_rate, 44100);
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Codec registry and the parser/decoder interfaces.
///
/// - **Interfaces** ([`codec::Parser`], [`codec::Decoder`]): Access unit
///   splitting and submit/poll decoding
/// - **SFA** ([`codec::sfa`]): The built-in codec
pub mod codec;

/// Stream processing.
///
/// 1. **Buffering** ([`process::buffer`]): Compact-and-refill input window
///
/// 2. **Extraction** ([`process::extract`]): Access units from the window
///
/// 3. **Decoding** ([`process::decode`]): Submit/poll driver with flush
///
/// 4. **Output** ([`process::emit`]): Interleaved sample writer
pub mod process;

/// Frame and output format descriptions.
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level reading/writing
/// - **CRC Validation** ([`utils::crc`]): Error detection
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
