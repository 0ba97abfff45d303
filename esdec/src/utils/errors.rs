use crate::codec::CodecId;
use crate::structs::frame::SampleType;

/// Logs `$err` at `$level`, or returns it when `$level` reaches the state's
/// `fail_level`.
#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err.into());
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error("No parser available for codec {0}")]
    ParserNotFound(CodecId),

    #[error("No decoder available for codec {0}")]
    DecoderNotFound(CodecId),

    #[error("Parser is initialized for {parser}, decoder for {decoder}")]
    CodecMismatch { parser: CodecId, decoder: CodecId },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Input buffer capacity must be non-zero")]
    ZeroCapacity,

    #[error("Refill threshold ({threshold}) must be below the buffer capacity ({capacity})")]
    ThresholdTooLarge { threshold: usize, capacity: usize },

    #[error(
        "Input buffer capacity ({capacity}) cannot hold the largest access unit ({required} bytes)"
    )]
    CapacityTooSmall { capacity: usize, required: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error("Parser consumed {consumed} bytes from a {available}-byte window")]
    Overconsumed { consumed: usize, available: usize },

    #[error("Access unit bounds {start}..{end} lie outside the {consumed} consumed bytes")]
    InvalidUnitBounds {
        start: usize,
        end: usize,
        consumed: usize,
    },

    #[error("Access unit does not fit into the {capacity}-byte input buffer")]
    AccessUnitTooLarge { capacity: usize },

    #[error("{0} trailing bytes at end of input do not form an access unit")]
    TrailingBytes(usize),

    #[error("Skipped {0} bytes while searching for the next access unit")]
    Resync(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Invalid sync word {0:#06X}")]
    InvalidSync(u16),

    #[error("Header CRC mismatch. Calculated {calculated:#04X}, Read {read:#04X}")]
    HeaderCrcMismatch { calculated: u8, read: u8 },

    #[error("Invalid sample type code {0}")]
    InvalidSampleType(u8),

    #[error("Invalid sample rate index {0}")]
    InvalidSampleRate(u8),

    #[error("Reserved header bits must be 0. Read {0:#X}")]
    ReservedBitsNonZero(u8),

    #[error("samples per unit must be between 1 and {max}. Read {actual}")]
    InvalidSampleCount { actual: usize, max: usize },

    #[error("Payload length {actual} exceeds {max} bytes")]
    PayloadTooLong { actual: usize, max: usize },

    #[error("Bitstream read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("Access unit rejected: {0}")]
    InvalidHeader(#[from] ParseError),

    #[error("Access unit length mismatch: header declares {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Payload CRC mismatch. Calculated {calculated:#06X}, Read {read:#06X}")]
    CrcMismatch { calculated: u16, read: u16 },

    #[error("Access unit submitted after end of stream")]
    AfterEndOfStream,

    #[error("Decoder reported no frame ready after a flush")]
    FlushIncomplete,

    #[error("Decoder is not accepting input: {0} frames pending")]
    Busy(usize),

    #[error("Frames from the previous access unit were not drained")]
    NotDrained,
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("Sample type {0} is not supported as a raw output format")]
    UnsupportedSampleType(SampleType),

    #[error("No audio was decoded; output format is unknown")]
    NoStreamInfo,
}
