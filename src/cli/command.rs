use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use esdec::codec::CodecId;
use esdec::process::buffer::{DEFAULT_CAPACITY, DEFAULT_REFILL_THRESHOLD};
use log::Level;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (esdec ",
    env!("ESDEC_VERSION"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    about        = "Tools for inspecting and decoding framed elementary audio bitstreams",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level at which library warnings turn into errors.
    pub fn fail_level(&self) -> Level {
        if self.strict { Level::Warn } else { Level::Error }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode an elementary stream into a raw sample dump.
    Decode(DecodeArgs),

    /// Print stream information
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input elementary stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output raw sample file (use "-" for stdout).
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Codec of the input stream.
    #[arg(long, value_enum, default_value_t = CodecArg::Sfa)]
    pub codec: CodecArg,

    /// Size of the input read-ahead buffer in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CAPACITY)]
    pub buffer_size: usize,

    /// Refill the input buffer once fewer bytes than this remain.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_REFILL_THRESHOLD)]
    pub refill_threshold: usize,

    /// Access units the decoder may hold back before releasing frames.
    #[arg(long, value_name = "UNITS", default_value_t = 1)]
    pub lookahead: usize,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input elementary stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Codec of the input stream.
    #[arg(long, value_enum, default_value_t = CodecArg::Sfa)]
    pub codec: CodecArg,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum CodecArg {
    /// Simple Framed Audio.
    Sfa,
    /// Advanced Audio Coding (no decoder available).
    Aac,
}

impl From<CodecArg> for CodecId {
    fn from(codec: CodecArg) -> Self {
        match codec {
            CodecArg::Sfa => CodecId::Sfa,
            CodecArg::Aac => CodecId::Aac,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ReportFormat {
    /// Aligned human-readable text.
    Text,
    /// YAML document.
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn decode_defaults() {
        let cli = Cli::parse_from(["esdecd", "decode", "in.sfa", "out.raw"]);
        let Commands::Decode(ref args) = cli.command else {
            panic!("expected decode");
        };

        assert_eq!(args.codec, CodecArg::Sfa);
        assert_eq!(args.buffer_size, 20480);
        assert_eq!(args.refill_threshold, 4096);
        assert_eq!(args.lookahead, 1);
        assert_eq!(cli.fail_level(), Level::Error);
    }

    #[test]
    fn strict_is_global() {
        let cli = Cli::parse_from(["esdecd", "info", "-", "--strict", "--format", "yaml"]);
        assert_eq!(cli.fail_level(), Level::Warn);
        assert!(matches!(
            cli.command,
            Commands::Info(InfoArgs {
                format: ReportFormat::Yaml,
                ..
            })
        ));
    }
}
