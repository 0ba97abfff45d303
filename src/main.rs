use std::io::Write;

use anyhow::Result;
use clap::Parser as ClapParser;
use env_logger::fmt::Formatter;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::Record;

use cli::command::{Cli, Commands, LogFormat};
use cli::decode::cmd_decode;
use cli::info::cmd_info;

mod cli;
mod input;
pub(crate) mod timestamp;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let multi = MultiProgress::new();
    let progress = init_logging(&cli, &multi)?.then_some(&multi);

    match cli.command {
        Commands::Decode(ref args) => cmd_decode(args, &cli, progress)?,
        Commands::Info(ref args) => cmd_info(args, &cli, progress)?,
    }

    Ok(())
}

/// Installs the global logger. Returns whether log lines are routed through
/// `multi` so progress bars stay intact.
fn init_logging(cli: &Cli, multi: &MultiProgress) -> Result<bool> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(cli.loglevel.to_level_filter());

    match cli.log_format {
        LogFormat::Plain => {
            builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            builder.format(json_record);
        }
    }

    if !cli.progress {
        builder.try_init()?;
        return Ok(false);
    }

    let logger = builder.build();
    let level = logger.filter();
    LogWrapper::new(multi.clone(), logger).try_init()?;
    // The wrapper does not carry the inner filter over to the log facade.
    log::set_max_level(level);
    Ok(true)
}

/// One JSON object per record. `target` names the emitting module, which
/// separates library stages (`esdec::process::*`) from the CLI.
fn json_record(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    writeln!(
        buf,
        "{{\"ts\":\"{}\",\"lvl\":\"{}\",\"target\":{:?},\"msg\":{:?}}}",
        buf.timestamp(),
        record.level(),
        record.target(),
        record.args().to_string()
    )
}
