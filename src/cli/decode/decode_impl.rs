use std::time::Instant;

use anyhow::Result;
use esdec::codec::{CodecId, DecoderOptions, find_decoder, find_parser};
use esdec::process::emit::SampleEmitter;
use esdec::process::pipeline::{Pipeline, PipelineConfig};
use indicatif::MultiProgress;

use super::output::{OutputState, print_playback_hint};
use super::progress::{create_progress_bar, finalize_progress_bar, update_progress_bar};
use crate::cli::command::{Cli, DecodeArgs};
use crate::input::{InputReader, create_output};

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let codec = CodecId::from(args.codec);

    log::info!(
        "Decoding {codec} stream: {} -> {} (strict mode: {})",
        args.input.display(),
        args.output.display(),
        cli.strict
    );

    let config = PipelineConfig {
        buffer_capacity: args.buffer_size,
        refill_threshold: args.refill_threshold,
        fail_level: cli.fail_level(),
    };

    // Codec and buffer setup fail before any file is touched
    let parser = find_parser(codec)?;
    let decoder = find_decoder(
        codec,
        &DecoderOptions {
            lookahead: args.lookahead,
        },
    )?;
    let mut pipeline = Pipeline::new(parser, decoder, config)?;

    let mut input = InputReader::new(&args.input)?;
    let total_bytes = input.size();
    if input.is_pipe() {
        log::debug!("Reading input from stdin, total size unknown");
    }
    let mut emitter = SampleEmitter::new(create_output(&args.output)?);

    let pb = match multi {
        Some(multi) => Some(create_progress_bar(multi)?),
        None => None,
    };

    let start_time = Instant::now();
    let result = pipeline.run_with_progress(&mut input, &mut emitter, |progress| {
        if let Some(pb) = &pb {
            update_progress_bar(pb, progress, total_bytes);
        }
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(pb) = &pb {
                pb.finish_with_message("decode failed");
            }
            return Err(e);
        }
    };

    if let Some(pb) = &pb {
        finalize_progress_bar(pb, &summary, start_time);
    }

    log::info!(
        "Decoding completed in {:.3}s: {} bytes read, {} skipped, {} bytes written",
        start_time.elapsed().as_secs_f64(),
        summary.bytes_read,
        summary.skipped_bytes,
        summary.bytes_written
    );

    let state = OutputState {
        fail_level: cli.fail_level(),
    };
    print_playback_hint(&summary, &args.output, &state)
}
