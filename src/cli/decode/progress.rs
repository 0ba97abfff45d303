use std::time::{Duration, Instant};

use anyhow::Result;
use esdec::process::pipeline::{DecodeSummary, Progress};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::timestamp::time_str;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {pos} frames\n{msg} | elapsed: {elapsed_precise}";

pub fn create_progress_bar(multi: &MultiProgress) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template(SPINNER_TEMPLATE)?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("initializing decoder");
    Ok(pb)
}

pub fn update_progress_bar(pb: &ProgressBar, progress: &Progress, total_bytes: Option<u64>) {
    pb.set_position(progress.frames);

    let decoded = time_str(progress.duration_secs);

    let read = match total_bytes {
        Some(total) if total > 0 => format!(
            "{} / {} bytes ({:.0}%)",
            progress.bytes_read,
            total,
            progress.bytes_read as f64 * 100.0 / total as f64
        ),
        _ => format!("{} bytes", progress.bytes_read),
    };

    pb.set_message(format!("read: {read} | timestamp: {decoded}"));
}

pub fn finalize_progress_bar(pb: &ProgressBar, summary: &DecodeSummary, start_time: Instant) {
    let audio_duration_secs = summary.duration_secs;
    let elapsed = start_time.elapsed().as_secs_f64();
    let realtime_multiplier = if elapsed > 0.0 {
        audio_duration_secs / elapsed
    } else {
        0.0
    };

    pb.set_position(summary.frames);
    pb.finish_with_message(format!(
        "speed: {realtime_multiplier:.1}x | timestamp: {}",
        time_str(audio_duration_secs)
    ));
}
