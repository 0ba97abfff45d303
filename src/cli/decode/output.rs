use std::path::Path;

use anyhow::Result;
use esdec::log_or_err;
use esdec::process::pipeline::DecodeSummary;
use esdec::structs::format::OutputFormat;
use log::Level;

pub struct OutputState {
    pub fail_level: Level,
}

/// Prints how to play back the raw dump. Goes to stderr when the samples
/// themselves were written to stdout.
pub fn print_playback_hint(
    summary: &DecodeSummary,
    output: &Path,
    state: &OutputState,
) -> Result<()> {
    let format = match summary.output_format() {
        Ok(format) => format,
        Err(e) => {
            log_or_err!(state, Level::Warn, e);
            log::warn!("Skipping playback hint for {}", output.display());
            return Ok(());
        }
    };

    let lines = hint_lines(&format, output);
    if output.as_os_str() == "-" {
        lines.iter().for_each(|line| eprintln!("{line}"));
    } else {
        lines.iter().for_each(|line| println!("{line}"));
    }

    Ok(())
}

fn hint_lines(format: &OutputFormat, output: &Path) -> [String; 2] {
    [
        format!("Raw output: {format} {}", output.display()),
        format!("Play it with: {}", format.playback_command(output)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use esdec::structs::format::Endianness;
    use esdec::structs::frame::{Layout, SampleType, StreamInfo};
    use esdec::utils::errors::FormatError;

    #[test]
    fn hint_names_format_and_path() {
        let format = OutputFormat {
            sample_type: SampleType::S16,
            endianness: Endianness::Little,
            channels: 1,
            sample_rate: 44100,
        };

        let [raw, play] = hint_lines(&format, Path::new("out.raw"));
        assert_eq!(raw, "Raw output: s16le 1 44100 out.raw");
        assert_eq!(play, "Play it with: ffplay -f s16le -ac 1 -ar 44100 out.raw");
    }

    #[test]
    fn unsupported_format_fails_only_in_strict_mode() -> Result<()> {
        let summary = DecodeSummary {
            stream_info: Some(StreamInfo {
                sample_type: SampleType::S64,
                layout: Layout::Packed,
                channels: 2,
                sample_rate: 48000,
            }),
            ..Default::default()
        };
        let path = Path::new("out.raw");

        print_playback_hint(&summary, path, &OutputState { fail_level: Level::Error })?;

        let err = print_playback_hint(&summary, path, &OutputState { fail_level: Level::Warn })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormatError>(),
            Some(FormatError::UnsupportedSampleType(SampleType::S64))
        ));
        Ok(())
    }
}
