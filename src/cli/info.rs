use std::time::Duration;

use anyhow::Result;
use esdec::codec::{CodecId, Parser, UnitInfo, find_parser};
use esdec::process::pipeline::{PipelineConfig, ScanSummary, scan};
use esdec::structs::frame::StreamInfo;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::Serialize;

use super::command::{Cli, InfoArgs, ReportFormat};
use crate::input::InputReader;
use crate::timestamp::time_str;

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let codec = CodecId::from(args.codec);
    log::info!("Analyzing {codec} stream: {}", args.input.display());

    let mut parser = find_parser(codec)?;
    let config = PipelineConfig {
        fail_level: cli.fail_level(),
        ..Default::default()
    };

    let pb = match multi {
        Some(multi) => {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(ProgressStyle::with_template("{spinner:.green} {pos} units | {msg}")?);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message("Analyzing access units...");
            Some(pb)
        }
        None => None,
    };

    let mut input = InputReader::new(&args.input)?;
    let mut context = AnalysisContext::default();

    let scanned = scan(&mut parser, &mut input, &config, |parser, unit| {
        context.process_unit(parser.probe(unit));
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        Ok(())
    });

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    let report = context.into_report(codec, &scanned?);
    match args.format {
        ReportFormat::Text => display_report(&report),
        ReportFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&report)?),
    }

    Ok(())
}

#[derive(Debug, Default)]
struct AnalysisContext {
    first: Option<StreamInfo>,
    format_changes: u64,
    total_samples: u64,
    duration_secs: f64,
    last: Option<StreamInfo>,
}

impl AnalysisContext {
    fn process_unit(&mut self, info: Option<UnitInfo>) {
        let Some(info) = info else {
            return;
        };

        if self.first.is_none() {
            log::debug!("First access unit: {}", info.stream);
            self.first = Some(info.stream);
        }

        if let Some(last) = self.last {
            if last != info.stream {
                log::info!("Format change: {last} -> {}", info.stream);
                self.format_changes += 1;
            }
        }

        self.last = Some(info.stream);
        self.total_samples += info.sample_count as u64;
        if info.stream.sample_rate > 0 {
            self.duration_secs += info.sample_count as f64 / info.stream.sample_rate as f64;
        }
    }

    fn into_report(self, codec: CodecId, scanned: &ScanSummary) -> StreamReport {
        let duration_secs = self.duration_secs;

        let average_data_rate_kbps = if duration_secs > 0.0 {
            scanned.bytes_read as f64 * 8.0 / duration_secs / 1000.0
        } else {
            0.0
        };

        StreamReport {
            codec: codec.to_string(),
            access_units: scanned.access_units,
            total_bytes: scanned.bytes_read,
            skipped_bytes: scanned.skipped_bytes,
            trailing_bytes: scanned.trailing_bytes,
            format: self.first.map(FormatReport::from),
            format_changes: self.format_changes,
            total_samples: self.total_samples,
            duration: time_str(duration_secs),
            duration_secs,
            average_data_rate_kbps,
        }
    }
}

#[derive(Debug, Serialize)]
struct StreamReport {
    codec: String,
    access_units: u64,
    total_bytes: u64,
    skipped_bytes: u64,
    trailing_bytes: u64,
    format: Option<FormatReport>,
    format_changes: u64,
    total_samples: u64,
    duration: String,
    duration_secs: f64,
    average_data_rate_kbps: f64,
}

#[derive(Debug, Serialize)]
struct FormatReport {
    sample_type: String,
    layout: String,
    channels: usize,
    sample_rate: u32,
}

impl From<StreamInfo> for FormatReport {
    fn from(info: StreamInfo) -> Self {
        Self {
            sample_type: info.sample_type.to_string(),
            layout: info.layout.to_string(),
            channels: info.channels,
            sample_rate: info.sample_rate,
        }
    }
}

fn display_report(report: &StreamReport) {
    let Some(format) = &report.format else {
        println!("No {} access units found in the input.", report.codec);
        println!("This doesn't appear to be a valid {} stream.", report.codec);
        return;
    };

    println!();
    println!("Stream Information");
    println!("  Codec                     {}", report.codec);
    println!("  Sample type               {}", format.sample_type);
    println!("  Layout                    {}", format.layout);
    println!("  Channels                  {}", format.channels);
    println!("  Sampling rate             {} Hz", format.sample_rate);
    if report.format_changes > 0 {
        println!("  Format changes            {}", report.format_changes);
    }
    println!();

    println!("Analysis Summary");
    println!("  Access units              {}", report.access_units);
    let size_mb = report.total_bytes as f64 / 1_000_000.0;
    println!(
        "  Size                      {size_mb:.2} MB ({} bytes)",
        report.total_bytes
    );
    if report.skipped_bytes > 0 || report.trailing_bytes > 0 {
        println!(
            "  Unparsed bytes            {} skipped, {} trailing",
            report.skipped_bytes, report.trailing_bytes
        );
    }
    println!("  Samples                   {}", report.total_samples);
    println!("  Duration                  {}", report.duration);
    if report.average_data_rate_kbps > 0.0 {
        println!(
            "  Average data rate         {:.1} kbps",
            report.average_data_rate_kbps
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use esdec::structs::frame::{Layout, SampleType};

    fn unit(channels: usize, sample_count: usize) -> Option<UnitInfo> {
        unit_at(channels, sample_count, 44100)
    }

    fn unit_at(channels: usize, sample_count: usize, sample_rate: u32) -> Option<UnitInfo> {
        Some(UnitInfo {
            stream: StreamInfo {
                sample_type: SampleType::S16,
                layout: Layout::Packed,
                channels,
                sample_rate,
            },
            sample_count,
        })
    }

    #[test]
    fn report_accumulates_units() -> Result<()> {
        let mut context = AnalysisContext::default();
        context.process_unit(unit(1, 441));
        context.process_unit(None);
        context.process_unit(unit(2, 441));

        let scanned = ScanSummary {
            bytes_read: 2000,
            access_units: 3,
            skipped_bytes: 0,
            trailing_bytes: 0,
        };
        let report = context.into_report(CodecId::Sfa, &scanned);

        assert_eq!(report.total_samples, 882);
        assert_eq!(report.format_changes, 1);
        assert_eq!(report.duration, "00:00:00.020");
        assert_eq!(report.format.as_ref().map(|f| f.channels), Some(1));

        let yaml = serde_yaml_ng::to_string(&report)?;
        assert!(yaml.contains("access_units: 3"));
        assert!(yaml.contains("sample_type: s16"));
        Ok(())
    }

    #[test]
    fn duration_follows_rate_changes() {
        let mut context = AnalysisContext::default();
        context.process_unit(unit_at(1, 1000, 8000));
        context.process_unit(unit_at(1, 1000, 48000));

        let scanned = ScanSummary {
            bytes_read: 3000,
            access_units: 2,
            ..Default::default()
        };
        let report = context.into_report(CodecId::Sfa, &scanned);

        let expected = 1000.0 / 8000.0 + 1000.0 / 48000.0;
        assert!((report.duration_secs - expected).abs() < 1e-12);
        assert_eq!(report.duration, "00:00:00.145");
        assert_eq!(report.format_changes, 1);
        assert!((report.average_data_rate_kbps - 24.0 / expected).abs() < 1e-9);
    }
}
