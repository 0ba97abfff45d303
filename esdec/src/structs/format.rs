//! Output format descriptor for headerless sample dumps.

use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::structs::frame::{Layout, SampleType, StreamInfo};
use crate::utils::errors::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    pub const NATIVE: Self = if cfg!(target_endian = "big") {
        Endianness::Big
    } else {
        Endianness::Little
    };
}

/// Describes the bytes written by the sample emitter.
///
/// Derived from the decoder's final state. Planar streams are reduced to
/// their first channel, so the descriptor reports a single channel for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub sample_type: SampleType,
    pub endianness: Endianness,
    pub channels: usize,
    pub sample_rate: u32,
}

impl OutputFormat {
    pub fn resolve(info: &StreamInfo) -> Result<Self, FormatError> {
        if info.sample_type == SampleType::S64 {
            return Err(FormatError::UnsupportedSampleType(info.sample_type));
        }

        let channels = match info.layout {
            Layout::Packed => info.channels,
            Layout::Planar => 1,
        };

        Ok(Self {
            sample_type: info.sample_type,
            endianness: Endianness::NATIVE,
            channels,
            sample_rate: info.sample_rate,
        })
    }

    /// Raw format tag as understood by `ffplay -f`.
    pub fn tag(&self) -> &'static str {
        use Endianness::{Big, Little};

        match (self.sample_type, self.endianness) {
            (SampleType::U8, _) => "u8",
            (SampleType::S16, Big) => "s16be",
            (SampleType::S16, Little) => "s16le",
            (SampleType::S32, Big) => "s32be",
            (SampleType::S32, Little) => "s32le",
            (SampleType::F32, Big) => "f32be",
            (SampleType::F32, Little) => "f32le",
            (SampleType::F64, Big) => "f64be",
            (SampleType::F64, Little) => "f64le",
            // rejected by resolve()
            (SampleType::S64, Big) => "s64be",
            (SampleType::S64, Little) => "s64le",
        }
    }

    pub fn bytes_per_second(&self) -> u64 {
        self.sample_type.bytes() as u64 * self.channels as u64 * self.sample_rate as u64
    }

    pub fn playback_command(&self, path: &Path) -> String {
        format!(
            "ffplay -f {} -ac {} -ar {} {}",
            self.tag(),
            self.channels,
            self.sample_rate,
            path.display()
        )
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.tag(), self.channels, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(sample_type: SampleType, layout: Layout, channels: usize) -> StreamInfo {
        StreamInfo {
            sample_type,
            layout,
            channels,
            sample_rate: 44100,
        }
    }

    #[test]
    fn packed_keeps_channel_count() {
        let format = OutputFormat::resolve(&info(SampleType::S16, Layout::Packed, 2)).unwrap();
        assert_eq!(format.channels, 2);
        assert_eq!(format.endianness, Endianness::NATIVE);
    }

    #[test]
    fn planar_reduces_to_first_channel() {
        let format = OutputFormat::resolve(&info(SampleType::F32, Layout::Planar, 6)).unwrap();
        assert_eq!(format.channels, 1);
        assert_eq!(format.sample_type, SampleType::F32);
    }

    #[test]
    fn tags_follow_endianness() {
        let mut format = OutputFormat {
            sample_type: SampleType::S32,
            endianness: Endianness::Big,
            channels: 1,
            sample_rate: 8000,
        };
        assert_eq!(format.tag(), "s32be");
        format.endianness = Endianness::Little;
        assert_eq!(format.tag(), "s32le");
        format.sample_type = SampleType::U8;
        assert_eq!(format.tag(), "u8");
        assert_eq!(format.to_string(), "u8 1 8000");
    }

    #[test]
    fn s64_is_unsupported() {
        let err = OutputFormat::resolve(&info(SampleType::S64, Layout::Packed, 1)).unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnsupportedSampleType(SampleType::S64)
        ));
    }

    #[test]
    fn playback_command_lists_all_parameters() {
        let format = OutputFormat {
            sample_type: SampleType::F64,
            endianness: Endianness::Little,
            channels: 2,
            sample_rate: 96000,
        };
        assert_eq!(
            format.playback_command(Path::new("out.pcm")),
            "ffplay -f f64le -ac 2 -ar 96000 out.pcm"
        );
        assert_eq!(format.bytes_per_second(), 8 * 2 * 96000);
    }
}
