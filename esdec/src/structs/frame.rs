//! Raw decoder output.

use std::fmt::{Display, Formatter};

/// Numeric class and width of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    S16,
    S32,
    S64,
    F32,
    F64,
}

impl SampleType {
    /// Size of one sample in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::S16 => 2,
            SampleType::S32 | SampleType::F32 => 4,
            SampleType::S64 | SampleType::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }
}

impl Display for SampleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SampleType::U8 => "u8",
            SampleType::S16 => "s16",
            SampleType::S32 => "s32",
            SampleType::S64 => "s64",
            SampleType::F32 => "f32",
            SampleType::F64 => "f64",
        };

        f.write_str(name)
    }
}

/// How channels are arranged in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// One interleaved plane, channels adjacent per sample index.
    Packed,
    /// One contiguous plane per channel.
    Planar,
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Packed => write!(f, "packed"),
            Layout::Planar => write!(f, "planar"),
        }
    }
}

/// Format of the audio a decoder currently produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_type: SampleType,
    pub layout: Layout,
    pub channels: usize,
    pub sample_rate: u32,
}

impl Display for StreamInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} {}ch {} Hz",
            self.sample_type,
            if self.layout == Layout::Planar { "p" } else { "" },
            self.channels,
            self.sample_rate
        )
    }
}

/// A block of decoded samples in native byte order.
///
/// Packed frames carry a single plane of `sample_count * channels` samples.
/// Planar frames carry `channels` planes of `sample_count` samples each.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub sample_type: SampleType,
    pub layout: Layout,
    pub channels: usize,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub planes: Vec<Vec<u8>>,
}

impl RawFrame {
    pub fn packed(
        sample_type: SampleType,
        channels: usize,
        sample_rate: u32,
        data: Vec<u8>,
    ) -> Self {
        let sample_count = data.len() / (sample_type.bytes() * channels.max(1));
        debug_assert_eq!(data.len(), sample_count * sample_type.bytes() * channels);

        Self {
            sample_type,
            layout: Layout::Packed,
            channels,
            sample_rate,
            sample_count,
            planes: vec![data],
        }
    }

    pub fn planar(sample_type: SampleType, sample_rate: u32, planes: Vec<Vec<u8>>) -> Self {
        let sample_count = planes.first().map_or(0, |p| p.len() / sample_type.bytes());
        debug_assert!(
            planes
                .iter()
                .all(|p| p.len() == sample_count * sample_type.bytes())
        );

        Self {
            sample_type,
            layout: Layout::Planar,
            channels: planes.len(),
            sample_rate,
            sample_count,
            planes,
        }
    }

    pub fn info(&self) -> StreamInfo {
        StreamInfo {
            sample_type: self.sample_type,
            layout: self.layout,
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Byte span of one sample. Packed frames ignore `channel` beyond the
    /// interleave offset.
    pub fn sample_bytes(&self, index: usize, channel: usize) -> &[u8] {
        let width = self.sample_type.bytes();
        match self.layout {
            Layout::Packed => {
                let start = (index * self.channels + channel) * width;
                &self.planes[0][start..start + width]
            }
            Layout::Planar => {
                let start = index * width;
                &self.planes[channel][start..start + width]
            }
        }
    }

    /// Whether the planes hold every sample the header fields promise.
    pub fn is_consistent(&self) -> bool {
        let width = self.sample_type.bytes();
        match self.layout {
            Layout::Packed => {
                let needed = self
                    .sample_count
                    .checked_mul(self.channels)
                    .and_then(|n| n.checked_mul(width));
                self.planes.len() == 1 && needed.is_some_and(|n| self.planes[0].len() >= n)
            }
            Layout::Planar => {
                let needed = self.sample_count.checked_mul(width);
                self.planes.len() == self.channels
                    && (self.channels > 0 || self.sample_count == 0)
                    && needed.is_some_and(|n| self.planes.iter().all(|p| p.len() >= n))
            }
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_sample_addressing() {
        let frame = RawFrame::packed(SampleType::S16, 2, 48000, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(frame.sample_count, 2);
        assert_eq!(frame.sample_bytes(0, 1), &[3, 4]);
        assert_eq!(frame.sample_bytes(1, 0), &[5, 6]);
    }

    #[test]
    fn planar_sample_addressing() {
        let frame = RawFrame::planar(SampleType::U8, 8000, vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(frame.channels, 2);
        assert_eq!(frame.sample_count, 3);
        assert_eq!(frame.sample_bytes(2, 1), &[6]);
    }

    #[test]
    fn inconsistent_frames_are_detected() {
        let mut frame = RawFrame::packed(SampleType::S16, 2, 48000, vec![0; 8]);
        assert!(frame.is_consistent());
        frame.sample_count = 3;
        assert!(!frame.is_consistent());

        let mut frame = RawFrame::planar(SampleType::U8, 8000, vec![vec![1, 2], vec![3, 4]]);
        assert!(frame.is_consistent());
        frame.channels = 3;
        assert!(!frame.is_consistent());
        frame.channels = 2;
        frame.planes[1].pop();
        assert!(!frame.is_consistent());
    }

    #[test]
    fn stream_info_display() {
        let info = StreamInfo {
            sample_type: SampleType::F32,
            layout: Layout::Planar,
            channels: 2,
            sample_rate: 44100,
        };
        assert_eq!(info.to_string(), "f32p 2ch 44100 Hz");
    }
}
