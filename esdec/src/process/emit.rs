use std::io::{self, Write};

use log::warn;

use crate::structs::frame::{Layout, RawFrame};

/// Writes decoded frames as a headerless, channel-interleaved sample dump.
///
/// Packed frames are written sample by sample with all channels. Planar
/// frames contribute their first channel only; the reduction is logged once.
#[derive(Debug)]
pub struct SampleEmitter<W: Write> {
    writer: W,
    planar_warned: bool,
    frames: u64,
    samples: u64,
    duration_secs: f64,
    bytes_written: u64,
}

impl<W: Write> SampleEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            planar_warned: false,
            frames: 0,
            samples: 0,
            duration_secs: 0.0,
            bytes_written: 0,
        }
    }

    /// Writes one frame and returns the number of bytes written.
    pub fn emit(&mut self, frame: &RawFrame) -> io::Result<usize> {
        if !frame.is_consistent() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} frame of {} samples does not match its {} planes",
                    frame.info(),
                    frame.sample_count,
                    frame.planes.len()
                ),
            ));
        }

        let channels = match frame.layout {
            Layout::Packed => frame.channels,
            Layout::Planar => {
                if !self.planar_warned && frame.channels > 1 {
                    warn!(
                        "Decoder produced planar {} audio; only the first of {} channels is written",
                        frame.sample_type, frame.channels
                    );
                    self.planar_warned = true;
                }
                1
            }
        };

        let mut written = 0;
        for index in 0..frame.sample_count {
            for channel in 0..channels {
                let bytes = frame.sample_bytes(index, channel);
                self.writer.write_all(bytes)?;
                written += bytes.len();
            }
        }

        self.frames += 1;
        self.samples += frame.sample_count as u64;
        self.duration_secs += frame.duration_secs();
        self.bytes_written += written as u64;

        Ok(written)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Samples per channel written so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Playback time of the frames written so far, each at its own rate.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::frame::SampleType;

    fn ne_i16(values: &[i16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    #[test]
    fn packed_frames_pass_through_interleaved() -> io::Result<()> {
        let data = ne_i16(&[1, -1, 2, -2, 3, -3]);
        let frame = RawFrame::packed(SampleType::S16, 2, 48000, data.clone());
        let mut emitter = SampleEmitter::new(Vec::new());

        assert_eq!(emitter.emit(&frame)?, 3 * 2 * 2);
        assert_eq!(emitter.samples(), 3);
        assert_eq!(emitter.into_inner(), data);
        Ok(())
    }

    #[test]
    fn planar_frames_keep_first_channel_only() -> io::Result<()> {
        let left = ne_i16(&[10, 20, 30]);
        let mut outputs = Vec::new();

        for right in [ne_i16(&[0, 0, 0]), ne_i16(&[-7, 99, i16::MAX])] {
            let frame = RawFrame::planar(SampleType::S16, 44100, vec![left.clone(), right]);
            let mut emitter = SampleEmitter::new(Vec::new());
            assert_eq!(emitter.emit(&frame)?, 3 * 2);
            outputs.push(emitter.into_inner());
        }

        assert_eq!(outputs[0], left);
        assert_eq!(outputs[1], left);
        Ok(())
    }

    #[test]
    fn counts_accumulate_across_frames() -> io::Result<()> {
        let mut emitter = SampleEmitter::new(io::sink());
        let frame = RawFrame::packed(SampleType::F64, 1, 8000, vec![0; 8 * 5]);

        emitter.emit(&frame)?;
        emitter.emit(&frame)?;

        assert_eq!(emitter.frames(), 2);
        assert_eq!(emitter.samples(), 10);
        assert_eq!(emitter.bytes_written(), 80);
        assert_eq!(emitter.duration_secs(), 10.0 / 8000.0);
        Ok(())
    }

    #[test]
    fn duration_follows_each_frame_rate() -> io::Result<()> {
        let mut emitter = SampleEmitter::new(io::sink());
        emitter.emit(&RawFrame::packed(SampleType::U8, 1, 8000, vec![0; 1000]))?;
        emitter.emit(&RawFrame::packed(SampleType::U8, 1, 48000, vec![0; 1000]))?;

        let expected = 1000.0 / 8000.0 + 1000.0 / 48000.0;
        assert!((emitter.duration_secs() - expected).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn inconsistent_frame_is_rejected() {
        let mut frame = RawFrame::packed(SampleType::S32, 2, 48000, vec![0; 16]);
        frame.sample_count = 4;

        let mut emitter = SampleEmitter::new(Vec::new());
        let err = emitter.emit(&frame).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(emitter.frames(), 0);
        assert!(emitter.into_inner().is_empty());
    }
}
