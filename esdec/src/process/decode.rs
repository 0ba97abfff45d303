use std::iter::FusedIterator;

use log::debug;

use crate::codec::{AccessUnit, Decoder, Packet, Poll};
use crate::structs::frame::{RawFrame, StreamInfo};
use crate::utils::errors::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Ready to submit the next access unit or the flush.
    Feeding,
    /// Frames from the last submission are still being pulled.
    Draining,
    /// The decoder reported end of stream after a flush.
    Finished,
}

/// Feeds access units to a [`Decoder`] and drains every frame it produces
/// before the next submission.
///
/// Decoder errors are fatal and returned as they are; the driver does not
/// retry or resynchronize.
#[derive(Debug)]
pub struct FrameDecodeDriver<D> {
    decoder: D,
    state: DriverState,
    submitted: u64,
    frames: u64,
}

impl<D: Decoder> FrameDecodeDriver<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            state: DriverState::Feeding,
            submitted: 0,
            frames: 0,
        }
    }

    /// Submits `packet` and returns the frames it releases.
    ///
    /// The iterator stops polling as soon as the decoder reports that it
    /// needs more input or has reached end of stream.
    pub fn submit(&mut self, packet: Packet<'_>) -> Result<Frames<'_, D>, DecodeError> {
        match self.state {
            DriverState::Finished => return Err(DecodeError::AfterEndOfStream),
            DriverState::Draining => return Err(DecodeError::NotDrained),
            DriverState::Feeding => {}
        }

        let flushing = packet.is_flush();
        self.decoder.submit(packet)?;
        self.submitted += 1;
        self.state = DriverState::Draining;

        Ok(Frames {
            driver: self,
            flushing,
            done: false,
        })
    }

    /// Decodes one access unit, passing each released frame to `on_frame`.
    /// Returns the number of frames released.
    pub fn decode<F>(&mut self, unit: AccessUnit<'_>, on_frame: F) -> anyhow::Result<usize>
    where
        F: FnMut(RawFrame) -> anyhow::Result<()>,
    {
        self.drive(Packet::Data(unit), on_frame)
    }

    /// Flushes the decoder and passes every remaining frame to `on_frame`.
    pub fn flush<F>(&mut self, on_frame: F) -> anyhow::Result<usize>
    where
        F: FnMut(RawFrame) -> anyhow::Result<()>,
    {
        let count = self.drive(Packet::Flush, on_frame)?;
        debug!("Decoder flushed, {count} trailing frames");
        Ok(count)
    }

    fn drive<F>(&mut self, packet: Packet<'_>, mut on_frame: F) -> anyhow::Result<usize>
    where
        F: FnMut(RawFrame) -> anyhow::Result<()>,
    {
        let mut count = 0;
        for frame in self.submit(packet)? {
            on_frame(frame?)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == DriverState::Finished
    }

    /// Packets submitted so far, including the flush.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.decoder.stream_info()
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn into_decoder(self) -> D {
        self.decoder
    }
}

/// Frames released by one submission. Fused: once it returns `None` or an
/// error the decoder is not polled again.
pub struct Frames<'d, D: Decoder> {
    driver: &'d mut FrameDecodeDriver<D>,
    flushing: bool,
    done: bool,
}

impl<D: Decoder> Iterator for Frames<'_, D> {
    type Item = Result<RawFrame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.driver.decoder.poll() {
            Ok(Poll::Frame(frame)) => {
                self.driver.frames += 1;
                Some(Ok(frame))
            }
            Ok(Poll::NotReady) => {
                self.done = true;
                if self.flushing {
                    return Some(Err(DecodeError::FlushIncomplete));
                }
                self.driver.state = DriverState::Feeding;
                None
            }
            Ok(Poll::EndOfStream) => {
                self.done = true;
                self.driver.state = DriverState::Finished;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<D: Decoder> FusedIterator for Frames<'_, D> {}
