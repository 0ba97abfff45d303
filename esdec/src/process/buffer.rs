use std::io::{self, Read};

use log::trace;

pub const DEFAULT_CAPACITY: usize = 20480;
pub const DEFAULT_REFILL_THRESHOLD: usize = 4096;

/// Fixed-capacity read-ahead window over a byte source.
///
/// Bytes are consumed from the front by advancing a cursor. Before new data
/// is appended the unconsumed tail is moved back to offset 0, so the free
/// space at the end never shrinks because of consumed bytes.
#[derive(Debug)]
pub struct InputBuffer {
    data: Box<[u8]>,
    threshold: usize,
    start: usize,
    len: usize,
    eof: bool,
    bytes_read: u64,
    fills: usize,
}

impl InputBuffer {
    /// Creates an empty buffer. `threshold` should be below `capacity`,
    /// see [`super::pipeline::PipelineConfig::validate`].
    pub fn new(capacity: usize, threshold: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            threshold,
            start: 0,
            len: 0,
            eof: false,
            bytes_read: 0,
            fills: 0,
        }
    }

    /// Unconsumed bytes.
    pub fn window(&self) -> &[u8] {
        &self.data[self.start..self.start + self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Whether the source has reported end of input.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of compact-and-append cycles performed.
    pub fn fills(&self) -> usize {
        self.fills
    }

    pub fn needs_refill(&self) -> bool {
        self.len < self.threshold
    }

    /// Drops `count` bytes from the front and returns them.
    pub fn take(&mut self, count: usize) -> &[u8] {
        let count = count.min(self.len);
        let start = self.start;

        self.start += count;
        self.len -= count;

        &self.data[start..start + count]
    }

    /// Discards every unconsumed byte.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    /// Fills the buffer if fewer than `threshold` bytes remain.
    pub fn refill<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<usize> {
        if self.needs_refill() {
            self.fill(source)
        } else {
            Ok(self.len)
        }
    }

    /// Compacts the window to offset 0 and reads until the buffer is full or
    /// the source is exhausted. Returns the new valid length.
    pub fn fill<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<usize> {
        self.compact();
        self.fills += 1;

        let capacity = self.capacity();
        let before = self.len;
        while !self.eof && self.len < capacity {
            match source.read(&mut self.data[self.len..capacity]) {
                Ok(0) => self.eof = true,
                Ok(n) => {
                    self.len += n;
                    self.bytes_read += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        trace!(
            "Buffer fill: {} -> {} bytes (eof: {})",
            before, self.len, self.eof
        );

        Ok(self.len)
    }

    fn compact(&mut self) {
        if self.start > 0 {
            self.data.copy_within(self.start..self.start + self.len, 0);
            self.start = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns at most `chunk` bytes per read.
    struct ShortReader<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for ShortReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn fill_reads_until_full() -> io::Result<()> {
        let source: Vec<u8> = (0..100u8).collect();
        let mut reader = ShortReader {
            data: &source,
            chunk: 7,
        };
        let mut buffer = InputBuffer::new(32, 8);

        assert_eq!(buffer.fill(&mut reader)?, 32);
        assert!(buffer.is_full());
        assert!(!buffer.is_eof());
        assert_eq!(buffer.window(), &source[..32]);
        Ok(())
    }

    #[test]
    fn refill_compacts_remaining_bytes() -> io::Result<()> {
        let source: Vec<u8> = (0..40u8).collect();
        let mut reader = &source[..];
        let mut buffer = InputBuffer::new(16, 8);

        buffer.fill(&mut reader)?;
        assert_eq!(buffer.take(10), &source[..10]);

        // 6 bytes left, below the threshold: tail moves to the front.
        assert_eq!(buffer.refill(&mut reader)?, 16);
        assert_eq!(buffer.window(), &source[10..26]);
        assert_eq!(buffer.bytes_read(), 26);
        Ok(())
    }

    #[test]
    fn refill_above_threshold_is_a_no_op() -> io::Result<()> {
        let source = [0u8; 64];
        let mut reader = &source[..];
        let mut buffer = InputBuffer::new(16, 4);

        buffer.fill(&mut reader)?;
        buffer.take(4);
        assert_eq!(buffer.refill(&mut reader)?, 12);
        assert_eq!(buffer.fills(), 1);
        Ok(())
    }

    #[test]
    fn exhausted_source_sets_eof() -> io::Result<()> {
        let source = [1u8, 2, 3];
        let mut reader = &source[..];
        let mut buffer = InputBuffer::new(16, 4);

        assert_eq!(buffer.fill(&mut reader)?, 3);
        assert!(buffer.is_eof());

        buffer.take(3);
        assert_eq!(buffer.refill(&mut reader)?, 0);
        assert!(buffer.is_empty());
        Ok(())
    }

    #[test]
    fn take_is_clamped_to_window() {
        let mut buffer = InputBuffer::new(8, 2);
        assert!(buffer.take(5).is_empty());
        assert_eq!(buffer.len(), 0);
    }
}
