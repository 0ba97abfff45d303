use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
    is_pipe: bool,
    size: Option<u64>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref();
        let is_pipe = is_stdio(path);

        let (reader, size): (Box<dyn Read>, _) = if is_pipe {
            (Box::new(io::stdin().lock()), None)
        } else {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            let size = file.metadata().ok().map(|m| m.len());
            (Box::new(BufReader::new(file)), size)
        };

        Ok(Self {
            reader,
            is_pipe,
            size,
        })
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// File size, unknown for pipes
    pub fn size(&self) -> Option<u64> {
        self.size
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Opens the raw sample destination, truncating an existing file.
/// Use "-" for stdout.
pub fn create_output<P: AsRef<Path>>(output_path: P) -> Result<Box<dyn Write>> {
    let path = output_path.as_ref();

    if is_stdio(path) {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_file_contents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.sfa");
        std::fs::write(&path, [1u8, 2, 3, 4])?;

        let mut reader = InputReader::new(&path)?;
        assert!(!reader.is_pipe());
        assert_eq!(reader.size(), Some(4));

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        assert_eq!(data, [1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn missing_input_names_the_path() {
        let err = InputReader::new("does/not/exist.sfa").err().unwrap();
        assert!(err.to_string().contains("does/not/exist.sfa"));
    }

    #[test]
    fn output_is_truncated() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.raw");
        std::fs::write(&path, [9u8; 16])?;

        let mut output = create_output(&path)?;
        output.write_all(&[1, 2])?;
        output.flush()?;
        drop(output);

        assert_eq!(std::fs::read(&path)?, [1, 2]);
        Ok(())
    }
}
