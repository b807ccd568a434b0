// src/transport.rs
//
// Transport seam between the outside world and the stream runner.
//
// A transport hands the runner one chunk of text at a time; a chunk may
// contain several newline-delimited lines (a UDP datagram often does).
// `Ok(None)` means end of stream. A disconnect is end of stream, not an
// error; the runner reacts by flushing, never by bailing out.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Blocking pull-based source of raw log text.
pub trait LineTransport {
    /// Receive the next chunk. `Ok(None)` signals end of stream.
    fn receive(&mut self) -> io::Result<Option<String>>;
}

/// Replays a recorded log file line by line.
pub struct FileTransport {
    reader: BufReader<File>,
}

impl FileTransport {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }
}

impl LineTransport for FileTransport {
    fn receive(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}

/// In-memory transport fed from a fixed queue of chunks. Test double.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    chunks: std::collections::VecDeque<String>,
}

impl MemoryTransport {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineTransport for MemoryTransport {
    fn receive(&mut self) -> io::Result<Option<String>> {
        Ok(self.chunks.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memory_transport_drains_in_order() {
        let mut t = MemoryTransport::new(["a", "b"]);
        assert_eq!(t.receive().unwrap(), Some("a".to_string()));
        assert_eq!(t.receive().unwrap(), Some("b".to_string()));
        assert_eq!(t.receive().unwrap(), None);
        // End of stream is sticky.
        assert_eq!(t.receive().unwrap(), None);
    }

    #[test]
    fn file_transport_reads_until_eof() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "first").unwrap();
        writeln!(file, "second").unwrap();
        file.flush().unwrap();

        let mut t = FileTransport::open(file.path()).unwrap();
        assert_eq!(t.receive().unwrap(), Some("first\n".to_string()));
        assert_eq!(t.receive().unwrap(), Some("second\n".to_string()));
        assert_eq!(t.receive().unwrap(), None);
    }
}
