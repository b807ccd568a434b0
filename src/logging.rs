// src/logging.rs
//
// Episode-summary sinks for episcope.
// - SummarySink: trait used by the stream runner
// - NoopSink:    discards all summaries
// - FileSink:    writes one JSON line per closed episode

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::types::EpisodeSummary;

/// Abstract sink for closed-episode summaries.
pub trait SummarySink {
    fn log_summary(&mut self, summary: &EpisodeSummary);
}

impl<T: SummarySink + ?Sized> SummarySink for Box<T> {
    fn log_summary(&mut self, summary: &EpisodeSummary) {
        (**self).log_summary(summary)
    }
}

/// Sink that discards all summaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl SummarySink for NoopSink {
    fn log_summary(&mut self, _summary: &EpisodeSummary) {
        // intentionally no-op
    }
}

/// JSONL file sink.
///
/// Each closed episode is written as a single JSON object on its own line.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl SummarySink for FileSink {
    fn log_summary(&mut self, summary: &EpisodeSummary) {
        let line = match serde_json::to_string(summary) {
            Ok(s) => s,
            Err(_) => return,
        };

        // If logging fails we don't want to crash the stream loop,
        // so we deliberately ignore I/O errors.
        let _ = writeln!(self.writer, "{}", line);
        let _ = self.writer.flush();
    }
}
