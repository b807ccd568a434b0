//! telemetry.rs
//!
//! Lightweight JSONL telemetry sink for episcope.
//!
//! Writes one JSON object per accepted ObservationRecord so experiments can
//! post-process the raw stream without re-parsing engine logs. Controlled
//! entirely via environment variables so runs can turn telemetry on/off
//! without code changes.
//!
//! # Environment variables
//!
//! - `EPISCOPE_TELEMETRY_MODE`: `"off"` (default) disables telemetry,
//!   `"jsonl"` writes JSONL to `EPISCOPE_TELEMETRY_PATH`.
//! - `EPISCOPE_TELEMETRY_PATH`: Path to the JSONL file. Required when mode
//!   is `"jsonl"`.
//! - `EPISCOPE_TELEMETRY_APPEND`: When `"1"`/`"true"`/`"yes"`, appends to an
//!   existing file instead of truncating. Default is truncate.
//!
//! A write failure disables the sink for the rest of the stream; it never
//! interrupts aggregation.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::types::ObservationRecord;

/// Telemetry mode, controlled by EPISCOPE_TELEMETRY_MODE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryMode {
    Off,
    Jsonl,
}

impl TelemetryMode {
    /// Parse mode from environment. Defaults to Off.
    pub fn from_env() -> Self {
        match env::var("EPISCOPE_TELEMETRY_MODE") {
            Ok(s) => match s.to_lowercase().as_str() {
                "jsonl" => TelemetryMode::Jsonl,
                // Treat any unknown value as Off for safety.
                _ => TelemetryMode::Off,
            },
            Err(_) => TelemetryMode::Off,
        }
    }
}

/// JSONL sink for accepted records.
pub struct TelemetrySink {
    enabled: bool,
    path: Option<PathBuf>,
    append: bool,
    writer: Option<BufWriter<File>>,
}

impl TelemetrySink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: None,
            append: false,
            writer: None,
        }
    }

    /// Build from environment variables.
    pub fn from_env() -> Self {
        let enabled = TelemetryMode::from_env() == TelemetryMode::Jsonl;
        let path = env::var("EPISCOPE_TELEMETRY_PATH").ok().map(PathBuf::from);
        let append = env::var("EPISCOPE_TELEMETRY_APPEND")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            enabled: enabled && path.is_some(),
            path,
            append,
            writer: None,
        }
    }

    /// Enable telemetry with a specific path (truncates).
    pub fn for_path(path: PathBuf) -> Self {
        Self {
            enabled: true,
            path: Some(path),
            append: false,
            writer: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure_writer(&mut self) -> Option<&mut BufWriter<File>> {
        if !self.enabled {
            return None;
        }

        if self.writer.is_none() {
            let path = self.path.as_ref()?;

            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            let file = if self.append {
                OpenOptions::new().create(true).append(true).open(path).ok()?
            } else {
                File::create(path).ok()?
            };

            self.writer = Some(BufWriter::new(file));
        }

        self.writer.as_mut()
    }

    /// Log one accepted record as a JSON line.
    pub fn log_record(&mut self, record: &ObservationRecord) {
        let Some(writer) = self.ensure_writer() else {
            return;
        };

        let line = match serde_json::to_string(record) {
            Ok(s) => s,
            Err(_) => return,
        };

        if writeln!(writer, "{}", line).is_err() {
            self.enabled = false;
            self.writer = None;
        }
    }

    /// Flush the writer.
    pub fn flush(&mut self) {
        if let Some(writer) = &mut self.writer {
            let _ = writer.flush();
        }
    }
}

impl Drop for TelemetrySink {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: u32) -> ObservationRecord {
        ObservationRecord {
            timestamp: step as i64 * 1_000,
            agent_id: "agent_0".to_string(),
            episode: 0,
            step,
            reward: 0.5,
            fitness: step as f64,
        }
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let mut sink = TelemetrySink::disabled();
        sink.log_record(&record(1));
        sink.flush();
        assert!(!sink.is_enabled());
    }

    #[test]
    fn enabled_sink_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");

        let mut sink = TelemetrySink::for_path(path.clone());
        sink.log_record(&record(1));
        sink.log_record(&record(2));
        sink.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: ObservationRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.step, 1);
    }
}
