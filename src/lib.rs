//! Episcope core library.
//!
//! An online log-processing pipeline for reinforcement-learning training
//! telemetry: raw log lines come in over UDP (or from a replay file), are
//! parsed into typed observation records, grouped into episodes, and
//! summarized into per-episode and per-run learning-curve exports.
//!
//! # Architecture
//!
//! The codebase separates the pure aggregation core from I/O:
//!
//! - **Parser** (`parser`): one raw line → typed `ObservationRecord`.
//!   Total, deterministic, side-effect free.
//!
//! - **Aggregator** (`aggregator`): explicit boundary-signal state machine
//!   over the (episode, step) counters; owns the `RunState` and emits
//!   `EpisodeSummary` values on boundary flushes.
//!
//! - **Reporter** (`reporter`): run-level series + per-episode curves +
//!   running fitness statistics.
//!
//! - **Transport** (`transport`, `live`): `LineTransport` trait with file
//!   and in-memory implementations; the tokio UDP listener serializes
//!   datagrams into a single ordered queue before aggregation.
//!
//! - **Sinks** (`logging`, `telemetry`, `plot`): JSONL summary/record
//!   sinks and PNG learning-curve export.
//!
//! The binaries (`src/main.rs`, `src/bin/replay.rs`) are thin harnesses
//! around these components.

pub mod aggregator;
pub mod config;
pub mod live;
pub mod logging;
pub mod metrics;
pub mod parser;
pub mod plot;
pub mod reporter;
pub mod runner;
pub mod telemetry;
pub mod transport;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use aggregator::{BoundarySignal, EpisodeAggregator, RunStartPolicy, RunState};
pub use config::{Config, PlotConfig};
pub use logging::{FileSink, NoopSink, SummarySink};
pub use metrics::OnlineStats;
pub use parser::RecordParser;
pub use reporter::RunReporter;
pub use runner::StreamRunner;
pub use telemetry::{TelemetryMode, TelemetrySink};
pub use transport::{FileTransport, LineTransport, MemoryTransport};
pub use types::{timestamp_from_parts, EpisodeSummary, ObservationRecord, TimestampMicros};
