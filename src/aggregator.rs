// src/aggregator.rs
//
// Stateful episode aggregation over the (episode, step) counters embedded
// in the record stream.
//
// Every record is classified exactly once into a BoundarySignal; the three
// cases drive all flushing decisions. The aggregator trusts arrival order:
// step values are not validated for monotonicity or contiguity, and
// duplicates are buffered like any other record. That is an external-data
// contract with the trainer, not something this module enforces.

use serde::{Deserialize, Serialize};

use crate::types::{EpisodeSummary, ObservationRecord, TimestampMicros};

/// What to do with an open episode buffer when a run-start signal arrives.
///
/// `Emit` hands the tail episode of the previous run to the caller before
/// resetting; `Discard` drops it silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStartPolicy {
    Emit,
    Discard,
}

impl RunStartPolicy {
    /// Stable lowercase name (used in logs / startup header).
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStartPolicy::Emit => "emit",
            RunStartPolicy::Discard => "discard",
        }
    }

    /// Parse a policy name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<RunStartPolicy> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emit" | "e" => Some(RunStartPolicy::Emit),
            "discard" | "drop" | "d" => Some(RunStartPolicy::Discard),
            _ => None,
        }
    }
}

/// Per-record classification of the (episode, step) counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySignal {
    /// episode == 0 && step == 0: a brand-new run begins with this record.
    RunStart,
    /// step == 0 otherwise: a new episode begins with this record.
    EpisodeBoundary,
    /// Anything else: the record belongs to the open episode.
    WithinEpisode,
}

impl BoundarySignal {
    /// Classify a record. Pure function of the counters.
    pub fn classify(record: &ObservationRecord) -> Self {
        if record.episode == 0 && record.step == 0 {
            BoundarySignal::RunStart
        } else if record.step == 0 {
            BoundarySignal::EpisodeBoundary
        } else {
            BoundarySignal::WithinEpisode
        }
    }
}

/// State of the run currently being aggregated.
///
/// Holds at most one open episode buffer at a time. Records are retained
/// in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    buffer: Vec<ObservationRecord>,
    min_time: Option<TimestampMicros>,
    max_time: Option<TimestampMicros>,
    episodes_closed: usize,
}

impl RunState {
    /// True when no episode buffer is open.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Records buffered for the open episode, in arrival order.
    pub fn open_buffer(&self) -> &[ObservationRecord] {
        &self.buffer
    }

    /// Smallest timestamp observed this run.
    pub fn min_time(&self) -> Option<TimestampMicros> {
        self.min_time
    }

    /// Largest timestamp observed this run.
    pub fn max_time(&self) -> Option<TimestampMicros> {
        self.max_time
    }

    /// Episodes closed so far this run.
    pub fn episodes_closed(&self) -> usize {
        self.episodes_closed
    }
}

/// Consumes ObservationRecords one at a time and emits an EpisodeSummary
/// whenever a boundary signal flushes a non-empty episode buffer.
///
/// Owns its RunState explicitly; independent aggregators never share state.
/// Defined for a single ordered input sequence only; callers feeding it
/// from multiple producers must serialize records into one queue first.
#[derive(Debug, Clone)]
pub struct EpisodeAggregator {
    policy: RunStartPolicy,
    state: RunState,
}

impl Default for EpisodeAggregator {
    fn default() -> Self {
        Self::new(RunStartPolicy::Emit)
    }
}

impl EpisodeAggregator {
    pub fn new(policy: RunStartPolicy) -> Self {
        Self {
            policy,
            state: RunState::default(),
        }
    }

    /// Current run state (read-only).
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Consume one record.
    ///
    /// Returns the summary of the episode the record closed, if any:
    /// - RunStart: flush the open buffer per the RunStartPolicy, then reset
    ///   the run state and open episode 0 with this record.
    /// - EpisodeBoundary: flush the open buffer and open the new episode
    ///   with this record.
    /// - WithinEpisode: buffer the record.
    ///
    /// Closing an empty buffer emits nothing. A record arriving with no
    /// open run opens one implicitly.
    pub fn ingest(&mut self, record: ObservationRecord) -> Option<EpisodeSummary> {
        let flushed = match BoundarySignal::classify(&record) {
            BoundarySignal::RunStart => {
                let tail = self.flush_open();
                let tail = match self.policy {
                    RunStartPolicy::Emit => tail,
                    RunStartPolicy::Discard => None,
                };
                self.state = RunState::default();
                tail
            }
            BoundarySignal::EpisodeBoundary => self.flush_open(),
            BoundarySignal::WithinEpisode => None,
        };

        self.buffer_record(record);
        flushed
    }

    /// End-of-stream flush: close the open episode as if an implicit
    /// boundary had arrived. A second call returns None.
    pub fn finish(&mut self) -> Option<EpisodeSummary> {
        self.flush_open()
    }

    fn flush_open(&mut self) -> Option<EpisodeSummary> {
        let buffer = std::mem::take(&mut self.state.buffer);
        let first = buffer.first()?;
        let last = buffer.last()?;

        let summary = EpisodeSummary {
            episode: first.episode,
            step_count: buffer.len(),
            start_time: first.timestamp,
            end_time: last.timestamp,
            final_fitness: last.fitness,
            samples: buffer.iter().map(|r| (r.step, r.fitness)).collect(),
        };

        self.state.episodes_closed += 1;
        Some(summary)
    }

    fn buffer_record(&mut self, record: ObservationRecord) {
        let ts = record.timestamp;
        self.state.min_time = Some(self.state.min_time.map_or(ts, |t| t.min(ts)));
        self.state.max_time = Some(self.state.max_time.map_or(ts, |t| t.max(ts)));
        self.state.buffer.push(record);
    }
}
