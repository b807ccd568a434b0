// src/types.rs
//
// Common shared types for the episcope telemetry pipeline.

use serde::{Deserialize, Serialize};

/// Microsecond-scale timestamp derived from a log line.
///
/// Built as `whole_seconds * 1_000_000 + msec`, where `msec` is the raw
/// millisecond field of the log line. The millisecond field is *not*
/// rescaled; consumers rely on ordering of these values, never on their
/// absolute magnitude (see DESIGN.md).
pub type TimestampMicros = i64;

/// Combine a whole-second epoch value with the raw millisecond field.
pub fn timestamp_from_parts(epoch_secs: i64, msec: i64) -> TimestampMicros {
    epoch_secs * 1_000_000 + msec
}

/// One parsed ai-tick observation. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Timestamp of the observation.
    pub timestamp: TimestampMicros,
    /// Opaque agent identifier. Not unique across episodes.
    pub agent_id: String,
    /// Episode counter reported by the trainer.
    pub episode: u32,
    /// Step counter within the episode.
    pub step: u32,
    /// Per-step reward.
    pub reward: f64,
    /// Cumulative fitness at this step.
    pub fitness: f64,
}

/// Summary of a closed episode.
///
/// Created when a boundary signal flushes a non-empty episode buffer.
/// `final_fitness` is the fitness of the last record appended before
/// closure; `samples` keep arrival order and are never re-sorted by step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode index, taken from the first buffered record.
    pub episode: u32,
    /// Number of buffered records.
    pub step_count: usize,
    /// Timestamp of the first buffered record.
    pub start_time: TimestampMicros,
    /// Timestamp of the last buffered record.
    pub end_time: TimestampMicros,
    /// Fitness of the last buffered record.
    pub final_fitness: f64,
    /// (step, fitness) samples in arrival order.
    pub samples: Vec<(u32, f64)>,
}

impl EpisodeSummary {
    /// Wall-clock span covered by the episode, in timestamp units.
    pub fn time_span(&self) -> i64 {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_combination_preserves_ordering() {
        // Same second, increasing msec field => increasing timestamps.
        let a = timestamp_from_parts(1_000, 1);
        let b = timestamp_from_parts(1_000, 999);
        let c = timestamp_from_parts(1_001, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn episode_summary_time_span() {
        let summary = EpisodeSummary {
            episode: 3,
            step_count: 2,
            start_time: 10,
            end_time: 250,
            final_fitness: 1.5,
            samples: vec![(0, 1.0), (1, 1.5)],
        };
        assert_eq!(summary.time_span(), 240);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = ObservationRecord {
            timestamp: 1_234_567,
            agent_id: "agent_7".to_string(),
            episode: 2,
            step: 14,
            reward: -0.25,
            fitness: 3.5,
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ObservationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
