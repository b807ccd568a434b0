// src/parser.rs
//
// Turns one raw log line into a typed ObservationRecord.
//
// The trainer emits ai-tick lines of the form
//
//   2010-Jan-02 10:11:12.123 (M) [ai.tick] agent_0 3 17 0.5 12.25
//
// i.e. a date/time stamp with a millisecond field, the (m) marker, the
// bracketed ai.tick tag, then identifier, episode, step, reward and fitness.
// Matching is case-insensitive: the line is lowercased before the pattern
// is applied. Anything that does not match is not an error; the caller
// skips it and carries on.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::types::{timestamp_from_parts, ObservationRecord};

/// Date/time layout of the stamp preceding the millisecond field.
const TIMESTAMP_FORMAT: &str = "%Y-%b-%d %H:%M:%S";

static AI_TICK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<date>[^\[]*)\.(?P<msec>[0-9]+) \(m\) \[ai\.tick\]\s+(?P<id>\S+)\s+(?P<episode>\S+)\s+(?P<step>\S+)\s+(?P<reward>\S+)\s+(?P<fitness>\S+)",
    )
    .expect("hardcoded regex")
});

/// Parser for ai-tick records.
///
/// Stateless and side-effect free; `parse` is total over arbitrary input.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one line. Returns `None` for anything that is not a
    /// well-formed ai-tick record (unrecognized line, malformed field).
    pub fn parse(&self, line: &str) -> Option<ObservationRecord> {
        let line = line.trim().to_lowercase();
        let caps = AI_TICK_PATTERN.captures(&line)?;

        let date = caps.name("date")?.as_str().trim();
        let stamp = NaiveDateTime::parse_from_str(date, TIMESTAMP_FORMAT).ok()?;
        let msec: i64 = caps.name("msec")?.as_str().parse().ok()?;

        let agent_id = caps.name("id")?.as_str().to_string();
        let episode: u32 = caps.name("episode")?.as_str().parse().ok()?;
        let step: u32 = caps.name("step")?.as_str().parse().ok()?;
        let reward: f64 = caps.name("reward")?.as_str().parse().ok()?;
        let fitness: f64 = caps.name("fitness")?.as_str().parse().ok()?;

        Some(ObservationRecord {
            timestamp: timestamp_from_parts(stamp.and_utc().timestamp(), msec),
            agent_id,
            episode,
            step,
            reward,
            fitness,
        })
    }
}
