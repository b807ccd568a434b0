// tests/aggregator_boundary_tests.rs
//
// Boundary-signal behavior of the episode aggregator, driven through the
// public API with parsed records:
// - a boundary record closes the previous episode and opens the next
// - end-of-stream flush covers the open episode
// - empty-buffer boundaries emit nothing
// - arrival order is trusted (no step monotonicity validation)

use episcope::{EpisodeAggregator, ObservationRecord, RecordParser, RunStartPolicy};

fn tick_line(episode: u32, step: u32, reward: f64, fitness: f64) -> String {
    format!(
        "2010-Jan-02 10:11:12.{} (M) [ai.tick] agent_0 {episode} {step} {reward} {fitness}",
        episode * 100 + step
    )
}

fn parse(line: &str) -> ObservationRecord {
    RecordParser::new().parse(line).expect("fixture line parses")
}

#[test]
fn boundary_closes_episode_with_final_fitness_of_last_arrival() {
    // (ep=0,step=0,fit=1.0), (ep=0,step=1,fit=2.0), (ep=1,step=0,fit=3.0)
    let mut agg = EpisodeAggregator::default();

    assert!(agg.ingest(parse(&tick_line(0, 0, 0.0, 1.0))).is_none());
    assert!(agg.ingest(parse(&tick_line(0, 1, 0.0, 2.0))).is_none());

    let summary = agg
        .ingest(parse(&tick_line(1, 0, 0.0, 3.0)))
        .expect("episode 0 must close");

    assert_eq!(summary.episode, 0);
    assert_eq!(summary.step_count, 2);
    assert!((summary.final_fitness - 2.0).abs() < 1e-12);
}

#[test]
fn end_of_stream_flush_covers_lone_record() {
    // (ep=0,step=0,fit=5.0) alone, then the stream ends.
    let mut agg = EpisodeAggregator::default();
    assert!(agg.ingest(parse(&tick_line(0, 0, 0.0, 5.0))).is_none());

    let summary = agg.finish().expect("end-of-stream flush");
    assert_eq!(summary.episode, 0);
    assert_eq!(summary.step_count, 1);
    assert!((summary.final_fitness - 5.0).abs() < 1e-12);

    // Nothing left to flush afterwards.
    assert!(agg.finish().is_none());
}

#[test]
fn stream_opening_on_boundary_emits_nothing() {
    let mut agg = EpisodeAggregator::default();
    // step == 0 with an empty buffer: nothing to close.
    assert!(agg.ingest(parse(&tick_line(3, 0, 0.0, 1.0))).is_none());
}

#[test]
fn consecutive_run_starts_under_discard_emit_nothing() {
    let mut agg = EpisodeAggregator::new(RunStartPolicy::Discard);
    assert!(agg.ingest(parse(&tick_line(0, 0, 0.0, 1.0))).is_none());
    assert!(agg.ingest(parse(&tick_line(0, 0, 0.0, 2.0))).is_none());
    assert_eq!(agg.state().episodes_closed(), 0);
}

#[test]
fn run_start_under_emit_returns_previous_runs_tail() {
    let mut agg = EpisodeAggregator::new(RunStartPolicy::Emit);
    agg.ingest(parse(&tick_line(0, 0, 0.0, 1.0)));
    agg.ingest(parse(&tick_line(0, 1, 0.0, 4.0)));

    let tail = agg
        .ingest(parse(&tick_line(0, 0, 0.0, 9.0)))
        .expect("tail episode of the previous run");
    assert_eq!(tail.step_count, 2);
    assert!((tail.final_fitness - 4.0).abs() < 1e-12);

    // The new run opened with exactly the run-start record.
    assert_eq!(agg.state().open_buffer().len(), 1);
    assert_eq!(agg.state().episodes_closed(), 0);
}

#[test]
fn non_monotonic_steps_are_buffered_in_arrival_order() {
    let mut agg = EpisodeAggregator::default();
    agg.ingest(parse(&tick_line(0, 0, 0.0, 1.0)));
    agg.ingest(parse(&tick_line(0, 7, 0.0, 2.0)));
    agg.ingest(parse(&tick_line(0, 4, 0.0, 3.0)));

    let summary = agg.finish().expect("flush");
    let steps: Vec<u32> = summary.samples.iter().map(|&(s, _)| s).collect();
    assert_eq!(steps, vec![0, 7, 4]);
    // Last arrival wins, not the largest step.
    assert!((summary.final_fitness - 3.0).abs() < 1e-12);
}

#[test]
fn summary_timestamps_span_first_to_last_arrival() {
    let parser = RecordParser::new();
    let first = parser
        .parse("2010-Jan-02 10:11:12.100 (M) [ai.tick] a 0 0 0.0 1.0")
        .unwrap();
    let last = parser
        .parse("2010-Jan-02 10:11:15.200 (M) [ai.tick] a 0 1 0.0 2.0")
        .unwrap();

    let mut agg = EpisodeAggregator::default();
    agg.ingest(first.clone());
    agg.ingest(last.clone());

    let summary = agg.finish().expect("flush");
    assert_eq!(summary.start_time, first.timestamp);
    assert_eq!(summary.end_time, last.timestamp);
    assert!(summary.time_span() > 0);
}
