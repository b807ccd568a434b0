// src/runner.rs
//
// Single-threaded poll-and-process loop: raw text chunks in, closed
// episodes routed to the reporter and sinks, plots rendered at flush
// points. Records are consumed strictly one at a time in arrival order;
// callers with multiple producers must serialize chunks before handing
// them over.

use std::fs;

use crate::aggregator::{BoundarySignal, EpisodeAggregator};
use crate::config::Config;
use crate::logging::SummarySink;
use crate::parser::RecordParser;
use crate::plot;
use crate::reporter::RunReporter;
use crate::telemetry::TelemetrySink;
use crate::transport::LineTransport;
use crate::types::{EpisodeSummary, ObservationRecord};

/// Owns the whole pipeline for one stream.
pub struct StreamRunner<S: SummarySink> {
    cfg: Config,
    parser: RecordParser,
    aggregator: EpisodeAggregator,
    reporter: RunReporter,
    telemetry: TelemetrySink,
    sink: S,
    records_seen: u64,
    lines_skipped: u64,
    finished: bool,
}

impl<S: SummarySink> StreamRunner<S> {
    pub fn new(cfg: Config, telemetry: TelemetrySink, sink: S) -> Self {
        let aggregator = EpisodeAggregator::new(cfg.run_start_policy);
        Self {
            cfg,
            parser: RecordParser::new(),
            aggregator,
            reporter: RunReporter::new(),
            telemetry,
            sink,
            records_seen: 0,
            lines_skipped: 0,
            finished: false,
        }
    }

    /// Process one chunk of raw text. A chunk may carry several
    /// newline-delimited lines; each is parsed independently.
    pub fn process_chunk(&mut self, text: &str) {
        for line in text.lines() {
            self.process_line(line);
        }
    }

    /// Process a single raw line. Unrecognized lines are counted and
    /// skipped, never an error.
    pub fn process_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match self.parser.parse(line) {
            Some(record) => self.process_record(record),
            None => self.lines_skipped += 1,
        }
    }

    fn process_record(&mut self, record: ObservationRecord) {
        self.records_seen += 1;
        self.telemetry.log_record(&record);

        if self.cfg.verbosity >= 1 {
            println!(
                "tick {}: t={} ep={} step={} reward={:.3} fitness={:.3}",
                self.records_seen,
                record.timestamp,
                record.episode,
                record.step,
                record.reward,
                record.fitness
            );
        }

        let signal = BoundarySignal::classify(&record);
        if let Some(summary) = self.aggregator.ingest(record) {
            self.route_summary(summary);
        }

        // A run-start closes out the previous run: save its artifacts,
        // then reset the reporter so the series covers exactly one run.
        if signal == BoundarySignal::RunStart && self.reporter.episode_count() > 0 {
            self.render_artifacts();
            self.reporter.reset();
        }
    }

    /// Drain a transport to end of stream, then flush.
    ///
    /// A transport error is treated as end of stream: the open episode is
    /// flushed so no in-flight data is lost.
    pub fn run_transport(&mut self, transport: &mut dyn LineTransport) {
        loop {
            match transport.receive() {
                Ok(Some(chunk)) => self.process_chunk(&chunk),
                Ok(None) => break,
                Err(err) => {
                    eprintln!("[transport] disconnect: {err}; flushing");
                    break;
                }
            }
        }
        self.finish();
    }

    /// End-of-stream flush: close the open episode, render artifacts,
    /// flush sinks. Safe to call more than once.
    pub fn finish(&mut self) {
        if let Some(summary) = self.aggregator.finish() {
            self.route_summary(summary);
        }
        if !self.finished {
            self.render_artifacts();
        }
        self.telemetry.flush();
        self.finished = true;
    }

    fn route_summary(&mut self, summary: EpisodeSummary) {
        if self.cfg.verbosity >= 1 {
            println!(
                "episode {} closed: steps={} final_fitness={:.3}",
                summary.episode, summary.step_count, summary.final_fitness
            );
        }
        self.sink.log_summary(&summary);
        self.reporter.on_episode_closed(summary);
    }

    fn render_artifacts(&mut self) {
        if !self.cfg.plot.enabled || self.reporter.episode_count() == 0 {
            return;
        }

        let dir = &self.cfg.plot.output_dir;
        if let Err(err) = fs::create_dir_all(dir) {
            eprintln!("[plot] WARN: cannot create {}: {err}", dir.display());
            return;
        }

        let series_path = plot::timestamped_path(dir, &self.cfg.plot.prefix, "-fitness.png");
        if let Err(err) = plot::render_run_series(&series_path, &self.reporter.run_series()) {
            eprintln!("[plot] WARN: run series render failed: {err}");
        }

        if let Some(latest) = self.reporter.latest_episode() {
            let curve_path = plot::timestamped_path(dir, &self.cfg.plot.prefix, "-episodes.png");
            if let Err(err) = plot::render_episode_curve(&curve_path, latest) {
                eprintln!("[plot] WARN: episode curve render failed: {err}");
            }
        }
    }

    /// Print a concise run report (episode count + fitness statistics).
    pub fn print_run_report(&self) {
        let stats = self.reporter.fitness_stats();
        println!();
        println!("=== Run Report ===");
        println!("Records accepted: {}", self.records_seen);
        println!("Lines skipped: {}", self.lines_skipped);
        println!("Episodes closed: {}", self.reporter.episode_count());
        if stats.n() > 0 {
            println!(
                "Final fitness: mean={:.3} min={:.3} max={:.3} stddev={:.3}",
                stats.mean(),
                stats.min(),
                stats.max(),
                stats.stddev_sample()
            );
        }
    }

    pub fn reporter(&self) -> &RunReporter {
        &self.reporter
    }

    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoopSink;
    use crate::transport::MemoryTransport;

    fn line(episode: u32, step: u32, fitness: f64) -> String {
        format!(
            "2010-Jan-02 10:11:{:02}.{} (M) [ai.tick] agent_0 {} {} 0.5 {}",
            (episode * 10 + step).min(59),
            episode * 100 + step,
            episode,
            step,
            fitness
        )
    }

    fn quiet_runner() -> StreamRunner<NoopSink> {
        let mut cfg = Config::default();
        cfg.plot.enabled = false;
        StreamRunner::new(cfg, TelemetrySink::disabled(), NoopSink)
    }

    #[test]
    fn malformed_lines_do_not_change_the_outcome() {
        let mut clean = quiet_runner();
        clean.process_chunk(&format!(
            "{}\n{}\n{}",
            line(0, 0, 1.0),
            line(0, 1, 2.0),
            line(1, 0, 3.0)
        ));

        let mut dirty = quiet_runner();
        dirty.process_chunk(&format!(
            "{}\ngarbage text\n{}\nanother bad line\n{}",
            line(0, 0, 1.0),
            line(0, 1, 2.0),
            line(1, 0, 3.0)
        ));

        assert_eq!(
            clean.reporter().summaries(),
            dirty.reporter().summaries()
        );
        assert_eq!(dirty.lines_skipped(), 2);
    }

    #[test]
    fn run_transport_flushes_on_end_of_stream() {
        let mut runner = quiet_runner();
        let mut transport = MemoryTransport::new([line(0, 0, 5.0)]);

        runner.run_transport(&mut transport);

        assert_eq!(runner.reporter().episode_count(), 1);
        let summary = runner.reporter().latest_episode().unwrap();
        assert_eq!(summary.step_count, 1);
        assert!((summary.final_fitness - 5.0).abs() < 1e-12);
    }

    #[test]
    fn run_start_resets_the_reporter() {
        let mut runner = quiet_runner();
        // First run: two episodes.
        runner.process_line(&line(0, 0, 1.0));
        runner.process_line(&line(0, 1, 2.0));
        runner.process_line(&line(1, 0, 3.0));
        assert_eq!(runner.reporter().episode_count(), 1);

        // New run begins: reporter starts over.
        runner.process_line(&line(0, 0, 9.0));
        assert!(runner.reporter().run_series().is_empty());

        // The new run accumulates independently.
        runner.process_line(&line(0, 1, 10.0));
        runner.finish();
        assert_eq!(runner.reporter().episode_count(), 1);
    }

    #[test]
    fn finish_is_safe_to_call_twice() {
        let mut runner = quiet_runner();
        runner.process_line(&line(0, 0, 1.0));
        runner.finish();
        runner.finish();
        assert_eq!(runner.reporter().episode_count(), 1);
    }

    #[test]
    fn chunk_with_multiple_lines_is_split() {
        let mut runner = quiet_runner();
        runner.process_chunk(&format!("{}\n{}\n", line(0, 0, 1.0), line(0, 1, 2.0)));
        assert_eq!(runner.records_seen(), 2);
    }
}
