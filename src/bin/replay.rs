// src/bin/replay.rs
//
// Replay a recorded training log through the same pipeline the UDP
// server runs, and emit the same artifacts.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use episcope::config::Config;
use episcope::logging::{FileSink, NoopSink, SummarySink};
use episcope::runner::StreamRunner;
use episcope::telemetry::TelemetrySink;
use episcope::transport::FileTransport;

struct ReplayArgs {
    log: PathBuf,
    summary_log: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    no_plots: bool,
    verbose: u8,
}

fn parse_args() -> Result<ReplayArgs, String> {
    let mut args = env::args().skip(1);
    let mut log: Option<PathBuf> = None;
    let mut summary_log: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut no_plots = false;
    let mut verbose = 0u8;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log" => {
                let val = args.next().ok_or("Missing value for --log")?;
                log = Some(PathBuf::from(val));
            }
            "--summary-log" => {
                let val = args.next().ok_or("Missing value for --summary-log")?;
                summary_log = Some(PathBuf::from(val));
            }
            "--output-dir" => {
                let val = args.next().ok_or("Missing value for --output-dir")?;
                output_dir = Some(PathBuf::from(val));
            }
            "--no-plots" => no_plots = true,
            "-v" | "--verbose" => verbose += 1,
            "--help" | "-h" => {
                println!("USAGE: replay --log <PATH> [--summary-log <PATH>] [--output-dir <DIR>] [--no-plots] [-v]");
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    Ok(ReplayArgs {
        log: log.ok_or("Missing required --log <PATH>")?,
        summary_log,
        output_dir,
        no_plots,
        verbose,
    })
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("replay: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut cfg = Config::from_env();
    if let Some(dir) = &args.output_dir {
        cfg.plot.output_dir = dir.clone();
    }
    if args.no_plots {
        cfg.plot.enabled = false;
    }
    cfg.verbosity = args.verbose;

    let mut transport = match FileTransport::open(&args.log) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("replay: cannot open {}: {err}", args.log.display());
            return ExitCode::FAILURE;
        }
    };

    let sink: Box<dyn SummarySink> = match &args.summary_log {
        Some(path) => match FileSink::create(path) {
            Ok(sink) => Box::new(sink),
            Err(err) => {
                eprintln!("replay: cannot create {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(NoopSink),
    };

    let mut runner = StreamRunner::new(cfg, TelemetrySink::from_env(), sink);
    runner.run_transport(&mut transport);
    runner.print_run_report();

    ExitCode::SUCCESS
}
