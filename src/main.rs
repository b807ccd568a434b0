// src/main.rs
//
// UDP plot-server entrypoint for episcope.
//
// Constraints:
// - CLI precedence: flags override EPISCOPE_* env vars, which override
//   defaults.
// - Print a concise startup header (version, listen addr, plot dir).
// - Bind the endpoint before entering the loop; a taken port aborts
//   startup.
// - On shutdown (Ctrl-C or trainer goodbye) flush the open episode,
//   render final artifacts and print the run report.

use anyhow::Result;
use clap::{ArgAction, Parser};

use episcope::aggregator::RunStartPolicy;
use episcope::config::Config;
use episcope::live;
use episcope::logging::{FileSink, NoopSink, SummarySink};
use episcope::runner::StreamRunner;
use episcope::telemetry::TelemetrySink;

#[derive(Debug, Parser)]
#[command(
    name = "episcope",
    about = "RL training-telemetry plot server (UDP ingest + learning-curve export)",
    version
)]
struct Args {
    /// UDP listen host.
    #[arg(long)]
    host: Option<String>,

    /// UDP listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Directory for PNG artifacts.
    #[arg(long)]
    output_dir: Option<std::path::PathBuf>,

    /// Artifact filename prefix.
    #[arg(long)]
    prefix: Option<String>,

    /// Disable PNG export.
    #[arg(long, action = ArgAction::SetTrue)]
    no_plots: bool,

    /// Open-episode handling on a run-start signal: emit | discard.
    #[arg(long)]
    run_start_policy: Option<String>,

    /// Write closed-episode summaries to this JSONL file.
    #[arg(long)]
    summary_log: Option<std::path::PathBuf>,

    /// Verbosity: -v echoes accepted records, -vv debug.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn apply_args(cfg: &mut Config, args: &Args) {
    if let Some(host) = &args.host {
        cfg.host = host.clone();
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(dir) = &args.output_dir {
        cfg.plot.output_dir = dir.clone();
    }
    if let Some(prefix) = &args.prefix {
        cfg.plot.prefix = prefix.clone();
    }
    if args.no_plots {
        cfg.plot.enabled = false;
    }
    if let Some(raw) = &args.run_start_policy {
        match RunStartPolicy::parse(raw) {
            Some(p) => cfg.run_start_policy = p,
            None => eprintln!(
                "[config] WARN: invalid --run-start-policy {:?}; using {}",
                raw,
                cfg.run_start_policy.as_str()
            ),
        }
    }
    cfg.verbosity = args.verbose;
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Env overrides first, CLI on top.
    let mut cfg = Config::from_env();
    apply_args(&mut cfg, &args);

    println!(
        "episcope | cfg={} | listen={} | bufsize={} | run_start={} | plots={}",
        cfg.version,
        cfg.listen_addr(),
        cfg.bufsize,
        cfg.run_start_policy.as_str(),
        if cfg.plot.enabled {
            cfg.plot.output_dir.display().to_string()
        } else {
            "off".to_string()
        }
    );

    // The only fatal condition: the endpoint is unavailable.
    let socket = live::bind(&cfg).await?;

    let telemetry = TelemetrySink::from_env();
    let sink: Box<dyn SummarySink> = match &args.summary_log {
        Some(path) => Box::new(FileSink::create(path)?),
        None => Box::new(NoopSink),
    };

    let bufsize = cfg.bufsize;
    let mut runner = StreamRunner::new(cfg, telemetry, sink);
    live::serve(socket, bufsize, &mut runner).await;

    runner.print_run_report();
    Ok(())
}
