// src/config.rs
//
// Central configuration for the episcope pipeline.
// Single source of truth for the transport endpoint, aggregation policy
// and plot export. Defaults match the trainer's stock log endpoint
// (localhost:9999, 4086-byte datagrams).
//
// Precedence order (highest to lowest):
// 1. CLI argument
// 2. Environment variable (EPISCOPE_*)
// 3. Default

use std::env;
use std::path::PathBuf;

use crate::aggregator::RunStartPolicy;

/// Plot export configuration.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Render PNG artifacts at flush points.
    pub enabled: bool,
    /// Directory artifacts are written to.
    pub output_dir: PathBuf,
    /// Artifact filename prefix, e.g. `episcope-`.
    pub prefix: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("."),
            prefix: "episcope-".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Human-readable config / release version.
    pub version: &'static str,
    /// UDP listen host.
    pub host: String,
    /// UDP listen port.
    pub port: u16,
    /// Receive buffer size per datagram.
    pub bufsize: usize,
    /// What to do with an open episode when a run-start signal arrives.
    pub run_start_policy: RunStartPolicy,
    /// Plot export settings.
    pub plot: PlotConfig,
    /// Verbosity: 0 = quiet, 1 = echo accepted records, 2 = debug.
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "v0.1.0",
            host: "localhost".to_string(),
            port: 9999,
            bufsize: 4086,
            run_start_policy: RunStartPolicy::Emit,
            plot: PlotConfig::default(),
            verbosity: 0,
        }
    }
}

impl Config {
    /// Listen address in `host:port` form.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Defaults with EPISCOPE_* environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();

        if let Ok(raw) = env::var("EPISCOPE_HOST") {
            if !raw.is_empty() {
                cfg.host = raw;
            }
        }

        if let Ok(raw) = env::var("EPISCOPE_PORT") {
            match raw.parse::<u16>() {
                Ok(v) => cfg.port = v,
                Err(_) => {
                    eprintln!(
                        "[config] WARN: could not parse EPISCOPE_PORT = {:?} as u16; using default {}",
                        raw, cfg.port
                    );
                }
            }
        }

        if let Ok(raw) = env::var("EPISCOPE_BUFSIZE") {
            match raw.parse::<usize>() {
                Ok(v) if v > 0 => cfg.bufsize = v,
                _ => {
                    eprintln!(
                        "[config] WARN: could not parse EPISCOPE_BUFSIZE = {:?} as usize; using default {}",
                        raw, cfg.bufsize
                    );
                }
            }
        }

        if let Ok(raw) = env::var("EPISCOPE_RUN_START_POLICY") {
            match RunStartPolicy::parse(&raw) {
                Some(p) => cfg.run_start_policy = p,
                None => {
                    eprintln!(
                        "[config] WARN: invalid EPISCOPE_RUN_START_POLICY={:?}; using {}",
                        raw,
                        cfg.run_start_policy.as_str()
                    );
                }
            }
        }

        if let Ok(raw) = env::var("EPISCOPE_PLOT_DIR") {
            if !raw.is_empty() {
                cfg.plot.output_dir = PathBuf::from(raw);
            }
        }

        if let Ok(raw) = env::var("EPISCOPE_PLOT_PREFIX") {
            if !raw.is_empty() {
                cfg.plot.prefix = raw;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_endpoint() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr(), "localhost:9999");
        assert_eq!(cfg.bufsize, 4086);
        assert_eq!(cfg.run_start_policy, RunStartPolicy::Emit);
        assert!(cfg.plot.enabled);
    }
}
