//! vjson - check and normalize JSON vehicle messages
//!
//! Usage:
//!   vjson check [FILE]        Decode every message, report rejects
//!   vjson canon [FILE]        Re-encode every message in canonical form
//!   vjson init-config [PATH]  Write a default vjson.toml
//!
//! Messages are newline-delimited by default (`--nul` for NUL-delimited
//! device captures). Without FILE, input is read from stdin.

mod cli;
mod runner;

use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cli::{Cli, Command};
use runner::{Mode, Runner};
use vehicle_json::config::{self, Config, Delimiter};
use vehicle_json::error::{Result, ToolError};
use vehicle_json::stats::Snapshot;
use vehicle_json::{logging, JsonCodec};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns `Ok(false)` when some messages were rejected
fn run(cli: Cli) -> Result<bool> {
    let mut cfg = config::load(cli.config.as_deref());
    if let Some(size) = cli.buffer_size {
        cfg.io.buffer_size = size;
    }
    if cli.nul {
        cfg.io.delimiter = Delimiter::Nul;
    }

    match cli.command {
        Command::InitConfig { path } => {
            let path = config::config_path(path.as_deref());
            config::save(&Config::default(), &path)?;
            eprintln!("Wrote {}", path.display());
            Ok(true)
        }
        Command::Check { input } => process(&cfg, Mode::Check, input),
        Command::Canon { input } => process(&cfg, Mode::Canon, input),
    }
}

fn process(cfg: &Config, mode: Mode, input: Option<PathBuf>) -> Result<bool> {
    cfg.validate()?;

    let mut runner = Runner::new(JsonCodec::new(cfg.codec), &cfg.io);
    let stdout = io::stdout();
    let mut output = stdout.lock();

    match input {
        Some(path) => {
            let file = File::open(&path).map_err(|e| ToolError::Io {
                path: path.clone(),
                source: e,
            })?;
            runner.run(mode, BufReader::new(file), &path, &mut output)?;
        }
        None => {
            let stdin = io::stdin();
            runner.run(mode, stdin.lock(), Path::new("<stdin>"), &mut output)?;
        }
    }

    let snapshot = runner.stats().snapshot();
    print_summary(&snapshot);
    Ok(snapshot.total_rejected() == 0 && snapshot.total_encode_failures() == 0)
}

fn print_summary(snapshot: &Snapshot) {
    eprintln!(
        "{} decoded, {} rejected, {} bytes in, {} bytes out",
        snapshot.total_decoded(),
        snapshot.total_rejected(),
        snapshot.rx_bytes,
        snapshot.tx_bytes
    );
    for (kind, count) in &snapshot.decoded {
        eprintln!("  {:<20} {}", kind.as_str(), count);
    }
    for (kind, count) in &snapshot.rejected {
        eprintln!("  {:<20} {} rejected", kind, count);
    }
    for (kind, count) in &snapshot.encode_failures {
        eprintln!("  {:<20} {} failed to encode", kind, count);
    }
}
