mod menu;
mod render;

use accel_lib::{
    config::AnalysisConfig, filter::FilterKind, io::csv::load_recording, session::AnalysisSession,
};
use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use log::{info, warn};
use menu::Menu;
use render::PngSink;
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

#[derive(Parser, Debug)]
#[command(
    name = "accel",
    version,
    about = "Inspect timestamped acceleration logs: sampling rate, peaks, spectrum, filters"
)]
struct Cli {
    /// Input log, one `YYYY-MM-DD HH:MM:SS.ffffff,value` record per line
    #[arg(short = 'i', long)]
    infile: PathBuf,
    /// Filter family used by the filtering view (fir or iir)
    #[arg(short = 't', long = "type")]
    filter_type: Option<String>,
    /// TOML file with analysis settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory receiving the rendered figures
    #[arg(long, default_value = "plots")]
    out_dir: PathBuf,
    /// Print reports as JSON
    #[arg(long)]
    json: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Everything a session needs, resolved once from the command line.
#[derive(Debug)]
struct SessionConfig {
    infile: PathBuf,
    out_dir: PathBuf,
    json: bool,
    analysis: AnalysisConfig,
}

impl SessionConfig {
    fn from_cli(cli: Cli) -> Result<Self> {
        let mut analysis = match &cli.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(text) = &cli.filter_type {
            analysis = analysis.with_filter(resolve_filter_kind(text));
        }
        Ok(Self {
            infile: cli.infile,
            out_dir: cli.out_dir,
            json: cli.json,
            analysis,
        })
    }
}

fn resolve_filter_kind(text: &str) -> FilterKind {
    FilterKind::parse(text).unwrap_or_else(|| {
        warn!("unknown filter type `{text}`, falling back to fir");
        FilterKind::Fir
    })
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(config: SessionConfig) -> Result<()> {
    let recording = load_recording(&config.infile)?;
    info!(
        "loaded {} samples from {}",
        recording.len(),
        config.infile.display()
    );
    let session = AnalysisSession::new(recording, config.analysis);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(
        &session,
        stdin.lock(),
        stdout.lock(),
        PngSink::new(&config.out_dir),
        config.json,
    );
    menu.run()?;
    io::stdout().flush()?;
    Ok(())
}

/// Exit status after clap stops parsing: help and version are not failures.
fn usage_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(io) = e.print() {
                eprintln!("Error: could not print usage: {io}");
                return ExitCode::from(1);
            }
            return ExitCode::from(usage_status(e.kind()));
        }
    };
    init_logging(cli.verbose);
    let outcome = SessionConfig::from_cli(cli).and_then(run);
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
