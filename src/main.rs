use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use hellasort::logging::{FileSink, Logger};
use hellasort::{Algorithm, RunConfig, Size, TerminalDriver, VisualizerRuntime};

/// Animated sorting visualizer for the terminal.
#[derive(Parser)]
#[command(name = "hellasort", version, about)]
struct Cli {
    /// Algorithm to preselect: bubble, selection, insertion, quick, merge,
    /// heap, shell, or radix.
    #[arg(short, long, default_value = "bubble")]
    algorithm: String,

    /// Number of bars (clamped to 10-100).
    #[arg(short = 'n', long, default_value_t = 50)]
    size: usize,

    /// Playback speed (clamped to 1-100; the per-step delay is 200 - 2*speed ms).
    #[arg(short, long, default_value_t = 50)]
    speed: u8,

    /// Append JSON-lines runtime logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hellasort: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let algorithm: Algorithm = cli.algorithm.parse()?;
    let config = RunConfig::new(algorithm, cli.size, cli.speed);

    let mut runtime = VisualizerRuntime::new(config, Size::new(80, 24));
    if let Some(path) = cli.log_file {
        runtime.config_mut().logger = Some(Logger::new(FileSink::new(path, 1024 * 1024)?));
        runtime.config_mut().enable_metrics();
    }

    TerminalDriver::new(runtime).run()?;
    Ok(())
}
