#![warn(missing_docs)]
//! Gammaflow CLI Library
//!
//! Command-line harness around the key facts sweep: resolves configuration
//! from `gammaflow.toml` and flags, writes the graph structure for Graphviz,
//! runs the sweep under the selected execution strategy and streams results.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     gammaflow_cli::run()
//! }
//! ```

mod config;

pub use config::*;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use gammaflow_core::{RoundReport, Sweep, SweepConfig};
use gammaflow_graph::{Executor, ParallelExecutor, SequentialExecutor};
use gammaflow_report::{
    OutputFormat, SweepReport, format_round_line, generate_csv_report, generate_json_report,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Gammaflow CLI arguments
#[derive(Parser, Debug)]
#[command(name = "gammaflow")]
#[command(
    author,
    version,
    about = "Gammaflow - descriptive statistics over a re-evaluated dataflow graph"
)]
pub struct Cli {
    /// Optional subcommand (Run, Graph, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: discover gammaflow.toml upwards)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Evaluate on a worker pool instead of sequentially
    #[arg(long)]
    pub parallel: bool,

    /// Worker threads for --parallel
    #[arg(long)]
    pub workers: Option<usize>,

    /// Samples drawn per round
    #[arg(long, short = 'n')]
    pub samples: Option<usize>,

    /// Initial gamma shape
    #[arg(long)]
    pub shape: Option<f64>,

    /// Initial gamma scale
    #[arg(long)]
    pub scale: Option<f64>,

    /// Number of rounds
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Seed of the random source
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Significant digits for human output
    #[arg(long)]
    pub precision: Option<usize>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path of the DOT file describing the graph
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Do not write the DOT file
    #[arg(long)]
    pub no_dot: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sweep (default)
    Run,
    /// Print the graph structure as DOT and exit
    Graph,
    /// Print a default gammaflow.toml and exit
    Init,
}

/// Settings after merging configuration and flags
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Sweep parameters
    pub sweep: SweepConfig,
    /// Execution strategy
    pub strategy: Strategy,
    /// Worker threads for the parallel strategy
    pub workers: usize,
    /// Result format
    pub format: OutputFormat,
    /// Significant digits for human output
    pub precision: usize,
    /// Where to write the DOT file, if anywhere
    pub dot_path: Option<PathBuf>,
    /// Where to write results (stdout when `None`)
    pub output: Option<PathBuf>,
}

impl RunSettings {
    /// Merge `config` with `cli`; flags win
    pub fn resolve(cli: &Cli, config: &GammaflowConfig) -> anyhow::Result<Self> {
        let mut sweep = SweepConfig::from(&config.sweep);
        if let Some(samples) = cli.samples {
            sweep.sample_size = samples;
        }
        if let Some(shape) = cli.shape {
            sweep.shape = shape;
        }
        if let Some(scale) = cli.scale {
            sweep.scale = scale;
        }
        if let Some(rounds) = cli.rounds {
            sweep.rounds = rounds;
        }
        if let Some(seed) = cli.seed {
            sweep.seed = seed;
        }

        let strategy = if cli.parallel {
            Strategy::Parallel
        } else {
            config.executor.strategy
        };

        let format_name = cli.format.as_deref().unwrap_or(&config.output.format);
        let format = format_name.parse::<OutputFormat>().map_err(|e: String| anyhow!(e))?;

        let dot_path = if cli.no_dot || (!config.output.write_dot && cli.dot.is_none()) {
            None
        } else {
            Some(
                cli.dot
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&config.output.dot_path)),
            )
        };

        Ok(Self {
            sweep,
            strategy,
            workers: cli.workers.unwrap_or(config.executor.workers).max(1),
            format,
            precision: cli.precision.unwrap_or(config.output.precision),
            dot_path,
            output: cli.output.clone(),
        })
    }

    /// Worker threads actually used
    pub fn effective_workers(&self) -> usize {
        if self.strategy.is_parallel() {
            self.workers
        } else {
            1
        }
    }
}

/// Run the Gammaflow CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or the first error, including a failed round.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Gammaflow CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Logs go to stderr
    let filter = if cli.verbose {
        "gammaflow=debug"
    } else {
        "gammaflow=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = match &cli.config {
        Some(path) => GammaflowConfig::load(path)
            .map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?,
        None => match GammaflowConfig::discover() {
            Ok(found) => found.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "ignoring configuration file, using defaults");
                GammaflowConfig::default()
            }
        },
    };

    match cli.command {
        Some(Commands::Init) => {
            print!("{}", GammaflowConfig::default_toml());
        }
        Some(Commands::Graph) => {
            let settings = RunSettings::resolve(&cli, &config)?;
            let sweep = Sweep::new(settings.sweep)?;
            print!("{}", sweep.graph().graph().to_dot());
        }
        Some(Commands::Run) | None => {
            let settings = RunSettings::resolve(&cli, &config)?;
            run_sweep(&settings)?;
        }
    }

    Ok(())
}

/// Build the executor selected by `strategy`
pub fn build_executor(strategy: Strategy, workers: usize) -> anyhow::Result<Box<dyn Executor>> {
    match strategy {
        Strategy::Sequential => Ok(Box::new(SequentialExecutor)),
        Strategy::Parallel => Ok(Box::new(ParallelExecutor::new(workers)?)),
    }
}

fn run_sweep(settings: &RunSettings) -> anyhow::Result<()> {
    match &settings.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| anyhow!("Failed to create {}: {}", path.display(), e))?;
            let mut writer = std::io::BufWriter::new(file);
            run_sweep_to(settings, &mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), "results written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            run_sweep_to(settings, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Run the sweep described by `settings`, writing results to `writer`
///
/// Human output is streamed one line per round as rounds complete; JSON and
/// CSV are written once the sweep has finished.
pub fn run_sweep_to<W: Write>(
    settings: &RunSettings,
    writer: &mut W,
) -> anyhow::Result<Vec<RoundReport>> {
    let sweep = Sweep::new(settings.sweep.clone())?;

    if let Some(path) = &settings.dot_path {
        std::fs::write(path, sweep.graph().graph().to_dot())
            .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
        info!(path = %path.display(), "graph structure written");
    }

    let executor = build_executor(settings.strategy, settings.workers)?;
    info!(
        executor = executor.name(),
        workers = settings.effective_workers(),
        samples = settings.sweep.sample_size,
        rounds = settings.sweep.rounds,
        seed = sweep.seed(),
        "running sweep"
    );

    let start = Instant::now();
    let stream = settings.format == OutputFormat::Human;
    let precision = settings.precision;
    let rounds = sweep.run(executor.as_ref(), |report| {
        if stream {
            writeln!(writer, "{}", format_round_line(report, precision))?;
        }
        Ok(())
    })?;

    match settings.format {
        OutputFormat::Human => {}
        OutputFormat::Json => {
            let report = SweepReport::new(
                settings.sweep.clone(),
                executor.name(),
                settings.effective_workers(),
                rounds.clone(),
            );
            writeln!(writer, "{}", generate_json_report(&report)?)?;
        }
        OutputFormat::Csv => {
            let report = SweepReport::new(
                settings.sweep.clone(),
                executor.name(),
                settings.effective_workers(),
                rounds.clone(),
            );
            write!(writer, "{}", generate_csv_report(&report))?;
        }
    }

    info!(
        rounds = rounds.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "sweep complete"
    );
    Ok(rounds)
}
