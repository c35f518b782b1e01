use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use sigback::data::CsvSourceReader;
use sigback::diagnostics::PngSink;
use sigback::network::TextReport;
use sigback::train::ConsoleCommands;
use sigback::{DataPipeline, InteractiveController, NetworkWeights, RunConfig, SharedRng, TrainingScheduler};

/// Train and evaluate a signal/background classifier interactively.
///
/// At the prompt: `P` prints the weights, `E` scores the evaluation
/// partition and writes plots, `R` trains for a number of samples entered
/// next. End of input (Ctrl-D) exits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON run configuration
    #[arg(long)]
    config: PathBuf,

    /// Worker threads (default: available cores minus one)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for the shared random generator
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for plots
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Number of node layers, input layer included
    #[arg(long)]
    depth: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RunConfig::load_json(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    if cli.threads.is_some() {
        config.threads = cli.threads;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(depth) = cli.depth {
        config.depth = depth;
    }
    config.validate()?;

    let rng = SharedRng::from_optional_seed(config.seed);
    let dataset = DataPipeline::new(&config, &CsvSourceReader, &rng)
        .run(&config.sources)
        .context("Failed to build dataset")?;

    let weights = NetworkWeights::random(config.depth, config.width(), config.init_range, &rng);
    let scheduler = TrainingScheduler::new(&dataset, weights, &rng, config.thread_count());
    info!(
        "training {} samples, evaluating {}, on {} threads",
        dataset.training().len(),
        dataset.evaluation().len(),
        scheduler.threads()
    );

    let mut controller = InteractiveController::new(
        ConsoleCommands,
        Box::new(PngSink::new(&config.output_dir)),
        Box::new(TextReport::stdout()),
        config.phase_cap,
    );
    scheduler.run(&mut controller)?;

    println!("done");
    Ok(())
}
