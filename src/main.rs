use anyhow::Result;
use clap::{Parser, ValueEnum};
use neuro_snake::game::GameConfig;
use neuro_snake::modes::{HumanMode, TrainConfig, TrainMode, VisualizeMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuro_snake")]
#[command(version, about = "Snake game played by evolved neural networks")]
struct Cli {
    /// Game mode
    #[arg(long, value_enum, default_value = "human")]
    mode: Mode,

    /// Grid width
    #[arg(long, default_value = "20")]
    width: usize,

    /// Grid height
    #[arg(long, default_value = "20")]
    height: usize,

    /// Seed for pill placement (human/visualize) or for the whole run (train)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generations to evolve (train mode)
    #[arg(long, default_value = "100")]
    generations: usize,

    /// Genomes per generation (train mode)
    #[arg(long, default_value = "150")]
    population: usize,

    /// Where the winning policy is saved (train) or loaded from (visualize)
    #[arg(long, default_value = "models/winner.json")]
    model: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Play snake with keyboard controls
    Human,
    /// Evolve a policy and save the best network
    Train,
    /// Watch a saved policy play
    Visualize,
}

impl Mode {
    /// Log level used when RUST_LOG is unset
    ///
    /// TUI modes stay silent since log lines would tear the alternate screen.
    fn default_log_filter(self) -> &'static str {
        match self {
            Mode::Train => "info",
            Mode::Human | Mode::Visualize => "off",
        }
    }
}

fn init_tracing(mode: Mode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(mode.default_log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.mode);

    let mut config = GameConfig::new(cli.width, cli.height);

    match cli.mode {
        Mode::Human => {
            config.seed = cli.seed;
            let mut human_mode = HumanMode::new(config)?;
            human_mode.run().await?;
        }
        Mode::Train => {
            let mut train_config = TrainConfig::new(cli.generations, cli.model);
            train_config.evolution.population_size = cli.population;
            train_config.evolution.game = config;
            if let Some(seed) = cli.seed {
                train_config.evolution.seed = seed;
            }

            // Evolution is CPU-bound; keep it off the async workers
            let mut train_mode = TrainMode::new(train_config)?;
            tokio::task::spawn_blocking(move || train_mode.run()).await??;
        }
        Mode::Visualize => {
            config.seed = cli.seed;
            let mut visualize_mode = VisualizeMode::new(&cli.model, config)?;
            visualize_mode.run().await?;
        }
    }

    Ok(())
}
