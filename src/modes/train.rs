//! Training mode: evolve a snake-playing policy
//!
//! Runs the generational loop, prints progress every `log_frequency`
//! generations, and saves the best network found.
//!
//! # Example
//!
//! ```rust,no_run
//! use neuro_snake::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(50, PathBuf::from("models/winner.json"));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::evolve::{Champion, Evolution, EvolutionConfig, GenerationStats, save_policy};
use crate::metrics::TrainingStats;

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Path the winning policy is written to
    pub save_path: PathBuf,

    /// Save the best-so-far policy every N generations; 0 disables checkpoints
    pub checkpoint_frequency: usize,

    /// Print progress every N generations
    pub log_frequency: usize,

    /// Evolution hyperparameters, board rules included
    pub evolution: EvolutionConfig,
}

impl TrainConfig {
    /// Training configuration with default hyperparameters
    ///
    /// ```rust
    /// use neuro_snake::modes::TrainConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = TrainConfig::new(200, PathBuf::from("models/winner.json"));
    /// assert_eq!(config.evolution.generations, 200);
    /// ```
    pub fn new(generations: usize, save_path: PathBuf) -> Self {
        Self {
            save_path,
            checkpoint_frequency: 25,
            log_frequency: 1,
            evolution: EvolutionConfig {
                generations,
                ..Default::default()
            },
        }
    }
}

/// Training mode driving an [`Evolution`]
pub struct TrainMode {
    evolution: Evolution,
    stats: TrainingStats,
    config: TrainConfig,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Result<Self> {
        let evolution = Evolution::new(config.evolution.clone())?;

        Ok(Self {
            evolution,
            stats: TrainingStats::new(10),
            config,
        })
    }

    /// Run every generation, then save the champion
    pub fn run(&mut self) -> Result<Champion> {
        self.print_header();

        let Self {
            evolution,
            stats,
            config,
        } = &mut *self;

        let champion = evolution.run(|generation, best| {
            stats.record_generation(generation.best_fitness, generation.mean_fitness);
            let done = generation.generation + 1;

            if config.log_frequency > 0 && done % config.log_frequency == 0 {
                print_progress(generation, config.evolution.generations, stats);
            }

            if config.checkpoint_frequency > 0 && done % config.checkpoint_frequency == 0 {
                // A failed checkpoint should not abort a long run
                if let Err(err) = save_checkpoint(best, config, done) {
                    warn!(error = %err, generation = done, "checkpoint skipped");
                }
            }
        })?;

        save_policy(&champion, &self.config.evolution, &self.config.save_path).with_context(
            || format!("Failed to save final policy to {:?}", self.config.save_path),
        )?;
        info!(path = ?self.config.save_path, fitness = champion.fitness, "policy saved");

        println!("\nTraining complete!");
        println!(
            "Best fitness {:.1} found in generation {}",
            champion.fitness,
            champion.generation + 1
        );
        println!("Policy saved to: {:?}", self.config.save_path);
        println!("\nFinal Statistics:");
        println!("{}", self.stats.format_summary());

        Ok(champion)
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn print_header(&self) {
        let evo = &self.config.evolution;
        println!("{}", "=".repeat(70));
        println!("Neuroevolution Training - Neuro Snake");
        println!("{}", "=".repeat(70));
        println!("Generations: {}", evo.generations);
        println!("Population: {}", evo.population_size);
        println!(
            "Game Config: {}x{} grid",
            evo.game.grid_width, evo.game.grid_height
        );
        println!("Evolution Config:");
        println!("  Network layers: {:?}", evo.layer_sizes());
        println!("  Sensor: {:?}", evo.sensor);
        println!("  Score: {:?}", evo.score);
        println!("  Runs per genome: {}", evo.runs_per_net);
        println!("  Max steps per run: {}", evo.max_steps);
        println!("  Mutation: rate {} scale {}", evo.mutation_rate, evo.mutation_scale);
        println!("  Crossover rate: {}", evo.crossover_rate);
        println!(
            "  Tournament size: {}, elites: {}",
            evo.selection.tournament_size, evo.selection.elite_count
        );
        println!("  Seed: {}", evo.seed);
        if let Some(threshold) = evo.fitness_threshold {
            println!("  Fitness threshold: {}", threshold);
        }
        if self.config.checkpoint_frequency > 0 {
            println!(
                "Checkpoints: Every {} generations",
                self.config.checkpoint_frequency
            );
        }
        println!("Save path: {:?}", self.config.save_path);
        println!("{}", "=".repeat(70));
        println!();
    }
}

fn checkpoint_path(save_path: &Path, generation: usize) -> PathBuf {
    save_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("checkpoint_gen{}.json", generation))
}

fn save_checkpoint(champion: &Champion, config: &TrainConfig, generation: usize) -> Result<()> {
    let path = checkpoint_path(&config.save_path, generation);
    save_policy(champion, &config.evolution, &path)
        .with_context(|| format!("Failed to save checkpoint to {:?}", path))?;
    println!("  Checkpoint saved: {:?}", path);
    Ok(())
}

fn print_progress(generation: &GenerationStats, total: usize, stats: &TrainingStats) {
    println!(
        "[Gen {}/{}] best {:.1} | mean {:.1} | std {:.1} | {}",
        generation.generation + 1,
        total,
        generation.best_fitness,
        generation.mean_fitness,
        generation.fitness_std,
        stats.format_summary()
    );
}
