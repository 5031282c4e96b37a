//! Neuroevolution hyperparameter configuration

use serde::{Deserialize, Serialize};

use super::policy::Sensor;
use super::selection::SelectionConfig;
use crate::game::{Action, GameConfig};

/// Which episode figure a genome is ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreKind {
    /// Shaped fitness accumulated up to the last step the snake survived
    Shaped,
    /// Terminal composite score built from steps and pills eaten
    Composite,
}

/// Configuration for the evolutionary training run
///
/// # Example
///
/// ```rust
/// use neuro_snake::evolve::EvolutionConfig;
///
/// let config = EvolutionConfig {
///     population_size: 50,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Number of genomes per generation
    ///
    /// Default: 150
    pub population_size: usize,

    /// Number of generations to run
    ///
    /// Default: 100
    pub generations: usize,

    /// Episodes played per genome; the worst one is the genome's fitness
    ///
    /// Default: 5
    pub runs_per_net: usize,

    /// Step ceiling per episode, on top of the snake's own hunger
    ///
    /// Default: 5000
    pub max_steps: u32,

    /// Hidden layer widths of the policy network
    ///
    /// Default: [16]
    pub hidden_layers: Vec<usize>,

    /// Observation encoding fed to the network
    ///
    /// Default: vision window
    pub sensor: Sensor,

    /// Episode figure used for ranking
    ///
    /// Default: shaped fitness
    pub score: ScoreKind,

    /// Probability that any single parameter is perturbed
    ///
    /// Default: 0.1
    pub mutation_rate: f32,

    /// Standard deviation of the Gaussian perturbation
    ///
    /// Default: 0.5
    pub mutation_scale: f32,

    /// Probability that a child is bred by crossover rather than cloned
    ///
    /// Default: 0.7
    pub crossover_rate: f64,

    /// Tournament and elitism settings
    pub selection: SelectionConfig,

    /// Stop early once the best fitness reaches this value
    pub fitness_threshold: Option<f64>,

    /// Master seed; every episode and every breeding decision derives from it
    ///
    /// Default: 42
    pub seed: u64,

    /// Board and reward rules used for evaluation
    pub game: GameConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 150,
            generations: 100,
            runs_per_net: 5,
            max_steps: 5000,
            hidden_layers: vec![16],
            sensor: Sensor::Window,
            score: ScoreKind::Shaped,
            mutation_rate: 0.1,
            mutation_scale: 0.5,
            crossover_rate: 0.7,
            selection: SelectionConfig::default(),
            fitness_threshold: None,
            seed: 42,
            game: GameConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Layer widths of the policy network, input to output
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.sensor.input_size(&self.game));
        sizes.extend(self.hidden_layers.iter().copied());
        sizes.push(Action::COUNT);
        sizes
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            ));
        }

        if self.generations == 0 {
            return Err("generations must be at least 1".to_string());
        }

        if self.runs_per_net == 0 {
            return Err("runs_per_net must be at least 1".to_string());
        }

        if self.max_steps == 0 {
            return Err("max_steps must be at least 1".to_string());
        }

        if self.hidden_layers.contains(&0) {
            return Err("hidden layers must have at least one unit".to_string());
        }

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(format!(
                "mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            ));
        }

        if self.mutation_scale <= 0.0 {
            return Err(format!(
                "mutation_scale must be positive, got {}",
                self.mutation_scale
            ));
        }

        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(format!(
                "crossover_rate must be in [0, 1], got {}",
                self.crossover_rate
            ));
        }

        if self.selection.tournament_size == 0 {
            return Err("tournament_size must be at least 1".to_string());
        }

        if self.selection.elite_count >= self.population_size {
            return Err(format!(
                "elite_count ({}) must be smaller than population_size ({})",
                self.selection.elite_count, self.population_size
            ));
        }

        self.game.validate().map_err(|err| err.to_string())
    }
}
