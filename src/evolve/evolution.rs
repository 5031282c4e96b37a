//! Generational evolution loop.
//!
//! Each generation is evaluated in parallel (one rayon task per genome, each
//! owning its own engines), summarized, and replaced according to a
//! [`BreedingPlan`].

use anyhow::{Context, Result, anyhow};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::EvolutionConfig;
use super::fitness::evaluate_genome;
use super::network::FeedForwardNetwork;
use super::policy::action_from_outputs;
use super::selection::BreedingPlan;
use crate::error::GameResult;

/// Statistics for a single generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub worst_fitness: f64,
    pub fitness_std: f64,
}

impl GenerationStats {
    /// Summarize the scores of one generation
    pub fn from_fitness(generation: usize, fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                generation,
                best_fitness: 0.0,
                mean_fitness: 0.0,
                worst_fitness: 0.0,
                fitness_std: 0.0,
            };
        }

        let n = fitness.len() as f64;
        let mean = fitness.iter().sum::<f64>() / n;
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

        Self {
            generation,
            best_fitness: fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_fitness: mean,
            worst_fitness: fitness.iter().copied().fold(f64::INFINITY, f64::min),
            fitness_std: variance.sqrt(),
        }
    }
}

/// Best genome seen so far
#[derive(Debug, Clone, PartialEq)]
pub struct Champion {
    pub network: FeedForwardNetwork,
    pub fitness: f64,
    pub generation: usize,
}

/// Population state of a running evolution
pub struct Evolution {
    config: EvolutionConfig,
    rng: StdRng,
    population: Vec<FeedForwardNetwork>,
    generation: usize,
    champion: Option<Champion>,
    history: Vec<GenerationStats>,
}

impl Evolution {
    /// Create a random initial population
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|reason| anyhow!(reason))
            .context("Invalid evolution configuration")?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let layer_sizes = config.layer_sizes();
        let population = (0..config.population_size)
            .map(|_| FeedForwardNetwork::random(&layer_sizes, &mut rng))
            .collect();

        Ok(Self {
            config,
            rng,
            population,
            generation: 0,
            champion: None,
            history: Vec::new(),
        })
    }

    /// Fitness of every genome in the current population
    pub fn evaluate(&self) -> GameResult<Vec<f64>> {
        let config = &self.config;
        let generation = self.generation;

        self.population
            .par_iter()
            .map(|network| {
                let mut policy = |obs: &[f32]| action_from_outputs(&network.forward(obs));
                evaluate_genome(&mut policy, config, generation)
            })
            .collect()
    }

    /// Evaluate the current population and breed the next one
    pub fn step_generation(&mut self) -> GameResult<GenerationStats> {
        let fitness = self.evaluate()?;
        let stats = GenerationStats::from_fitness(self.generation, &fitness);

        if let Some((idx, &best)) = fitness
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        {
            let improved = self.champion.as_ref().is_none_or(|c| best > c.fitness);
            if improved {
                debug!(generation = self.generation, fitness = best, "new champion");
                self.champion = Some(Champion {
                    network: self.population[idx].clone(),
                    fitness: best,
                    generation: self.generation,
                });
            }
        }

        self.breed(&fitness);
        self.history.push(stats);
        self.generation += 1;

        Ok(stats)
    }

    /// Run all configured generations, stopping early at the fitness threshold
    ///
    /// `on_generation` is called after every generation with its statistics
    /// and the best genome so far, e.g. for progress output or checkpoints.
    pub fn run<F>(&mut self, mut on_generation: F) -> Result<Champion>
    where
        F: FnMut(&GenerationStats, &Champion),
    {
        while self.generation < self.config.generations {
            let stats = self
                .step_generation()
                .with_context(|| format!("Failed to evaluate generation {}", self.generation))?;

            info!(
                generation = stats.generation,
                best = stats.best_fitness,
                mean = stats.mean_fitness,
                std = stats.fitness_std,
                "generation evaluated"
            );
            if let Some(champion) = &self.champion {
                on_generation(&stats, champion);
            }

            if let Some(threshold) = self.config.fitness_threshold {
                if stats.best_fitness >= threshold {
                    info!(threshold, generation = stats.generation, "fitness threshold reached");
                    break;
                }
            }
        }

        self.champion
            .clone()
            .ok_or_else(|| anyhow!("evolution finished without evaluating any genome"))
    }

    /// Replace the population with elites plus one mutated child per pairing
    fn breed(&mut self, fitness: &[f64]) {
        let plan = BreedingPlan::new(
            fitness,
            &self.config.selection,
            self.config.crossover_rate,
            self.config.population_size,
            &mut self.rng,
        );

        let mut next: Vec<FeedForwardNetwork> = plan
            .survivors
            .iter()
            .map(|&idx| self.population[idx].clone())
            .collect();

        for pairing in plan.pairings {
            let primary = &self.population[pairing.primary];
            let mut child = match pairing.donor {
                Some(donor) => primary
                    .crossover(&self.population[donor], &mut self.rng)
                    .unwrap_or_else(|| primary.clone()),
                None => primary.clone(),
            };
            child.mutate(
                &mut self.rng,
                self.config.mutation_rate,
                self.config.mutation_scale,
            );
            next.push(child);
        }

        self.population = next;
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[FeedForwardNetwork] {
        &self.population
    }

    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;

    fn tiny_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 12,
            generations: 3,
            runs_per_net: 2,
            max_steps: 200,
            hidden_layers: vec![6],
            game: GameConfig::small(),
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_population() {
        let evolution = Evolution::new(tiny_config()).unwrap();
        assert_eq!(evolution.population().len(), 12);
        assert_eq!(evolution.generation(), 0);
        assert!(evolution.champion().is_none());
        for net in evolution.population() {
            assert_eq!(net.layer_sizes(), vec![50, 6, 3]);
        }
    }

    #[test]
    fn test_generation_stats_summary() {
        let stats = GenerationStats::from_fitness(4, &[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(stats.generation, 4);
        assert!((stats.mean_fitness - 3.0).abs() < 1e-9);
        assert!((stats.best_fitness - 5.0).abs() < 1e-9);
        assert!((stats.worst_fitness - 1.0).abs() < 1e-9);
        assert!((stats.fitness_std - 2f64.sqrt()).abs() < 1e-9);

        assert_eq!(GenerationStats::from_fitness(0, &[]).best_fitness, 0.0);
    }

    #[test]
    fn test_elites_survive_breeding() {
        let mut evolution = Evolution::new(tiny_config()).unwrap();
        let before = evolution.population().to_vec();
        let fitness: Vec<f64> = (0..before.len()).map(|i| i as f64).collect();

        evolution.breed(&fitness);

        let next = evolution.population();
        assert_eq!(next.len(), before.len());
        assert_eq!(next[0], before[11]);
        assert_eq!(next[1], before[10]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EvolutionConfig {
            population_size: 0,
            ..tiny_config()
        };
        assert!(Evolution::new(config).is_err());
    }

    #[test]
    fn test_generation_keeps_population_size() {
        let mut evolution = Evolution::new(tiny_config()).unwrap();
        let stats = evolution.step_generation().unwrap();

        assert_eq!(stats.generation, 0);
        assert!(stats.best_fitness >= stats.mean_fitness);
        assert!(stats.mean_fitness >= stats.worst_fitness);
        assert_eq!(evolution.population().len(), 12);
        assert_eq!(evolution.generation(), 1);
        assert_eq!(evolution.history().len(), 1);
        assert_eq!(evolution.champion().unwrap().fitness, stats.best_fitness);
    }

    #[test]
    fn test_run_reports_every_generation() {
        let mut evolution = Evolution::new(tiny_config()).unwrap();
        let mut seen = Vec::new();

        let champion = evolution.run(|stats, _| seen.push(stats.generation)).unwrap();

        assert_eq!(seen, vec![0, 1, 2]);
        let best = evolution
            .history()
            .iter()
            .map(|s| s.best_fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(champion.fitness, best);
    }

    #[test]
    fn test_threshold_stops_early() {
        let config = EvolutionConfig {
            fitness_threshold: Some(f64::NEG_INFINITY),
            ..tiny_config()
        };
        let mut evolution = Evolution::new(config).unwrap();

        evolution.run(|_, _| {}).unwrap();

        assert_eq!(evolution.generation(), 1);
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = Evolution::new(tiny_config()).unwrap();
        let mut b = Evolution::new(tiny_config()).unwrap();

        a.run(|_, _| {}).unwrap();
        b.run(|_, _| {}).unwrap();

        assert_eq!(a.history(), b.history());
        assert_eq!(a.population(), b.population());
    }
}
