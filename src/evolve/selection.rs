//! Breeding plans.
//!
//! Every generation keeps its top genomes untouched and fills the remaining
//! slots with one child per pairing. A pairing names the tournament winner the
//! child is cloned from and, when crossover is drawn, a second winner whose
//! neurons may replace the clone's.

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Tournament and elitism settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Distinct genomes drawn into each tournament
    ///
    /// Default: 5
    pub tournament_size: usize,
    /// Top genomes carried over unchanged
    ///
    /// Default: 2
    pub elite_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tournament_size: 5,
            elite_count: 2,
        }
    }
}

/// Parents of a single child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    /// Genome the child starts as a copy of
    pub primary: usize,
    /// Crossover partner; `None` means the child is a plain mutated clone
    pub donor: Option<usize>,
}

/// Who survives and who breeds for the next generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedingPlan {
    /// Elite indices, best first
    pub survivors: Vec<usize>,
    /// One entry per child to breed
    pub pairings: Vec<Pairing>,
}

impl BreedingPlan {
    /// Plan a generation of `population_size` genomes from the current fitness
    pub fn new<R: Rng + ?Sized>(
        fitness: &[f64],
        config: &SelectionConfig,
        crossover_rate: f64,
        population_size: usize,
        rng: &mut R,
    ) -> Self {
        let survivors = top_indices(fitness, config.elite_count.min(population_size));
        let children = population_size - survivors.len();

        let mut pairings = Vec::with_capacity(children);
        for _ in 0..children {
            let Some(primary) = tournament(fitness, config.tournament_size, rng) else {
                break;
            };
            let donor = if rng.gen_bool(crossover_rate.clamp(0.0, 1.0)) {
                tournament(fitness, config.tournament_size, rng)
            } else {
                None
            };
            pairings.push(Pairing { primary, donor });
        }

        Self {
            survivors,
            pairings,
        }
    }
}

/// Indices of the `n` highest scores, best first; ties keep population order
fn top_indices(fitness: &[f64], n: usize) -> Vec<usize> {
    let n = n.min(fitness.len());
    if n == 0 {
        return Vec::new();
    }

    let rank = |a: &usize, b: &usize| fitness[*b].total_cmp(&fitness[*a]).then(a.cmp(b));
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.select_nth_unstable_by(n - 1, rank);
    order.truncate(n);
    order.sort_by(rank);
    order
}

/// Winner among `size` distinct genomes drawn uniformly
fn tournament<R: Rng + ?Sized>(fitness: &[f64], size: usize, rng: &mut R) -> Option<usize> {
    if fitness.is_empty() {
        return None;
    }

    index::sample(rng, fitness.len(), size.clamp(1, fitness.len()))
        .into_iter()
        .max_by(|&a, &b| fitness[a].total_cmp(&fitness[b]))
}
