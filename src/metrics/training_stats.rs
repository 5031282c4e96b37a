//! Evolution progress tracking
//!
//! Keeps rolling windows over per-generation fitness so the training driver
//! can report a smoothed trend next to the raw figures.

use std::collections::VecDeque;

/// Rolling statistics over recent generations
///
/// # Example
///
/// ```rust
/// use neuro_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(10);
/// stats.record_generation(2500.0, 800.0);
///
/// assert_eq!(stats.generations(), 1);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Best fitness per generation (rolling window)
    best_fitness: VecDeque<f64>,

    /// Mean fitness per generation (rolling window)
    mean_fitness: VecDeque<f64>,

    /// Best fitness ever recorded
    best_ever: f64,

    /// Generations since the best fitness last improved
    stagnant_for: usize,

    generations: usize,

    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` generations
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            best_fitness: VecDeque::with_capacity(window_size),
            mean_fitness: VecDeque::with_capacity(window_size),
            best_ever: f64::NEG_INFINITY,
            stagnant_for: 0,
            generations: 0,
            window_size,
        }
    }

    /// Record one evaluated generation
    pub fn record_generation(&mut self, best: f64, mean: f64) {
        Self::push_deque(&mut self.best_fitness, best, self.window_size);
        Self::push_deque(&mut self.mean_fitness, mean, self.window_size);
        self.generations += 1;

        if best > self.best_ever {
            self.best_ever = best;
            self.stagnant_for = 0;
        } else {
            self.stagnant_for += 1;
        }
    }

    /// Mean of the per-generation best fitness over the window
    pub fn rolling_best(&self) -> f64 {
        Self::mean(&self.best_fitness)
    }

    /// Mean of the per-generation mean fitness over the window
    pub fn rolling_mean(&self) -> f64 {
        Self::mean(&self.mean_fitness)
    }

    /// Best fitness ever recorded, 0.0 before the first generation
    pub fn best_ever(&self) -> f64 {
        if self.generations == 0 { 0.0 } else { self.best_ever }
    }

    pub fn stagnant_for(&self) -> usize {
        self.stagnant_for
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Gens: {} | Best ever: {:.1} | Best(avg): {:.1} | Mean(avg): {:.1} | Stagnant: {}",
            self.generations,
            self.best_ever(),
            self.rolling_best(),
            self.rolling_mean(),
            self.stagnant_for,
        )
    }

    fn mean(deque: &VecDeque<f64>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f64>() / deque.len() as f64
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
