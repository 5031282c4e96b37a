//! Genome evaluation.
//!
//! A genome plays `runs_per_net` independent episodes and is scored by its
//! worst one, so a policy only ranks high when it is consistently good.

use super::config::{EvolutionConfig, ScoreKind};
use super::policy::{Policy, Sensor};
use crate::error::{GameError, GameResult};
use crate::game::{GameConfig, GameEngine, Termination};

/// Outcome of one driven episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome {
    /// Steps taken, the fatal one included
    pub steps: u32,
    pub pills_eaten: u32,
    /// Shaped fitness after the last step the snake survived
    pub shaped_fitness: u64,
    /// Composite score of the finished episode
    pub composite_score: f64,
    /// `None` when the episode hit the step ceiling
    pub termination: Option<Termination>,
}

impl EpisodeOutcome {
    pub fn score(&self, kind: ScoreKind) -> f64 {
        match kind {
            ScoreKind::Shaped => self.shaped_fitness as f64,
            ScoreKind::Composite => self.composite_score,
        }
    }
}

/// Drive one episode from the engine's current state until it ends
///
/// The caller owns the step ceiling; the engine only knows about hunger.
pub fn run_episode<P: Policy + ?Sized>(
    engine: &mut GameEngine,
    policy: &mut P,
    sensor: Sensor,
    max_steps: u32,
) -> GameResult<EpisodeOutcome> {
    let mut shaped_fitness = 0;

    while engine.is_alive() && engine.state().steps < max_steps {
        let observation = sensor.read(engine)?;
        let action = policy.choose_action(&observation);

        match engine.step(action) {
            Ok(result) if result.alive => shaped_fitness = engine.fitness(),
            Ok(_) => break,
            // The snake covers the whole board; nothing left to play for
            Err(GameError::BoardFull { .. }) => {
                shaped_fitness = engine.fitness();
                break;
            }
            Err(err) => return Err(err),
        }
    }

    let state = engine.state();
    Ok(EpisodeOutcome {
        steps: state.steps,
        pills_eaten: state.pills_eaten,
        shaped_fitness,
        composite_score: engine.composite_score(),
        termination: state.termination,
    })
}

/// Play `config.runs_per_net` episodes and return the worst score
///
/// Episode `run` is played with `episode_seed(config.seed, generation, run)`,
/// so every genome of a generation faces the same starting boards.
pub fn evaluate_genome<P: Policy + ?Sized>(
    policy: &mut P,
    config: &EvolutionConfig,
    generation: usize,
) -> GameResult<f64> {
    let mut worst = f64::INFINITY;

    for run in 0..config.runs_per_net {
        let seed = episode_seed(config.seed, generation, run);
        let mut engine = GameEngine::with_seed(game_config(config), seed)?;
        let outcome = run_episode(&mut engine, policy, config.sensor, config.max_steps)?;
        worst = worst.min(outcome.score(config.score));
    }

    Ok(if worst.is_finite() { worst } else { 0.0 })
}

fn game_config(config: &EvolutionConfig) -> GameConfig {
    GameConfig {
        seed: None,
        ..config.game.clone()
    }
}

/// Seed for one evaluation episode
pub fn episode_seed(base: u64, generation: usize, run: usize) -> u64 {
    // SplitMix64 finalizer over the packed coordinates
    let mut z = base
        ^ (generation as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (run as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Action, GameState, Heading, Position, Snake};

    #[test]
    fn test_forward_policy_hits_the_wall() {
        // Start at (5, 5) on a 10x10 board heading right: wall after 5 steps
        let mut engine = GameEngine::with_seed(GameConfig::small(), 4).unwrap();
        let mut policy = |_: &[f32]| Action::Forward;

        let outcome = run_episode(&mut engine, &mut policy, Sensor::Window, 1000).unwrap();

        assert_eq!(outcome.steps, 5);
        assert!(!engine.is_alive());
        assert_eq!(outcome.termination, Some(Termination::Wall));
    }

    #[test]
    fn test_shaped_fitness_excludes_fatal_step() {
        // Two safe steps, then into the wall beside the pill
        let state = GameState::new(
            Snake::new(Position::new(7, 5), Heading::Right, 100),
            Position::new(9, 4),
            10,
            10,
        );
        let mut engine = GameEngine::from_state(GameConfig::small(), state, 8).unwrap();
        let mut policy = |_: &[f32]| Action::Forward;

        let outcome = run_episode(&mut engine, &mut policy, Sensor::Window, 1000).unwrap();

        // (8, 5) and (9, 5) each earn 10 - 1; the fatal (10, 5) earns 10 - round(sqrt 2) = 9
        let fatal_delta = engine.fitness() - outcome.shaped_fitness;
        assert_eq!(outcome.termination, Some(Termination::Wall));
        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.shaped_fitness, 18);
        assert_eq!(engine.fitness(), 27);
        assert_eq!(fatal_delta, 9);
    }

    #[test]
    fn test_full_board_keeps_the_final_meal() {
        // 2x1 board: eating the only free pill fills the board
        let state = GameState::new(
            Snake::new(Position::new(0, 0), Heading::Right, 100),
            Position::new(1, 0),
            2,
            1,
        );
        let mut engine = GameEngine::from_state(GameConfig::new(2, 1), state, 3).unwrap();
        let mut policy = |_: &[f32]| Action::Forward;

        let outcome = run_episode(&mut engine, &mut policy, Sensor::Rays, 1000).unwrap();

        assert_eq!(outcome.termination, Some(Termination::BoardFull));
        assert_eq!(outcome.pills_eaten, 1);
        assert_eq!(outcome.shaped_fitness, 1000);
    }

    #[test]
    fn test_step_ceiling() {
        // Turning left every step circles a 2x2 loop and never reaches a wall
        let mut engine = GameEngine::with_seed(GameConfig::small(), 2).unwrap();
        let mut policy = |_: &[f32]| Action::TurnLeft;

        let outcome = run_episode(&mut engine, &mut policy, Sensor::Rays, 10).unwrap();

        assert_eq!(outcome.steps, 10);
        assert!(engine.is_alive());
        assert_eq!(outcome.termination, None);
        assert_eq!(outcome.shaped_fitness, engine.fitness());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let config = EvolutionConfig {
            game: GameConfig::small(),
            runs_per_net: 3,
            ..Default::default()
        };
        let mut policy = |obs: &[f32]| {
            if obs[12 + 1] > 0.0 {
                Action::TurnLeft
            } else {
                Action::Forward
            }
        };

        let a = evaluate_genome(&mut policy, &config, 4).unwrap();
        let b = evaluate_genome(&mut policy, &config, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_worst_run_counts() {
        let config = EvolutionConfig {
            game: GameConfig::small(),
            runs_per_net: 4,
            score: ScoreKind::Composite,
            ..Default::default()
        };
        let mut policy = |_: &[f32]| Action::Forward;

        let fitness = evaluate_genome(&mut policy, &config, 0).unwrap();

        let mut best_single = f64::NEG_INFINITY;
        for run in 0..config.runs_per_net {
            let mut engine =
                GameEngine::with_seed(GameConfig::small(), episode_seed(config.seed, 0, run)).unwrap();
            let outcome = run_episode(&mut engine, &mut policy, config.sensor, config.max_steps).unwrap();
            assert!(fitness <= outcome.composite_score);
            best_single = best_single.max(outcome.composite_score);
        }
        assert!(fitness <= best_single);
    }

    #[test]
    fn test_episode_seeds_differ() {
        assert_ne!(episode_seed(42, 0, 0), episode_seed(42, 0, 1));
        assert_ne!(episode_seed(42, 0, 0), episode_seed(42, 1, 0));
        assert_eq!(episode_seed(42, 3, 2), episode_seed(42, 3, 2));
    }
}
