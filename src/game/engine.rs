use super::{
    action::{Action, Heading},
    config::GameConfig,
    fitness::{composite_score, proximity_bonus},
    state::{GameState, Position, Snake, Termination},
    vision::{ray_glance, vision_window},
};
use crate::error::{GameError, GameResult};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::debug;

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the episode is still running after this step
    pub alive: bool,
    /// Whether the snake ate the pill this step
    pub ate_pill: bool,
    /// Shaped fitness added by this step
    pub fitness_delta: u64,
    /// Why the episode ended, if it did
    pub termination: Option<Termination>,
}

/// The game engine that owns the board, the snake, the pill and the episode counters
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    ///
    /// Uses `config.seed` when set, otherwise a seed drawn from the OS.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, seed)
    }

    /// Create an engine on a `width x height` board with default rules
    ///
    /// Non-positive dimensions are rejected with [`GameError::InvalidConfig`].
    pub fn with_dimensions(width: i32, height: i32) -> GameResult<Self> {
        let (Ok(w), Ok(h)) = (usize::try_from(width), usize::try_from(height)) else {
            return Err(GameError::invalid_config(format!(
                "board must be at least 1x1, got {width}x{height}"
            )));
        };
        Self::new(GameConfig::new(w, h))
    }

    /// Create an engine whose randomness is fully determined by `seed`
    pub fn with_seed(config: GameConfig, seed: u64) -> GameResult<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let state = initial_state(&config, &mut rng)?;

        Ok(Self { config, state, rng })
    }

    /// Resume from a snapshot of a running episode
    ///
    /// The snapshot must describe a live, consistent game on the configured board.
    pub fn from_state(config: GameConfig, state: GameState, seed: u64) -> GameResult<Self> {
        config.validate()?;
        check_snapshot(&config, &state)?;

        Ok(Self {
            config,
            state,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Reset the game to its post-construction state with a fresh pill
    pub fn reset(&mut self) -> GameResult<()> {
        self.state = initial_state(&self.config, &mut self.rng)?;
        Ok(())
    }

    /// Execute one step of the game
    ///
    /// Returns [`GameError::EpisodeOver`] without touching the state when the
    /// episode already ended. Returns [`GameError::BoardFull`] when the snake
    /// eats the last free cell; the episode is then over with
    /// [`Termination::BoardFull`] and no pill on the board.
    pub fn step(&mut self, action: Action) -> GameResult<StepResult> {
        if !self.state.is_alive {
            return Err(GameError::EpisodeOver);
        }

        let state = &mut self.state;

        // Turn relative to the current heading, then move
        let heading = state.snake.heading.apply(action);
        state.snake.heading = heading;
        let new_head = state.snake.head().moved_along(heading);

        // The tail cell still counts here even though it may be trimmed below
        let bit_self = state.snake.occupies(new_head);

        state.snake.advance_head(new_head);

        let ate_pill = state.is_pill(new_head);
        let fitness_delta = if ate_pill {
            state.snake.feed(self.config.hunger_per_pill);
            state.pills_eaten += 1;
            state.fitness += self.config.pill_reward;

            match spawn_pill(&self.config, state, &mut self.rng) {
                Ok(pill) => state.pill = Some(pill),
                Err(err) => {
                    // The eaten pill is gone and nothing replaces it
                    state.pill = None;
                    state.steps += 1;
                    state.is_alive = false;
                    state.termination = Some(Termination::BoardFull);
                    debug!(steps = state.steps, "board filled, no room for a new pill");
                    return Err(err);
                }
            }
            debug!(
                pills_eaten = state.pills_eaten,
                length = state.snake.len(),
                "pill eaten"
            );
            self.config.pill_reward
        } else {
            state.snake.trim_tail();
            let bonus = state.pill.map_or(0, |pill| {
                proximity_bonus(new_head, pill, self.config.proximity_ceiling)
            });
            state.fitness += bonus;
            bonus
        };

        state.steps += 1;

        let termination = if !state.is_in_bounds(new_head) {
            Some(Termination::Wall)
        } else if bit_self {
            Some(Termination::SelfCollision)
        } else if state.snake.hunger <= 0 {
            Some(Termination::Starvation)
        } else {
            None
        };

        if let Some(reason) = termination {
            state.is_alive = false;
            state.termination = Some(reason);
            debug!(
                ?reason,
                steps = state.steps,
                fitness = state.fitness,
                pills_eaten = state.pills_eaten,
                "episode over"
            );
        }

        Ok(StepResult {
            alive: state.is_alive,
            ate_pill,
            fitness_delta,
            termination,
        })
    }

    /// Vision window around the head, food layer then obstacle layer
    pub fn observe(&self) -> GameResult<Vec<f32>> {
        if !self.state.is_alive {
            return Err(GameError::EpisodeOver);
        }
        Ok(vision_window(&self.state, self.config.vision_side))
    }

    /// Ray sensor readings to the left, front and right of the head
    pub fn glance(&self) -> GameResult<Vec<f32>> {
        if !self.state.is_alive {
            return Err(GameError::EpisodeOver);
        }
        Ok(ray_glance(&self.state))
    }

    /// Cumulative shaped fitness of the current episode
    pub fn fitness(&self) -> u64 {
        self.state.fitness
    }

    /// Terminal ranking score of the current episode
    pub fn composite_score(&self) -> f64 {
        composite_score(self.state.steps, self.state.pills_eaten)
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive
    }

    /// Read-only view of the game state (for rendering)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

/// Single-cell snake in the middle of the board, heading right
fn initial_state(config: &GameConfig, rng: &mut StdRng) -> GameResult<GameState> {
    let center_x = (config.grid_width / 2) as i32;
    let center_y = (config.grid_height / 2) as i32;

    let snake = Snake::new(
        Position::new(center_x, center_y),
        Heading::Right,
        config.initial_hunger,
    );

    // The pill slot is filled right after the snake is in place
    let mut state = GameState::new(
        snake,
        Position::new(center_x, center_y),
        config.grid_width,
        config.grid_height,
    );
    state.pill = Some(spawn_pill(config, &state, rng)?);

    Ok(state)
}

/// Pick a uniformly random cell not covered by the snake
///
/// Rejection sampling first; once the attempt budget runs out the free cells
/// are enumerated, so the choice stays uniform and a full board fails closed.
fn spawn_pill<R: Rng>(config: &GameConfig, state: &GameState, rng: &mut R) -> GameResult<Position> {
    for _ in 0..config.max_spawn_attempts {
        let x = rng.gen_range(0..state.grid_width) as i32;
        let y = rng.gen_range(0..state.grid_height) as i32;
        let pos = Position::new(x, y);

        if !state.is_occupied_by_snake(pos) {
            return Ok(pos);
        }
    }

    state
        .free_cells()
        .choose(rng)
        .copied()
        .ok_or(GameError::BoardFull {
            attempts: config.max_spawn_attempts,
        })
}

fn check_snapshot(config: &GameConfig, state: &GameState) -> GameResult<()> {
    if state.grid_width != config.grid_width || state.grid_height != config.grid_height {
        return Err(GameError::invalid_state(format!(
            "snapshot board {}x{} does not match configured {}x{}",
            state.grid_width, state.grid_height, config.grid_width, config.grid_height
        )));
    }
    if !state.is_alive {
        return Err(GameError::invalid_state("snapshot episode is already over"));
    }
    if state.snake.is_empty() {
        return Err(GameError::invalid_state("snake has no body"));
    }
    if let Some(cell) = state.snake.body.iter().find(|&&cell| !state.is_in_bounds(cell)) {
        return Err(GameError::invalid_state(format!(
            "snake cell ({}, {}) is off the board",
            cell.x, cell.y
        )));
    }
    if !state.snake.has_unique_cells() {
        return Err(GameError::invalid_state("snake body overlaps itself"));
    }
    if state.snake.len() > state.snake.target_length {
        return Err(GameError::invalid_state("snake body exceeds its target length"));
    }
    match state.pill {
        Some(pill) if state.is_in_bounds(pill) && !state.is_occupied_by_snake(pill) => {}
        _ => return Err(GameError::invalid_state("pill must sit on a free board cell")),
    }
    Ok(())
}
