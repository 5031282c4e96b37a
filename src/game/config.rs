use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Steps the snake may take before starving, at spawn
    pub initial_hunger: i32,
    /// Hunger budget added for every pill eaten
    pub hunger_per_pill: i32,

    // Rewards
    /// Fitness awarded for eating a pill
    pub pill_reward: u64,
    /// Ceiling of the per-step proximity bonus, `max(0, ceiling - round(distance))`
    pub proximity_ceiling: u64,

    /// Side length of the square vision window (odd)
    pub vision_side: usize,
    /// Rejection-sampling attempts before pill placement scans for free cells
    pub max_spawn_attempts: usize,
    /// Seed for the engine's random source; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_hunger: 100,
            hunger_per_pill: 100,
            pill_reward: 1000,
            proximity_ceiling: 10,
            vision_side: 5,
            max_spawn_attempts: 1000,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(30, 30)
    }

    /// Same configuration with a fixed random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of values produced by the vision window observation
    pub fn observation_len(&self) -> usize {
        2 * self.vision_side * self.vision_side
    }

    /// Check that the configuration describes a playable board
    pub fn validate(&self) -> GameResult<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(GameError::invalid_config(format!(
                "board must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if i32::try_from(self.grid_width).is_err() || i32::try_from(self.grid_height).is_err() {
            return Err(GameError::invalid_config("board dimensions overflow i32"));
        }
        if self.initial_hunger <= 0 {
            return Err(GameError::invalid_config("initial_hunger must be positive"));
        }
        if self.hunger_per_pill <= 0 {
            return Err(GameError::invalid_config(format!(
                "hunger_per_pill must be positive, got {}",
                self.hunger_per_pill
            )));
        }
        if self.vision_side == 0 || self.vision_side % 2 == 0 {
            return Err(GameError::invalid_config(format!(
                "vision_side must be odd and positive, got {}",
                self.vision_side
            )));
        }
        if self.max_spawn_attempts == 0 {
            return Err(GameError::invalid_config(
                "max_spawn_attempts must be positive",
            ));
        }
        Ok(())
    }
}
