//! Error types for the simulation core.
//!
//! Game-rule outcomes (hitting a wall, biting the snake's own body, starving)
//! are not errors; they are reported through [`crate::game::StepResult`].

use thiserror::Error;

/// Errors raised by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The engine was constructed with unusable parameters.
    #[error("invalid game configuration: {reason}")]
    InvalidConfig { reason: String },

    /// `step` or `observe` was called on a finished episode without a `reset`.
    #[error("episode is over; call reset() before stepping or observing again")]
    EpisodeOver,

    /// No free cell was left to place a pill on.
    #[error("no free cell for a pill after {attempts} attempts")]
    BoardFull { attempts: usize },

    /// A snapshot handed to the engine violates the game invariants.
    #[error("inconsistent game state: {reason}")]
    InvalidState { reason: String },
}

impl GameError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the simulation core.
pub type GameResult<T> = Result<T, GameError>;
