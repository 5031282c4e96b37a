//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Drivers talk to it only through [`GameEngine`]: construct, `step`, `observe`,
//! read the fitness figures, and `reset` once an episode is over.

pub mod action;
pub mod config;
pub mod engine;
pub mod fitness;
pub mod state;
pub mod vision;

// Re-export commonly used types
pub use action::{Action, Heading};
pub use config::GameConfig;
pub use engine::{GameEngine, StepResult};
pub use fitness::{composite_score, proximity_bonus};
pub use state::{GameState, Position, Snake, Termination};
pub use vision::{RAY_FEATURES, ray_glance, vision_window};
