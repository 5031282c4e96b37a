//! Neuro Snake - a Snake game whose players are evolved neural networks
//!
//! This library provides:
//! - Core game logic with a pure, seedable engine (game module)
//! - Neuroevolution of feed-forward policies (evolve module)
//! - TUI rendering and keyboard input (render and input modules)
//! - Human play, training and visualization drivers (modes module)

pub mod error;
pub mod evolve;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;

pub use error::{GameError, GameResult};
