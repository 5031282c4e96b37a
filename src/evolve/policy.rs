//! Action selection, decoupled from the engine.
//!
//! A policy sees nothing but the observation vector and answers with one of
//! the three relative actions. Any `FnMut(&[f32]) -> Action` qualifies.

use serde::{Deserialize, Serialize};

use crate::error::GameResult;
use crate::game::{Action, GameConfig, GameEngine, RAY_FEATURES};

/// Something that picks the next move from an observation
pub trait Policy {
    fn choose_action(&mut self, observation: &[f32]) -> Action;
}

impl<F> Policy for F
where
    F: FnMut(&[f32]) -> Action,
{
    fn choose_action(&mut self, observation: &[f32]) -> Action {
        self(observation)
    }
}

/// Observation encoding read from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sensor {
    /// Food and obstacle layers of the vision window
    Window,
    /// Left, forward and right rays
    Rays,
}

impl Sensor {
    /// Read the current observation
    pub fn read(&self, engine: &GameEngine) -> GameResult<Vec<f32>> {
        match self {
            Sensor::Window => engine.observe(),
            Sensor::Rays => engine.glance(),
        }
    }

    /// Length of the vector produced by [`Sensor::read`]
    pub fn input_size(&self, config: &GameConfig) -> usize {
        match self {
            Sensor::Window => config.observation_len(),
            Sensor::Rays => RAY_FEATURES,
        }
    }
}

/// Index of the largest output; ties go to the lowest index
pub fn argmax(outputs: &[f32]) -> usize {
    let mut best = 0;
    for (idx, &value) in outputs.iter().enumerate() {
        if value > outputs[best] {
            best = idx;
        }
    }
    best
}

/// Map network outputs `[forward, left, right]` to an action
pub fn action_from_outputs(outputs: &[f32]) -> Action {
    Action::from_index(argmax(outputs)).unwrap_or(Action::Forward)
}
