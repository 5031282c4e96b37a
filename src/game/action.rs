use serde::{Deserialize, Serialize};

/// Direction of travel as a unit vector on the grid.
///
/// `y` grows downwards (row index), so `Up` is `(0, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    /// Returns the delta (dx, dy) for moving along this heading
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
        }
    }

    /// Heading after a -90 degree rotation of the travel vector
    pub fn turned_left(&self) -> Heading {
        match self {
            Heading::Right => Heading::Up,
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
        }
    }

    /// Heading after a +90 degree rotation of the travel vector
    pub fn turned_right(&self) -> Heading {
        match self {
            Heading::Right => Heading::Down,
            Heading::Down => Heading::Left,
            Heading::Left => Heading::Up,
            Heading::Up => Heading::Right,
        }
    }

    /// Heading after applying a relative action
    pub fn apply(&self, action: Action) -> Heading {
        match action {
            Action::Forward => *self,
            Action::TurnLeft => self.turned_left(),
            Action::TurnRight => self.turned_right(),
        }
    }
}

/// Action relative to the snake's current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Keep the current heading
    Forward,
    /// Rotate the heading by -90 degrees
    TurnLeft,
    /// Rotate the heading by +90 degrees
    TurnRight,
}

impl Action {
    /// All actions in index order
    pub const ALL: [Action; 3] = [Action::Forward, Action::TurnLeft, Action::TurnRight];

    /// Number of discrete actions (size of a policy's output layer)
    pub const COUNT: usize = 3;

    /// Convert a discrete action index to an action
    ///
    /// - 0 → Forward
    /// - 1 → TurnLeft
    /// - 2 → TurnRight
    /// - other → None
    pub fn from_index(idx: usize) -> Option<Action> {
        Self::ALL.get(idx).copied()
    }

    /// Discrete index of this action
    pub fn index(&self) -> usize {
        match self {
            Action::Forward => 0,
            Action::TurnLeft => 1,
            Action::TurnRight => 2,
        }
    }
}
