use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::action::Heading;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell along a heading
    pub fn moved_along(&self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        self.moved_by(dx, dy)
    }

    /// Euclidean distance to another cell
    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The head left the board
    Wall,
    /// The head moved onto the snake's own body
    SelfCollision,
    /// Hunger ran out
    Starvation,
    /// The snake covers every cell, so no pill can be placed
    BoardFull,
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    /// Body cells, tail at the front and head at the back
    pub body: VecDeque<Position>,
    /// Current direction of travel
    pub heading: Heading,
    /// Steps left before starving
    pub hunger: i32,
    /// Length the body settles at once the current move is resolved
    pub target_length: usize,
}

impl Snake {
    /// Create a single-cell snake
    pub fn new(head: Position, heading: Heading, hunger: i32) -> Self {
        Self {
            body: VecDeque::from([head]),
            heading,
            hunger,
            target_length: 1,
        }
    }

    /// Create a snake from explicit body cells, tail first
    pub fn from_cells(cells: &[Position], heading: Heading, hunger: i32) -> Self {
        Self {
            body: cells.iter().copied().collect(),
            heading,
            hunger,
            target_length: cells.len(),
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body.back().copied().unwrap_or(Position::new(0, 0))
    }

    /// Get the tail position (oldest segment)
    pub fn tail(&self) -> Position {
        self.body.front().copied().unwrap_or(Position::new(0, 0))
    }

    /// Check if a position is occupied by any body cell, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Push a new head cell and burn one unit of hunger
    pub fn advance_head(&mut self, new_head: Position) {
        self.body.push_back(new_head);
        self.hunger -= 1;
    }

    /// Drop the oldest body cell
    pub fn trim_tail(&mut self) {
        self.body.pop_front();
    }

    /// Grow the target length and refill hunger after eating
    pub fn feed(&mut self, hunger_per_pill: i32) {
        self.target_length += 1;
        self.hunger += hunger_per_pill;
    }

    /// True when no cell appears twice in the body
    pub fn has_unique_cells(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.body.len());
        self.body.iter().all(|pos| seen.insert(*pos))
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub snake: Snake,
    /// `None` only once the snake has filled the board
    pub pill: Option<Position>,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Steps taken this episode
    pub steps: u32,
    /// Cumulative shaped fitness
    pub fitness: u64,
    pub pills_eaten: u32,
    pub is_alive: bool,
    /// Set once the episode ends
    pub termination: Option<Termination>,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, pill: Position, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snake,
            pill: Some(pill),
            grid_width,
            grid_height,
            steps: 0,
            fitness: 0,
            pills_eaten: 0,
            is_alive: true,
            termination: None,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && (pos.x as usize) < self.grid_width
            && pos.y >= 0
            && (pos.y as usize) < self.grid_height
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    /// Check if the pill sits on a position
    pub fn is_pill(&self, pos: Position) -> bool {
        self.pill == Some(pos)
    }

    /// Off-board or snake-occupied
    pub fn is_obstacle(&self, pos: Position) -> bool {
        !self.is_in_bounds(pos) || self.is_occupied_by_snake(pos)
    }

    /// Cells of the board that are not covered by the snake
    pub fn free_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in 0..self.grid_height as i32 {
            for x in 0..self.grid_width as i32 {
                let pos = Position::new(x, y);
                if !self.is_occupied_by_snake(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_along(Heading::Down), Position::new(5, 6));
        assert_eq!(pos.moved_along(Heading::Up), Position::new(5, 4));
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.distance_to(Position::new(3, 4)), 5.0);
        assert_eq!(a.distance_to(a), 0.0);
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(5, 5), Heading::Right, 100);
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.tail(), Position::new(5, 5));
        assert_eq!(snake.target_length, 1);
        assert_eq!(snake.hunger, 100);
    }

    #[test]
    fn test_head_is_last_cell() {
        let cells = [Position::new(3, 5), Position::new(4, 5), Position::new(5, 5)];
        let snake = Snake::from_cells(&cells, Heading::Right, 50);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.tail(), Position::new(3, 5));
        assert_eq!(snake.target_length, 3);
    }

    #[test]
    fn test_advance_and_trim() {
        let mut snake = Snake::new(Position::new(5, 5), Heading::Right, 10);

        snake.advance_head(Position::new(6, 5));
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.hunger, 9);

        snake.trim_tail();
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(6, 5));
    }

    #[test]
    fn test_feed() {
        let mut snake = Snake::new(Position::new(5, 5), Heading::Right, 10);
        snake.feed(100);
        assert_eq!(snake.target_length, 2);
        assert_eq!(snake.hunger, 110);
    }

    #[test]
    fn test_unique_cells() {
        let mut snake = Snake::from_cells(
            &[Position::new(1, 1), Position::new(2, 1)],
            Heading::Right,
            10,
        );
        assert!(snake.has_unique_cells());
        snake.advance_head(Position::new(1, 1));
        assert!(!snake.has_unique_cells());
    }

    #[test]
    fn test_bounds_checking() {
        let state = GameState::new(
            Snake::new(Position::new(5, 5), Heading::Right, 100),
            Position::new(10, 10),
            20,
            20,
        );

        assert!(state.is_in_bounds(Position::new(0, 0)));
        assert!(state.is_in_bounds(Position::new(19, 19)));
        assert!(!state.is_in_bounds(Position::new(-1, 0)));
        assert!(!state.is_in_bounds(Position::new(20, 0)));
        assert!(!state.is_in_bounds(Position::new(0, 20)));
    }

    #[test]
    fn test_free_cells_exclude_snake() {
        let state = GameState::new(
            Snake::from_cells(&[Position::new(0, 0), Position::new(1, 0)], Heading::Right, 10),
            Position::new(1, 1),
            2,
            2,
        );
        let free = state.free_cells();
        assert_eq!(free, vec![Position::new(0, 1), Position::new(1, 1)]);
        assert!(state.is_obstacle(Position::new(0, 0)));
        assert!(state.is_obstacle(Position::new(2, 0)));
        assert!(!state.is_obstacle(Position::new(1, 1)));
        assert!(state.is_pill(Position::new(1, 1)));
        assert!(!state.is_pill(Position::new(0, 1)));
    }
}
