//! Agent-facing encodings of the game state.
//!
//! The primary encoding is a square window anchored `side / 2` cells up and
//! left of the head, stacked as two layers:
//!
//! - food: 1.0 on the pill cell
//! - obstacle: 1.0 on cells that are off the board or covered by the snake
//!
//! Each layer is flattened row-major, food first. A secondary ray sensor
//! looks left, forward and right of the head until it leaves the board.

use super::state::{GameState, Position};

/// Number of values produced by [`ray_glance`]
pub const RAY_FEATURES: usize = 9;

/// Encode the vision window around the snake's head
///
/// Returns `2 * side * side` values, every one 0.0 or 1.0.
pub fn vision_window(state: &GameState, side: usize) -> Vec<f32> {
    let cells = side * side;
    let mut data = vec![0.0; 2 * cells];

    let head = state.snake.head();
    let anchor = (side / 2) as i32;

    for row in 0..side {
        for col in 0..side {
            let cell = Position::new(head.x - anchor + col as i32, head.y - anchor + row as i32);
            let idx = row * side + col;

            if state.is_pill(cell) {
                data[idx] = 1.0;
            }
            if state.is_obstacle(cell) {
                data[cells + idx] = 1.0;
            }
        }
    }

    data
}

/// Cast rays to the left, forward and right of the head
///
/// For each ray, in that order: `[pill_seen, body_seen, wall_distance]`, where
/// `wall_distance` is the Euclidean distance from the head to the first
/// off-board cell on the ray.
pub fn ray_glance(state: &GameState) -> Vec<f32> {
    let heading = state.snake.heading;
    let mut features = Vec::with_capacity(RAY_FEATURES);

    for direction in [heading.turned_left(), heading, heading.turned_right()] {
        let head = state.snake.head();
        let mut cell = head;
        let mut pill_seen = 0.0;
        let mut body_seen = 0.0;

        loop {
            cell = cell.moved_along(direction);
            if !state.is_in_bounds(cell) {
                break;
            }
            if state.is_pill(cell) {
                pill_seen = 1.0;
            }
            if state.is_occupied_by_snake(cell) {
                body_seen = 1.0;
            }
        }

        features.push(pill_seen);
        features.push(body_seen);
        features.push(head.distance_to(cell) as f32);
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Heading, Snake};

    fn state_with(cells: &[Position], heading: Heading, pill: Position) -> GameState {
        GameState::new(Snake::from_cells(cells, heading, 100), pill, 10, 10)
    }

    #[test]
    fn test_window_shape_and_values() {
        let state = state_with(&[Position::new(5, 5)], Heading::Right, Position::new(9, 9));
        let obs = vision_window(&state, 5);

        assert_eq!(obs.len(), 50);
        assert!(obs.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_food_layer_marks_pill() {
        // Pill one cell right of the head: row 2, col 3
        let state = state_with(&[Position::new(5, 5)], Heading::Right, Position::new(6, 5));
        let obs = vision_window(&state, 5);

        assert_eq!(obs[2 * 5 + 3], 1.0);
        let food_sum: f32 = obs[..25].iter().sum();
        assert_eq!(food_sum, 1.0);
    }

    #[test]
    fn test_pill_outside_window_is_invisible() {
        let state = state_with(&[Position::new(5, 5)], Heading::Right, Position::new(8, 5));
        let obs = vision_window(&state, 5);
        assert!(obs[..25].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_obstacle_layer_marks_body_and_head() {
        let cells = [Position::new(4, 5), Position::new(5, 5)];
        let state = state_with(&cells, Heading::Right, Position::new(0, 0));
        let obs = vision_window(&state, 5);
        let obstacles = &obs[25..];

        // Head sits at (2, 2) of the window, the tail just left of it
        assert_eq!(obstacles[2 * 5 + 2], 1.0);
        assert_eq!(obstacles[2 * 5 + 1], 1.0);
        let sum: f32 = obstacles.iter().sum();
        assert_eq!(sum, 2.0);
    }

    #[test]
    fn test_obstacle_layer_marks_off_board() {
        // Head in the top-left corner: the first two rows and columns are off-board
        let state = state_with(&[Position::new(0, 0)], Heading::Right, Position::new(9, 9));
        let obs = vision_window(&state, 5);
        let obstacles = &obs[25..];

        for row in 0..5 {
            for col in 0..5 {
                let off_board = row < 2 || col < 2;
                let is_head = row == 2 && col == 2;
                let expected = if off_board || is_head { 1.0 } else { 0.0 };
                assert_eq!(obstacles[row * 5 + col], expected, "row {row} col {col}");
            }
        }
    }

    #[test]
    fn test_wider_window() {
        let state = state_with(&[Position::new(5, 5)], Heading::Right, Position::new(2, 2));
        let obs = vision_window(&state, 7);

        assert_eq!(obs.len(), 98);
        // Anchor is head - 3, so the pill at (2, 2) is the top-left cell
        assert_eq!(obs[0], 1.0);
    }

    #[test]
    fn test_ray_glance() {
        // Heading right from (2, 5) on a 10x10 board, pill ahead, body above
        let cells = [Position::new(2, 2), Position::new(2, 3), Position::new(2, 4), Position::new(2, 5)];
        let state = state_with(&cells, Heading::Right, Position::new(7, 5));
        let rays = ray_glance(&state);

        assert_eq!(rays.len(), RAY_FEATURES);

        // Left of Right is Up: body cells (2,4)..(2,2), wall at y = -1
        assert_eq!(rays[0], 0.0);
        assert_eq!(rays[1], 1.0);
        assert_eq!(rays[2], 6.0);

        // Forward: pill at (7,5), wall at x = 10
        assert_eq!(rays[3], 1.0);
        assert_eq!(rays[4], 0.0);
        assert_eq!(rays[5], 8.0);

        // Right of Right is Down: nothing, wall at y = 10
        assert_eq!(rays[6], 0.0);
        assert_eq!(rays[7], 0.0);
        assert_eq!(rays[8], 5.0);
    }
}
