//! Reward functions.
//!
//! Two figures are tracked for an episode: the shaped fitness accumulated step
//! by step inside the engine, and a composite score computed once at the end
//! of an episode and used to rank policies against each other.

use super::state::Position;

/// Per-step bonus for staying close to the pill: `max(0, ceiling - round(distance))`.
pub fn proximity_bonus(head: Position, pill: Position, ceiling: u64) -> u64 {
    let distance = head.distance_to(pill).round();
    if distance >= ceiling as f64 {
        0
    } else {
        ceiling - distance as u64
    }
}

/// Terminal score of an episode:
/// `steps + (2^eaten + eaten^2.1 * 500) - (eaten^1.2 * (0.25 * steps)^1.3)`.
pub fn composite_score(steps: u32, pills_eaten: u32) -> f64 {
    let steps = f64::from(steps);
    let eaten = f64::from(pills_eaten);

    let reward = 2f64.powf(eaten) + eaten.powf(2.1) * 500.0;
    let penalty = eaten.powf(1.2) * (0.25 * steps).powf(1.3);

    steps + reward - penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proximity_bonus() {
        let head = Position::new(0, 0);
        assert_eq!(proximity_bonus(head, Position::new(0, 0), 10), 10);
        assert_eq!(proximity_bonus(head, Position::new(3, 4), 10), 5);
        // sqrt(2) rounds to 1
        assert_eq!(proximity_bonus(head, Position::new(1, 1), 10), 9);
        // sqrt(8) = 2.83 rounds to 3
        assert_eq!(proximity_bonus(head, Position::new(2, 2), 10), 7);
        assert_eq!(proximity_bonus(head, Position::new(10, 0), 10), 0);
        assert_eq!(proximity_bonus(head, Position::new(30, 40), 10), 0);
    }

    #[test]
    fn test_composite_without_pills_is_steps_plus_one() {
        // 2^0 = 1, every other term vanishes
        assert!((composite_score(0, 0) - 1.0).abs() < 1e-9);
        assert!((composite_score(42, 0) - 43.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_with_pills() {
        // steps = 0: 0 + 2 + 500 - 0
        assert!((composite_score(0, 1) - 502.0).abs() < 1e-9);

        // steps = 40, eaten = 1: 40 + 502 - 10^1.3
        let expected = 40.0 + 502.0 - 10f64.powf(1.3);
        assert!((composite_score(40, 1) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_composite_penalizes_slow_eating() {
        assert!(composite_score(50, 3) > composite_score(500, 3));
    }
}
