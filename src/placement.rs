use std::error::Error;
use std::fmt;

use rand::Rng;

use crate::game::Snake;
use crate::grid::{Cell, Grid};

/// Upper bound on rejection-sampling draws for one placement request. The
/// source behavior retried forever; exhausting this cap means the grid cannot
/// hold the configured snake, obstacles, and margin, which is a configuration
/// error rather than bad luck.
const MAX_ATTEMPTS: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementError {
    pub attempts: u32,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no free cell found after {} attempts; grid too small for the configured snake, obstacles, and margin",
            self.attempts
        )
    }
}

impl Error for PlacementError {}

/// Constraints on a fresh obstacle set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstacleRules {
    pub count: usize,
    /// Minimum Manhattan distance, in boxes, from the snake's head.
    pub min_head_distance: i32,
    /// Boxes to inset from every edge; zero allows the full grid.
    pub margin: i32,
}

/// Draw a uniformly random cell that sits on neither the snake nor any
/// obstacle.
pub fn place_food(
    grid: &Grid,
    snake: &Snake,
    obstacles: &[Cell],
    rng: &mut impl Rng,
) -> Result<Cell, PlacementError> {
    for _ in 0..MAX_ATTEMPTS {
        let cell = grid.random_cell(rng, 0);
        if !snake.contains(cell) && !obstacles.contains(&cell) {
            return Ok(cell);
        }
    }
    Err(PlacementError {
        attempts: MAX_ATTEMPTS,
    })
}

/// Build a set of exactly `rules.count` obstacle cells, one draw at a time.
/// A candidate is rejected if it lands on the snake, on the food (when one is
/// already placed), on an obstacle placed earlier in this call, or within
/// `rules.min_head_distance` boxes of the snake's head. The attempt budget is
/// shared across the whole set.
pub fn place_obstacles(
    grid: &Grid,
    snake: &Snake,
    food: Option<Cell>,
    rules: ObstacleRules,
    rng: &mut impl Rng,
) -> Result<Vec<Cell>, PlacementError> {
    // A margin wider than half the grid leaves no cell to sample.
    if rules.count > 0 && (grid.cols() <= 2 * rules.margin || grid.rows() <= 2 * rules.margin) {
        return Err(PlacementError { attempts: 0 });
    }

    let head = snake.head();
    let mut obstacles = Vec::with_capacity(rules.count);
    let mut attempts = 0;

    while obstacles.len() < rules.count {
        if attempts == MAX_ATTEMPTS {
            return Err(PlacementError { attempts });
        }
        attempts += 1;

        let cell = grid.random_cell(rng, rules.margin);
        if snake.contains(cell)
            || food == Some(cell)
            || obstacles.contains(&cell)
            || grid.manhattan(cell, head) < rules.min_head_distance
        {
            continue;
        }
        obstacles.push(cell);
    }

    Ok(obstacles)
}
