use std::time::Duration;

use crate::grid::Grid;

/// Everything tunable about a game. The two presets correspond to the two
/// rule sets this crate supports: `classic` has start/game-over screens and
/// keeps obstacles off the outer border, `plain` restarts instantly on death
/// and lets obstacles spawn anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Play field width in pixels, a multiple of `box_size`.
    pub width: i32,
    /// Play field height in pixels, a multiple of `box_size`.
    pub height: i32,
    /// Side of one grid square in pixels.
    pub box_size: i32,
    pub initial_length: usize,
    pub obstacle_count: usize,
    /// Minimum Manhattan distance (in boxes) between a fresh obstacle and the
    /// snake's head.
    pub min_obstacle_distance: i32,
    /// Obstacles spawn at least this many boxes in from every edge.
    pub obstacle_margin: i32,
    /// Show start and game-over screens; without them a lost game restarts
    /// on the next tick.
    pub screens: bool,
    pub tick_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 400,
            height: 400,
            box_size: 20,
            initial_length: 3,
            obstacle_count: 5,
            min_obstacle_distance: 3,
            obstacle_margin: 1,
            screens: true,
            tick_interval: Duration::from_millis(100),
        }
    }
}

impl GameConfig {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn plain() -> Self {
        GameConfig {
            obstacle_margin: 0,
            screens: false,
            ..Self::default()
        }
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height, self.box_size)
    }
}
