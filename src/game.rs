use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, info};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::GameConfig;
use crate::grid::{Cell, Direction, Grid};
use crate::placement::{place_food, place_obstacles, ObstacleRules, PlacementError};

/// The snake body, head at the front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    cells: VecDeque<Cell>,
}

impl Snake {
    /// A fresh snake centered on the grid, body trailing away from `direction`.
    pub fn spawn(grid: &Grid, direction: Direction, length: usize) -> Snake {
        let back = direction.opposite();
        let mut cells = Vec::with_capacity(length);
        let mut cell = grid.cell(grid.cols() / 2, grid.rows() / 2);
        cells.push(cell);
        for _ in 1..length {
            cell = grid.step(cell, back);
            cells.push(cell);
        }
        Snake::from_cells(cells)
    }

    pub fn from_cells(cells: Vec<Cell>) -> Snake {
        Snake {
            cells: cells.into(),
        }
    }

    pub fn head(&self) -> Cell {
        self.cells[0]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Prepend the new head; keep the tail only when growing.
    fn advance(&mut self, new_head: Cell, grow: bool) {
        self.cells.push_front(new_head);
        if !grow {
            self.cells.pop_back();
        }
    }

    /// True when the head sits on any other segment.
    fn hit_self(&self) -> bool {
        let head = self.head();
        self.cells.iter().skip(1).any(|c| *c == head)
    }
}

/// What one simulation step amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Ate,
    Collided,
}

/// One round's mutable state: the board and everything on it. Replaced
/// wholesale on every (re)start.
#[derive(Clone, Debug, PartialEq)]
pub struct Arena {
    pub grid: Grid,
    pub snake: Snake,
    pub direction: Direction,
    pub food: Cell,
    pub obstacles: Vec<Cell>,
    pub rules: ObstacleRules,
    pub score: u32,
}

impl Arena {
    /// Full initialization: snake first, then obstacles (no food on the board
    /// yet), then food. Fails only when the grid cannot fit everything.
    pub fn new(config: &GameConfig, rng: &mut impl Rng) -> Result<Arena, PlacementError> {
        let grid = config.grid();
        let snake = Snake::spawn(&grid, Direction::Right, config.initial_length);
        let rules = ObstacleRules {
            count: config.obstacle_count,
            min_head_distance: config.min_obstacle_distance,
            margin: config.obstacle_margin,
        };
        let obstacles = place_obstacles(&grid, &snake, None, rules, rng)?;
        let food = place_food(&grid, &snake, &obstacles, rng)?;
        Ok(Arena {
            grid,
            snake,
            direction: Direction::Right,
            food,
            obstacles,
            rules,
            score: 0,
        })
    }

    /// Apply a requested direction change. Only turns onto the other axis are
    /// accepted; same-axis input (including an exact reversal) is dropped.
    pub fn turn(&mut self, dir: Direction) -> bool {
        if dir.axis() == self.direction.axis() {
            return false;
        }
        self.direction = dir;
        true
    }

    /// Advance the simulation by one tick: move the head (wrapping around the
    /// edges), eat and re-roll food plus the whole obstacle set if the head
    /// landed on food, then check for self- and obstacle-collision.
    pub fn step(&mut self, rng: &mut impl Rng) -> Result<StepOutcome, PlacementError> {
        let new_head = self.grid.step(self.snake.head(), self.direction);
        let ate = new_head == self.food;
        self.snake.advance(new_head, ate);

        if ate {
            self.score += 1;
            self.food = place_food(&self.grid, &self.snake, &self.obstacles, rng)?;
            self.obstacles =
                place_obstacles(&self.grid, &self.snake, Some(self.food), self.rules, rng)?;
        }

        if self.snake.hit_self() || self.obstacles.contains(&new_head) {
            return Ok(StepOutcome::Collided);
        }

        Ok(if ate {
            StepOutcome::Ate
        } else {
            StepOutcome::Moved
        })
    }
}

#[derive(Debug)]
pub enum Phase {
    Start,
    Playing(Arena),
    GameOver { arena: Arena, final_score: u32 },
    Exit,
}

/// The controller: owns the phase machine, the RNG, and the per-tick
/// direction latch. Generic over the RNG so tests can seed it.
pub struct Game<R: Rng = ThreadRng> {
    pub(crate) config: GameConfig,
    pub(crate) phase: Phase,
    rng: R,
    direction_changed: bool,
}

impl Game<ThreadRng> {
    pub fn new(config: GameConfig) -> Result<Self, PlacementError> {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> Game<R> {
    /// Without start/end screens there is nothing to wait for, so the game
    /// begins on the spot.
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, PlacementError> {
        let mut game = Game {
            config,
            phase: Phase::Start,
            rng,
            direction_changed: false,
        };
        if !config.screens {
            game.start()?;
        }
        Ok(game)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn should_exit(&self) -> bool {
        matches!(self.phase, Phase::Exit)
    }

    fn start(&mut self) -> Result<(), PlacementError> {
        info!(
            "starting game: {}x{} boxes, {} obstacles",
            self.config.width / self.config.box_size,
            self.config.height / self.config.box_size,
            self.config.obstacle_count,
        );
        self.phase = Phase::Playing(Arena::new(&self.config, &mut self.rng)?);
        self.direction_changed = false;
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), PlacementError> {
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            info!("quit requested");
            self.phase = Phase::Exit;
            return Ok(());
        }

        // Any other key starts a game from the start and game-over screens.
        if matches!(self.phase, Phase::Start | Phase::GameOver { .. }) {
            return self.start();
        }

        // While playing, only the first accepted turn per tick counts.
        if self.direction_changed {
            return Ok(());
        }
        let Some(dir) = direction_for(key.code) else {
            return Ok(());
        };
        if let Phase::Playing(arena) = &mut self.phase {
            if arena.turn(dir) {
                self.direction_changed = true;
            }
        }
        Ok(())
    }

    /// One scheduler callback. Does nothing outside of Playing, which is how
    /// the tick driver stands cancelled on the game-over screen.
    pub fn tick(&mut self) -> Result<(), PlacementError> {
        self.direction_changed = false;

        let outcome = match &mut self.phase {
            Phase::Playing(arena) => {
                let outcome = arena.step(&mut self.rng)?;
                if outcome == StepOutcome::Ate {
                    debug!("ate food, score {}, length {}", arena.score, arena.snake.len());
                }
                outcome
            }
            _ => return Ok(()),
        };

        if outcome == StepOutcome::Collided {
            let Phase::Playing(arena) = std::mem::replace(&mut self.phase, Phase::Start) else {
                unreachable!("outcome came from the playing arena");
            };
            let final_score = arena.score;
            info!("game over, final score {final_score}");
            if self.config.screens {
                self.phase = Phase::GameOver { arena, final_score };
            } else {
                self.start()?;
            }
        }
        Ok(())
    }
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cell(x: i32, y: i32) -> Cell {
        Cell { x, y }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_arena(snake_cells: Vec<Cell>, food: Cell) -> Arena {
        Arena {
            grid: Grid::new(400, 400, 20),
            snake: Snake::from_cells(snake_cells),
            direction: Direction::Right,
            food,
            obstacles: Vec::new(),
            rules: ObstacleRules {
                count: 5,
                min_head_distance: 3,
                margin: 1,
            },
            score: 0,
        }
    }

    #[test]
    fn spawn_is_centered_and_trails_backwards() {
        let grid = Grid::new(400, 400, 20);
        let snake = Snake::spawn(&grid, Direction::Right, 3);
        assert_eq!(snake.head(), cell(200, 200));
        let cells: Vec<Cell> = snake.cells().collect();
        assert_eq!(cells, vec![cell(200, 200), cell(180, 200), cell(160, 200)]);
    }

    #[test]
    fn plain_move_keeps_length() {
        let mut arena = test_arena(
            vec![cell(160, 200), cell(140, 200), cell(120, 200)],
            cell(300, 300),
        );
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = arena.step(&mut rng).unwrap();

        assert_eq!(outcome, StepOutcome::Moved);
        let cells: Vec<Cell> = arena.snake.cells().collect();
        assert_eq!(cells, vec![cell(180, 200), cell(160, 200), cell(140, 200)]);
        assert_eq!(arena.score, 0);
    }

    #[test]
    fn eating_grows_and_rerolls_the_board() {
        let mut arena = test_arena(
            vec![cell(160, 200), cell(140, 200), cell(120, 200)],
            cell(180, 200),
        );
        arena.obstacles = vec![cell(40, 40)];
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = arena.step(&mut rng).unwrap();

        assert_eq!(outcome, StepOutcome::Ate);
        assert_eq!(arena.score, 1);
        assert_eq!(arena.snake.len(), 4);
        assert_eq!(arena.snake.head(), cell(180, 200));

        // Fresh food and a full fresh obstacle set, all constraints holding.
        assert!(!arena.snake.contains(arena.food));
        assert!(!arena.obstacles.contains(&arena.food));
        assert_eq!(arena.obstacles.len(), 5);
        for obs in &arena.obstacles {
            assert!(!arena.snake.contains(*obs));
            assert!(arena.grid.manhattan(*obs, arena.snake.head()) >= 3);
        }
    }

    #[test]
    fn head_wraps_across_the_right_edge() {
        let mut arena = test_arena(
            vec![cell(380, 200), cell(360, 200), cell(340, 200)],
            cell(100, 100),
        );
        let mut rng = StdRng::seed_from_u64(0);

        arena.step(&mut rng).unwrap();

        assert_eq!(arena.snake.head(), cell(0, 200));
    }

    #[test]
    fn self_collision_freezes_the_score() {
        // Head at (100,100) moving Up into its own body at (100,80).
        let mut arena = test_arena(
            vec![
                cell(100, 100),
                cell(120, 100),
                cell(120, 80),
                cell(100, 80),
                cell(80, 80),
            ],
            cell(300, 300),
        );
        arena.direction = Direction::Up;
        arena.score = 4;
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = arena.step(&mut rng).unwrap();

        assert_eq!(outcome, StepOutcome::Collided);
        assert_eq!(arena.score, 4);
    }

    #[test]
    fn eat_and_collide_in_one_tick_keeps_the_point() {
        // Food sits on a body cell the head is about to enter: the point is
        // scored first, then the collision ends the round.
        let mut arena = test_arena(
            vec![
                cell(100, 100),
                cell(120, 100),
                cell(120, 80),
                cell(100, 80),
                cell(80, 80),
            ],
            cell(100, 80),
        );
        arena.direction = Direction::Up;
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = arena.step(&mut rng).unwrap();

        assert_eq!(outcome, StepOutcome::Collided);
        assert_eq!(arena.score, 1);
        assert_eq!(arena.snake.len(), 6);
    }

    #[test]
    fn obstacle_collision_ends_the_round() {
        let mut arena = test_arena(
            vec![cell(100, 100), cell(80, 100), cell(60, 100)],
            cell(300, 300),
        );
        arena.obstacles = vec![cell(120, 100)];
        arena.score = 2;
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = arena.step(&mut rng).unwrap();

        assert_eq!(outcome, StepOutcome::Collided);
        assert_eq!(arena.score, 2);
        assert_eq!(arena.snake.len(), 3);
    }

    #[test]
    fn reversal_is_rejected() {
        let mut arena = test_arena(
            vec![cell(100, 100), cell(80, 100), cell(60, 100)],
            cell(300, 300),
        );
        assert!(!arena.turn(Direction::Left));
        assert_eq!(arena.direction, Direction::Right);
        // Same direction again is also same-axis input.
        assert!(!arena.turn(Direction::Right));
        assert_eq!(arena.direction, Direction::Right);
        // Perpendicular turns go through.
        assert!(arena.turn(Direction::Up));
        assert_eq!(arena.direction, Direction::Up);
    }

    #[test]
    fn any_key_starts_the_game() {
        let mut game = Game::with_rng(GameConfig::classic(), StdRng::seed_from_u64(1)).unwrap();
        assert!(matches!(game.phase(), Phase::Start));

        game.handle_key(key(KeyCode::Char('x'))).unwrap();
        match game.phase() {
            Phase::Playing(arena) => {
                assert_eq!(arena.score, 0);
                assert_eq!(arena.snake.len(), 3);
                assert_eq!(arena.direction, Direction::Right);
                assert_eq!(arena.obstacles.len(), 5);
            }
            other => panic!("expected Playing, got {other:?}"),
        }
    }

    #[test]
    fn one_turn_per_tick() {
        let mut game = Game::with_rng(GameConfig::classic(), StdRng::seed_from_u64(2)).unwrap();
        game.handle_key(key(KeyCode::Char('x'))).unwrap();

        // First turn of the tick is accepted, the second is latched out even
        // though it would otherwise be a legal perpendicular turn.
        game.handle_key(key(KeyCode::Up)).unwrap();
        game.handle_key(key(KeyCode::Left)).unwrap();
        let Phase::Playing(arena) = game.phase() else {
            panic!("not playing");
        };
        assert_eq!(arena.direction, Direction::Up);

        // The latch clears on the next tick.
        game.tick().unwrap();
        game.handle_key(key(KeyCode::Left)).unwrap();
        let Phase::Playing(arena) = game.phase() else {
            panic!("not playing");
        };
        assert_eq!(arena.direction, Direction::Left);
    }

    #[test]
    fn any_key_restarts_after_game_over() {
        let mut game = Game::with_rng(GameConfig::classic(), StdRng::seed_from_u64(3)).unwrap();
        game.handle_key(key(KeyCode::Char('x'))).unwrap();

        let Phase::Playing(arena) = std::mem::replace(&mut game.phase, Phase::Start) else {
            panic!("not playing");
        };
        game.phase = Phase::GameOver {
            arena,
            final_score: 7,
        };

        game.handle_key(key(KeyCode::Char('x'))).unwrap();
        let Phase::Playing(arena) = game.phase() else {
            panic!("restart should re-enter Playing");
        };
        assert_eq!(arena.score, 0);
        assert_eq!(arena.snake.len(), 3);
    }

    #[test]
    fn collision_shows_the_game_over_screen() {
        let mut game = Game::with_rng(GameConfig::classic(), StdRng::seed_from_u64(4)).unwrap();
        game.handle_key(key(KeyCode::Char('x'))).unwrap();

        // Drop an obstacle right in front of the head.
        if let Phase::Playing(arena) = &mut game.phase {
            let next = arena.grid.step(arena.snake.head(), arena.direction);
            arena.obstacles = vec![next];
            arena.score = 3;
        }

        game.tick().unwrap();
        match game.phase() {
            Phase::GameOver { final_score, .. } => assert_eq!(*final_score, 3),
            other => panic!("expected GameOver, got {other:?}"),
        }

        // No further ticks advance the simulation while the screen is up.
        let len_before = match game.phase() {
            Phase::GameOver { arena, .. } => arena.snake.len(),
            _ => unreachable!(),
        };
        game.tick().unwrap();
        match game.phase() {
            Phase::GameOver { arena, final_score } => {
                assert_eq!(*final_score, 3);
                assert_eq!(arena.snake.len(), len_before);
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[test]
    fn plain_variant_restarts_immediately() {
        let mut game = Game::with_rng(GameConfig::plain(), StdRng::seed_from_u64(5)).unwrap();
        // No start screen: the game is live from construction.
        assert!(matches!(game.phase(), Phase::Playing(_)));

        if let Phase::Playing(arena) = &mut game.phase {
            let next = arena.grid.step(arena.snake.head(), arena.direction);
            arena.obstacles = vec![next];
            arena.score = 9;
        }

        game.tick().unwrap();
        let Phase::Playing(arena) = game.phase() else {
            panic!("plain variant should restart in place");
        };
        assert_eq!(arena.score, 0);
        assert_eq!(arena.snake.len(), 3);
    }

    #[test]
    fn quit_from_any_phase() {
        let mut game = Game::with_rng(GameConfig::classic(), StdRng::seed_from_u64(6)).unwrap();
        assert!(!game.should_exit());
        game.handle_key(key(KeyCode::Char('q'))).unwrap();
        assert!(game.should_exit());

        let mut game = Game::with_rng(GameConfig::plain(), StdRng::seed_from_u64(6)).unwrap();
        game.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(game.should_exit());
    }
}
