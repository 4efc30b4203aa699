use rand::Rng;

/// One occupied square on the play field. Coordinates are in pixels and are
/// always multiples of the grid's box size, already wrapped into range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// Unit delta scaled to one box, screen coordinates (y grows downward).
    pub fn delta(self, box_size: i32) -> (i32, i32) {
        match self {
            Direction::Up => (0, -box_size),
            Direction::Down => (0, box_size),
            Direction::Left => (-box_size, 0),
            Direction::Right => (box_size, 0),
        }
    }
}

/// The play field: a toroidal pixel rectangle divided into square boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub box_size: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32, box_size: i32) -> Self {
        debug_assert!(box_size > 0 && width % box_size == 0 && height % box_size == 0);
        Grid {
            width,
            height,
            box_size,
        }
    }

    pub fn cols(&self) -> i32 {
        self.width / self.box_size
    }

    pub fn rows(&self) -> i32 {
        self.height / self.box_size
    }

    /// Wrap raw pixel coordinates back onto the torus.
    pub fn wrap(&self, x: i32, y: i32) -> Cell {
        Cell {
            x: x.rem_euclid(self.width),
            y: y.rem_euclid(self.height),
        }
    }

    /// The cell one box away from `from` in `dir`, wrapped around the edges.
    pub fn step(&self, from: Cell, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta(self.box_size);
        self.wrap(from.x + dx, from.y + dy)
    }

    /// Cell at the given column/row, for building fixed layouts.
    pub fn cell(&self, col: i32, row: i32) -> Cell {
        Cell {
            x: col * self.box_size,
            y: row * self.box_size,
        }
    }

    /// Manhattan distance measured in boxes, not pixels.
    pub fn manhattan(&self, a: Cell, b: Cell) -> i32 {
        (a.x - b.x).abs() / self.box_size + (a.y - b.y).abs() / self.box_size
    }

    /// Uniformly random grid-aligned cell, `margin` boxes in from every edge.
    /// A margin of zero samples the whole grid.
    pub fn random_cell(&self, rng: &mut impl Rng, margin: i32) -> Cell {
        let col = rng.gen_range(margin..self.cols() - margin);
        let row = rng.gen_range(margin..self.rows() - margin);
        self.cell(col, row)
    }
}
