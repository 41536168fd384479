//! Playfield grid: walled cell matrix, occupancy and collision queries.

/// Playfield width in cells, wall columns included.
pub const FIELD_WIDTH: usize = 8;
/// Playfield height in cells, floor row included.
pub const FIELD_HEIGHT: usize = 14;
/// Pivot coordinate of a freshly spawned piece.
pub const SPAWN_X: i32 = 3;
pub const SPAWN_Y: i32 = 1;
/// Number of puyo colours.
pub const PALETTE_SIZE: u8 = 4;
/// Minimum connected group size that gets cleared.
pub const CLEAR_THRESHOLD: usize = 4;

/// Game constants grouped so tests can vary them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub width: usize,
    pub height: usize,
    pub spawn: (i32, i32),
    pub palette_size: u8,
    pub clear_threshold: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            spawn: (SPAWN_X, SPAWN_Y),
            palette_size: PALETTE_SIZE,
            clear_threshold: CLEAR_THRESHOLD,
        }
    }
}

/// Single cell: empty, permanent wall, or a puyo of a given colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Puyo(u8),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// Rotation state of a piece; selects where the secondary cell sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Up,
    Left,
    Down,
    Right,
}

impl Orientation {
    pub const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Offset of the secondary cell from the pivot. Also used as the
    /// 4-neighbourhood by the flood fill.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Left => (-1, 0),
            Self::Down => (0, 1),
            Self::Right => (1, 0),
        }
    }

    /// Next state clockwise (0 → 90 → 180 → 270 → 0).
    #[inline]
    pub fn rotated_cw(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }
}

/// Playfield: cells stored row-major, y=0 is top. Left/right columns and the
/// bottom row are walls for the lifetime of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 3 && height >= 2, "grid {width}x{height} has no playable area");
        let mut cells = vec![Cell::Empty; width * height];
        for y in 0..height {
            cells[y * width] = Cell::Wall;
            cells[y * width + width - 1] = Cell::Wall;
        }
        for cell in &mut cells[(height - 1) * width..] {
            *cell = Cell::Wall;
        }
        Self { width, height, cells }
    }

    pub fn from_rules(rules: &Rules) -> Self {
        Self::new(rules.width, rules.height)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Overwrites a cell. Callers validate placement first; out of bounds is a bug.
    #[inline]
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        assert!(
            x < self.width && y < self.height,
            "set_cell({x}, {y}) outside {}x{} grid",
            self.width,
            self.height
        );
        self.cells[y * self.width + x] = cell;
    }

    #[inline]
    pub fn clear_cell(&mut self, x: usize, y: usize) {
        self.set_cell(x, y, Cell::Empty);
    }

    /// Wall or puyo. Anything outside the grid counts as occupied.
    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        !self.cells[y as usize * self.width + x as usize].is_empty()
    }

    /// True if a piece with this pivot and orientation would overlap anything.
    pub fn would_collide(&self, pivot: (i32, i32), orientation: Orientation) -> bool {
        let (px, py) = pivot;
        let (dx, dy) = orientation.offset();
        self.is_occupied(px, py) || self.is_occupied(px + dx, py + dy)
    }

    /// Rows as slices, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    /// Number of puyo cells on the field.
    pub fn puyo_count(&self) -> usize {
        self.cells.iter().filter(|c| matches!(c, Cell::Puyo(_))).count()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(FIELD_WIDTH, FIELD_HEIGHT)
    }
}
