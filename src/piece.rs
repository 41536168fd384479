//! Active piece: a pivot puyo plus one orbiting puyo of the same colour.

use crate::grid::{Cell, Grid, Orientation};

/// Lifecycle of one piece instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PieceState {
    #[default]
    Unspawned,
    Falling,
    /// Cells now live in the grid; dormant until the next spawn.
    Locked,
}

/// Result of one gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fall {
    Moved,
    Locked,
    /// Piece was not falling; nothing happened.
    Idle,
}

/// Current piece with pivot position, orientation and colour.
#[derive(Debug, Clone)]
pub struct ActivePiece {
    spawn: (i32, i32),
    x: i32,
    y: i32,
    orientation: Orientation,
    color: u8,
    state: PieceState,
}

impl ActivePiece {
    pub fn new(spawn: (i32, i32)) -> Self {
        Self {
            spawn,
            x: spawn.0,
            y: spawn.1,
            orientation: Orientation::Up,
            color: 0,
            state: PieceState::Unspawned,
        }
    }

    /// Reset to the start coordinate, orientation 0, given colour. Replaces
    /// whatever piece was there.
    pub fn spawn(&mut self, color: u8) {
        (self.x, self.y) = self.spawn;
        self.orientation = Orientation::Up;
        self.color = color;
        self.state = PieceState::Falling;
    }

    /// Take back a piece whose spawn pose was blocked; it never enters play.
    pub fn withdraw(&mut self) {
        self.state = PieceState::Unspawned;
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn color(&self) -> u8 {
        self.color
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.state == PieceState::Falling
    }

    #[inline]
    pub fn pivot(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Pivot cell then secondary cell.
    pub fn cells(&self) -> [(i32, i32); 2] {
        let (dx, dy) = self.orientation.offset();
        [(self.x, self.y), (self.x + dx, self.y + dy)]
    }

    /// Shift by (dx, dy) unless the new pose collides.
    pub fn try_move(&mut self, grid: &Grid, dx: i32, dy: i32) -> bool {
        if !self.is_falling() {
            return false;
        }
        let (nx, ny) = (self.x + dx, self.y + dy);
        if grid.would_collide((nx, ny), self.orientation) {
            return false;
        }
        self.x = nx;
        self.y = ny;
        true
    }

    /// Rotate one step clockwise in place. No wall kicks.
    pub fn try_rotate_cw(&mut self, grid: &Grid) -> bool {
        if !self.is_falling() {
            return false;
        }
        let next = self.orientation.rotated_cw();
        if grid.would_collide(self.pivot(), next) {
            return false;
        }
        self.orientation = next;
        true
    }

    /// Fall one row; when blocked, write both cells into the grid and lock.
    pub fn gravity_step(&mut self, grid: &mut Grid) -> Fall {
        if !self.is_falling() {
            return Fall::Idle;
        }
        if self.try_move(grid, 0, 1) {
            return Fall::Moved;
        }
        for (x, y) in self.cells() {
            grid.set_cell(x as usize, y as usize, Cell::Puyo(self.color));
        }
        self.state = PieceState::Locked;
        Fall::Locked
    }
}
