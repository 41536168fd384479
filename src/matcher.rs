//! Group detection: flood fill same-coloured puyos, pop groups at the threshold.

use crate::grid::{Cell, Grid, Orientation};

/// One popped puyo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Popped {
    pub x: usize,
    pub y: usize,
    pub color: u8,
}

/// What a match pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub cells: Vec<Popped>,
    pub groups: u32,
}

impl ClearReport {
    #[inline]
    pub fn cleared(&self) -> bool {
        !self.cells.is_empty()
    }
}

/// Match engine. Owns the visited buffer so repeated passes don't reallocate.
#[derive(Debug, Clone)]
pub struct Matcher {
    width: usize,
    threshold: usize,
    visited: Vec<bool>,
    stack: Vec<(usize, usize)>,
}

impl Matcher {
    pub fn new(width: usize, height: usize, threshold: usize) -> Self {
        Self {
            width,
            threshold,
            visited: vec![false; width * height],
            stack: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.visited.fill(false);
    }

    #[inline]
    fn is_visited(&self, x: usize, y: usize) -> bool {
        self.visited[y * self.width + x]
    }

    /// Visit every cell connected to `origin` through edge-adjacent cells of
    /// `Puyo(color)`. Each such cell is marked visited and passed to `visit`
    /// exactly once.
    fn flood(&mut self, grid: &Grid, origin: (usize, usize), color: u8, mut visit: impl FnMut(usize, usize)) {
        debug_assert_eq!(grid.width(), self.width);
        self.stack.clear();
        self.stack.push(origin);
        while let Some((x, y)) = self.stack.pop() {
            if self.is_visited(x, y) || grid.cell(x, y) != Some(Cell::Puyo(color)) {
                continue;
            }
            self.visited[y * self.width + x] = true;
            visit(x, y);
            for dir in Orientation::ALL {
                let (dx, dy) = dir.offset();
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if grid.in_bounds(nx, ny) {
                    self.stack.push((nx as usize, ny as usize));
                }
            }
        }
    }

    /// Every same-colour group on the field, in scan order (top-to-bottom,
    /// left-to-right by first cell).
    pub fn groups(&mut self, grid: &Grid) -> Vec<Vec<(usize, usize)>> {
        self.reset();
        let mut out = Vec::new();
        for y in 0..grid.height() - 1 {
            for x in 1..grid.width() - 1 {
                let Some(Cell::Puyo(color)) = grid.cell(x, y) else {
                    continue;
                };
                if self.is_visited(x, y) {
                    continue;
                }
                let mut group = Vec::new();
                self.flood(grid, (x, y), color, |gx, gy| group.push((gx, gy)));
                out.push(group);
            }
        }
        out
    }

    /// Pop every group of at least `threshold` puyos.
    pub fn clear_groups(&mut self, grid: &mut Grid) -> ClearReport {
        let mut report = ClearReport::default();
        for group in self.groups(grid) {
            if group.len() < self.threshold {
                continue;
            }
            for (x, y) in group {
                if let Some(Cell::Puyo(color)) = grid.cell(x, y) {
                    report.cells.push(Popped { x, y, color });
                }
                grid.clear_cell(x, y);
            }
            report.groups += 1;
        }
        report
    }
}
