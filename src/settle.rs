//! Gravity for loose puyos: compact every column until nothing can fall.

use crate::grid::Grid;

/// One pass: bottom-up, left to right, each puyo with an empty cell below
/// drops one row. Returns true if anything moved.
pub fn settle_step(grid: &mut Grid) -> bool {
    let (w, h) = (grid.width(), grid.height());
    let mut moved = false;
    // Row h-2 rests on the floor, so the first row that can fall is h-3.
    for y in (0..h.saturating_sub(2)).rev() {
        for x in 1..w - 1 {
            let (Some(cell), Some(below)) = (grid.cell(x, y), grid.cell(x, y + 1)) else {
                continue;
            };
            if !cell.is_empty() && below.is_empty() {
                grid.set_cell(x, y + 1, cell);
                grid.clear_cell(x, y);
                moved = true;
            }
        }
    }
    moved
}

/// Run passes until a pass moves nothing. Returns the number of passes that moved.
pub fn settle(grid: &mut Grid) -> u32 {
    let mut passes = 0;
    while settle_step(grid) {
        passes += 1;
    }
    passes
}

/// True if some puyo has an empty playable cell directly below it.
pub fn has_floating(grid: &Grid) -> bool {
    (0..grid.height().saturating_sub(2)).any(|y| {
        (1..grid.width() - 1).any(|x| {
            matches!(
                (grid.cell(x, y), grid.cell(x, y + 1)),
                (Some(c), Some(b)) if !c.is_empty() && b.is_empty()
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, FIELD_HEIGHT, FIELD_WIDTH};
    use proptest::prelude::*;

    const BOTTOM: usize = FIELD_HEIGHT - 2;

    #[test]
    fn test_single_puyo_falls_to_floor() {
        let mut grid = Grid::default();
        grid.set_cell(2, 0, Cell::Puyo(1));
        let passes = settle(&mut grid);
        assert_eq!(passes as usize, BOTTOM);
        assert_eq!(grid.cell(2, BOTTOM), Some(Cell::Puyo(1)));
        assert_eq!(grid.puyo_count(), 1);
        assert!(!has_floating(&grid));
    }

    #[test]
    fn test_one_row_per_pass() {
        let mut grid = Grid::default();
        grid.set_cell(4, 5, Cell::Puyo(0));
        grid.set_cell(4, 4, Cell::Puyo(2));
        assert!(settle_step(&mut grid));
        // Bottom-up scan lets the whole stack shift one row in a single pass.
        assert_eq!(grid.cell(4, 6), Some(Cell::Puyo(0)));
        assert_eq!(grid.cell(4, 5), Some(Cell::Puyo(2)));
        assert_eq!(grid.cell(4, 4), Some(Cell::Empty));
    }

    #[test]
    fn test_gap_closes_keeping_order() {
        let mut grid = Grid::default();
        grid.set_cell(3, BOTTOM, Cell::Puyo(0));
        grid.set_cell(3, BOTTOM - 3, Cell::Puyo(1));
        grid.set_cell(3, BOTTOM - 4, Cell::Puyo(2));
        assert_eq!(settle(&mut grid), 2);
        assert_eq!(grid.cell(3, BOTTOM), Some(Cell::Puyo(0)));
        assert_eq!(grid.cell(3, BOTTOM - 1), Some(Cell::Puyo(1)));
        assert_eq!(grid.cell(3, BOTTOM - 2), Some(Cell::Puyo(2)));
    }

    #[test]
    fn test_settled_grid_is_fixpoint() {
        let mut grid = Grid::default();
        grid.set_cell(1, BOTTOM, Cell::Puyo(0));
        grid.set_cell(1, BOTTOM - 1, Cell::Puyo(0));
        let before = grid.clone();
        assert!(!settle_step(&mut grid));
        assert_eq!(grid, before);
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        let playable = (FIELD_WIDTH - 2) * (FIELD_HEIGHT - 1);
        prop::collection::vec(prop::option::weighted(0.4, 0u8..4), playable).prop_map(|cells| {
            let mut grid = Grid::default();
            for (i, c) in cells.into_iter().enumerate() {
                if let Some(color) = c {
                    grid.set_cell(1 + i % (FIELD_WIDTH - 2), i / (FIELD_WIDTH - 2), Cell::Puyo(color));
                }
            }
            grid
        })
    }

    proptest! {
        #[test]
        fn settle_leaves_nothing_floating(mut grid in arb_grid()) {
            let count = grid.puyo_count();
            settle(&mut grid);
            prop_assert!(!has_floating(&grid));
            prop_assert_eq!(grid.puyo_count(), count);
        }

        #[test]
        fn settle_matches_per_column_gravity(mut grid in arb_grid()) {
            let mut expected = Grid::default();
            for x in 1..FIELD_WIDTH - 1 {
                let column: Vec<Cell> = (0..FIELD_HEIGHT - 1)
                    .rev()
                    .filter_map(|y| grid.cell(x, y))
                    .filter(|c| !c.is_empty())
                    .collect();
                for (i, c) in column.into_iter().enumerate() {
                    expected.set_cell(x, BOTTOM - i, c);
                }
            }
            settle(&mut grid);
            prop_assert_eq!(grid, expected);
        }
    }
}
