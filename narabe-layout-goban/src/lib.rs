//! Row-major grid planner.
//!
//! Windows are laid out left-to-right, top-to-bottom in `rows` rows and
//! `ceil(n / rows)` columns of uniformly sized cells.

use std::num::NonZeroU32;

pub const MIN_ROWS: u32 = 1;
pub const MAX_ROWS: u32 = 50;
pub const DEFAULT_ROWS: u32 = 2;

/// A tile relative to the top-left corner of the usable screen area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Walks the grid one cell at a time.
///
/// After each cell the cursor moves right by one cell width. A cursor past
/// `width - cell_width` returns to the left edge of the next row, and a row
/// past `height - cell_height` returns to the top. The second wrap means
/// anything beyond the grid's capacity is stacked over the first row instead
/// of being clamped or rejected.
#[derive(Debug, Clone)]
pub struct GridCursor {
    x: u32,
    y: u32,
    cell_width: u32,
    cell_height: u32,
    max_x: u32,
    max_y: u32,
}

impl GridCursor {
    pub fn new(columns: NonZeroU32, rows: NonZeroU32, width: u32, height: u32) -> Self {
        let cell_width = width / columns.get();
        let cell_height = height / rows.get();
        Self {
            x: 0,
            y: 0,
            cell_width,
            cell_height,
            max_x: width - cell_width,
            max_y: height - cell_height,
        }
    }

    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }
}

impl Iterator for GridCursor {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.x > self.max_x {
            self.x = 0;
            self.y = self.y.saturating_add(self.cell_height);
        }
        if self.y > self.max_y {
            self.y = 0;
        }

        let cell = Cell {
            x: self.x,
            y: self.y,
            width: self.cell_width,
            height: self.cell_height,
        };
        self.x = self.x.saturating_add(self.cell_width);
        Some(cell)
    }
}

/// Number of columns needed to hold `count` windows in `rows` rows.
pub fn column_count(count: usize, rows: NonZeroU32) -> u32 {
    let columns = count.div_ceil(rows.get() as usize);
    u32::try_from(columns).unwrap_or(u32::MAX)
}

/// Assigns a cell to every item, in input order.
pub fn plan<T>(items: &[T], rows: NonZeroU32, width: u32, height: u32) -> Vec<(&T, Cell)> {
    let Some(columns) = NonZeroU32::new(column_count(items.len(), rows)) else {
        return vec![];
    };

    let cursor = GridCursor::new(columns, rows, width, height);
    items.iter().zip(cursor).collect()
}

/// Clamps a requested row count into `MIN_ROWS..=MAX_ROWS`.
pub fn clamp_rows(rows: u32) -> NonZeroU32 {
    let rows = rows.clamp(MIN_ROWS, MAX_ROWS);
    NonZeroU32::new(rows).unwrap_or(NonZeroU32::MIN)
}
