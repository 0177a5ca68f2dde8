//! Cursor — a position on the screen grid with clamped movement.
//!
//! There is no text model yet, so the cursor moves over the visible grid
//! itself: `row ∈ [0, rows)`, `col ∈ [0, cols)`. Every movement clamps, so a
//! cursor that starts inside the grid can never leave it.
//!
//! Like the buffer cursor it grew out of, `Cursor` doesn't own the thing it
//! moves over. The screen [`Size`] is passed to each movement method.

use tilde_term::size::Size;

/// A direction for single-cell movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor on the screen grid, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    row: usize,
    col: usize,
}

impl Cursor {
    /// Create a cursor at the top-left cell.
    #[must_use]
    pub const fn new() -> Self {
        Self { row: 0, col: 0 }
    }

    /// Create a cursor at `(row, col)`, clamped to `size`.
    #[must_use]
    pub const fn at(row: usize, col: usize, size: Size) -> Self {
        let mut cursor = Self { row, col };
        cursor.clamp(size);
        cursor
    }

    // -- Accessors ----------------------------------------------------------

    /// Current row (0-indexed).
    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Current column (0-indexed).
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    /// `(row, col)` pair.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    // -- Movement -----------------------------------------------------------

    /// Move one cell in `dir`, stopping at the grid edge.
    pub const fn step(&mut self, dir: Direction, size: Size) {
        match dir {
            Direction::Up => self.move_up(1),
            Direction::Down => self.move_down(1, size),
            Direction::Left => self.move_left(1),
            Direction::Right => self.move_right(1, size),
        }
    }

    /// Move up by `count` rows. Stops at row 0.
    pub const fn move_up(&mut self, count: usize) {
        self.row = self.row.saturating_sub(count);
    }

    /// Move down by `count` rows. Stops at the last row.
    pub const fn move_down(&mut self, count: usize, size: Size) {
        let last = last_row(size);
        let row = self.row.saturating_add(count);
        self.row = if row > last { last } else { row };
    }

    /// Move left by `count` columns. Stops at column 0 (no line wrapping).
    pub const fn move_left(&mut self, count: usize) {
        self.col = self.col.saturating_sub(count);
    }

    /// Move right by `count` columns. Stops at the last column.
    pub const fn move_right(&mut self, count: usize, size: Size) {
        let last = last_col(size);
        let col = self.col.saturating_add(count);
        self.col = if col > last { last } else { col };
    }

    /// Move to column 0.
    pub const fn move_to_line_start(&mut self) {
        self.col = 0;
    }

    /// Move to the last column of the screen.
    pub const fn move_to_line_end(&mut self, size: Size) {
        self.col = last_col(size);
    }

    /// Pull the cursor back inside `size` if it is outside.
    pub const fn clamp(&mut self, size: Size) {
        let (last_row, last_col) = (last_row(size), last_col(size));
        if self.row > last_row {
            self.row = last_row;
        }
        if self.col > last_col {
            self.col = last_col;
        }
    }
}

#[inline]
const fn last_row(size: Size) -> usize {
    (size.rows as usize).saturating_sub(1)
}

#[inline]
const fn last_col(size: Size) -> usize {
    (size.cols as usize).saturating_sub(1)
}
