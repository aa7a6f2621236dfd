//! Field module - the grid of locked cells
//!
//! Coordinates are `(x, y)` with the origin at the top-left corner: x grows to
//! the right, y grows downwards, row 0 is the spawn row. Cells are stored
//! row-major in a flat vector.
//!
//! The field carries a dirty flag. Every mutation that changes the grid sets
//! it; the owner clears it after broadcasting a snapshot.

use crate::pieces::shape;
use crate::snapshot::FieldSnapshot;
use crate::types::{Cell, PieceKind, Rotation, PIECE_BOX};

/// Fixed-size grid of locked cells
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    width: usize,
    height: usize,
    /// Row-major cells (y * width + x)
    cells: Vec<Cell>,
    dirty: bool,
}

impl Field {
    /// Create an empty field
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
            dirty: false,
        }
    }

    /// Build a field from ASCII rows, top row first
    ///
    /// `.` is an empty cell, a piece letter (`i o t s z j l`, any case) is a
    /// cell of that kind and any other character is an `I` cell. All rows must
    /// have the same length.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloccs_core::Field;
    ///
    /// let field = Field::from_ascii(&["....", "##.#"]);
    /// assert_eq!(field.width(), 4);
    /// assert_eq!(field.height(), 2);
    /// assert!(field.is_free(2, 1));
    /// assert!(!field.is_free(0, 1));
    /// ```
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        assert!(
            rows.iter().all(|r| r.chars().count() == width),
            "all rows must have the same width"
        );

        let mut field = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let kind = PieceKind::from_str(&ch.to_string()).unwrap_or(PieceKind::I);
                field.cells[y * width + x] = Some(kind);
            }
        }
        field
    }

    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Column new pieces spawn at: their 4-wide box centered on the field
    pub fn center_x(&self) -> i32 {
        (self.width.saturating_sub(PIECE_BOX) / 2) as i32
    }

    /// Get cell at position (x, y); None if out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y); returns false if out of bounds
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                if self.cells[idx] != cell {
                    self.cells[idx] = cell;
                    self.dirty = true;
                }
                true
            }
            None => false,
        }
    }

    /// In bounds and empty
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height {
            return false;
        }
        self.row(y).iter().all(|cell| cell.is_some())
    }

    fn row(&self, y: usize) -> &[Cell] {
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.max(1)).take(self.height)
    }

    /// Whether every mino of the piece would land in bounds on a free cell
    pub fn can_put_piece(&self, kind: PieceKind, rotation: Rotation, x: i32, y: i32) -> bool {
        shape(kind, rotation)
            .iter()
            .all(|&(dx, dy)| self.is_free(x + dx, y + dy))
    }

    /// Write the piece's minos into the grid
    ///
    /// The write is unconditional: minos over occupied cells replace them and
    /// minos outside the grid are skipped. Returns whether the placement was
    /// one [`Field::can_put_piece`] accepts.
    pub fn put_piece(&mut self, kind: PieceKind, rotation: Rotation, x: i32, y: i32) -> bool {
        let fits = self.can_put_piece(kind, rotation, x, y);
        for (dx, dy) in shape(kind, rotation) {
            self.set(x + dx, y + dy, Some(kind));
        }
        fits
    }

    /// Remove every full row and return how many were removed
    ///
    /// Single bottom-up pass: kept rows are copied down over the removed ones,
    /// then the freed rows at the top are emptied. Columns never shift.
    pub fn clear_full_rows(&mut self) -> usize {
        let width = self.width;
        let mut cleared = 0;
        let mut write_y = self.height;

        for read_y in (0..self.height).rev() {
            if self.is_row_full(read_y) {
                cleared += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * width;
                self.cells.copy_within(src..src + width, write_y * width);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        if cleared > 0 {
            self.dirty = true;
        }
        cleared
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            width: self.width,
            height: self.height,
            cells: self
                .rows()
                .map(|row| row.iter().map(|c| c.map_or(0, |k| k.code())).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_bounds() {
        let field = Field::new(10, 20);
        assert_eq!(field.index(0, 0), Some(0));
        assert_eq!(field.index(9, 0), Some(9));
        assert_eq!(field.index(0, 1), Some(10));
        assert_eq!(field.index(9, 19), Some(199));
        assert_eq!(field.index(-1, 0), None);
        assert_eq!(field.index(10, 0), None);
        assert_eq!(field.index(0, 20), None);
    }

    #[test]
    fn test_center_x() {
        assert_eq!(Field::new(10, 20).center_x(), 3);
        assert_eq!(Field::new(4, 4).center_x(), 0);
        assert_eq!(Field::new(7, 20).center_x(), 1);
    }

    #[test]
    fn test_set_marks_dirty_only_on_change() {
        let mut field = Field::new(4, 4);
        assert!(!field.is_dirty());

        assert!(field.set(1, 1, None));
        assert!(!field.is_dirty());

        assert!(field.set(1, 1, Some(PieceKind::T)));
        assert!(field.is_dirty());

        field.clear_dirty();
        assert!(!field.set(4, 0, Some(PieceKind::T)));
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_put_piece_overwrites_overlap() {
        let mut field = Field::from_ascii(&["....", "....", ".#..", "...."]);
        // T north at (0, 1) covers (1,1) (0,2) (1,2) (2,2)
        assert!(!field.can_put_piece(PieceKind::T, Rotation::North, 0, 1));
        assert!(!field.put_piece(PieceKind::T, Rotation::North, 0, 1));
        assert_eq!(field.occupied(), 4);
        assert_eq!(field.get(1, 2), Some(Some(PieceKind::T)));
        assert!(field.is_dirty());
    }

    #[test]
    fn test_put_piece_writes_kind() {
        let mut field = Field::new(4, 4);
        assert!(field.put_piece(PieceKind::O, Rotation::North, 0, 2));
        assert_eq!(field.get(1, 2), Some(Some(PieceKind::O)));
        assert_eq!(field.get(2, 3), Some(Some(PieceKind::O)));
        assert_eq!(field.occupied(), 4);
        assert!(field.is_dirty());
    }

    #[test]
    fn test_clear_full_rows_compacts() {
        let mut field = Field::from_ascii(&[
            "....", //
            "#...", //
            "####", //
            ".#..", //
            "####", //
        ]);

        assert_eq!(field.clear_full_rows(), 2);
        assert_eq!(
            field,
            {
                let mut expected = Field::from_ascii(&["....", "....", "....", "#...", ".#.."]);
                expected.dirty = true;
                expected
            }
        );
    }

    #[test]
    fn test_clear_full_rows_none_full_keeps_clean() {
        let mut field = Field::from_ascii(&["....", "###."]);
        assert_eq!(field.clear_full_rows(), 0);
        assert!(!field.is_dirty());
    }

    #[test]
    fn test_snapshot_codes() {
        let field = Field::from_ascii(&["t.", ".z"]);
        let snap = field.snapshot();
        assert_eq!(snap.width, 2);
        assert_eq!(snap.height, 2);
        assert_eq!(
            snap.cells,
            vec![vec![PieceKind::T.code(), 0], vec![0, PieceKind::Z.code()]]
        );
    }
}
