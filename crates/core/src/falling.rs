//! The player-controlled piece that has not locked yet.
//!
//! `FallingPiece` is plain state. Everything that needs the field, the next
//! slot or the generator (moving, spawning, locking) is done by
//! [`GameState`](crate::GameState), which is also the only writer.

use crate::field::Field;
use crate::pieces::{display, shape, PieceDisplay};
use crate::snapshot::FallingPieceSnapshot;
use crate::types::{PieceKind, Rotation};

/// Active piece, its placement and its gravity countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FallingPiece {
    /// `None` between a lock and the next spawn
    pub piece: Option<PieceKind>,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
    /// Milliseconds until the next automatic step down
    pub fall_timer: i32,
}

impl FallingPiece {
    pub fn is_active(&self) -> bool {
        self.piece.is_some()
    }

    /// Whether the field accepts this piece shifted by the given deltas
    ///
    /// Always false when no piece is active.
    pub fn fits(&self, field: &Field, dr: i32, dx: i32, dy: i32) -> bool {
        match self.piece {
            Some(kind) => {
                field.can_put_piece(kind, self.rotation.offset(dr), self.x + dx, self.y + dy)
            }
            None => false,
        }
    }

    /// Absolute field coordinates of the minos
    pub fn cells(&self) -> Option<[(i32, i32); 4]> {
        let kind = self.piece?;
        Some(shape(kind, self.rotation).map(|(dx, dy)| (self.x + dx, self.y + dy)))
    }

    pub fn display(&self) -> Option<PieceDisplay> {
        self.piece.map(|kind| display(kind, self.rotation))
    }

    pub fn snapshot(&self) -> FallingPieceSnapshot {
        FallingPieceSnapshot::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_piece_never_fits() {
        let field = Field::new(10, 20);
        let piece = FallingPiece::default();
        assert!(!piece.is_active());
        assert!(!piece.fits(&field, 0, 0, 0));
        assert_eq!(piece.cells(), None);
        assert_eq!(piece.display(), None);
    }

    #[test]
    fn test_cells_are_offset_by_position() {
        let piece = FallingPiece {
            piece: Some(PieceKind::O),
            x: 3,
            y: 5,
            ..FallingPiece::default()
        };
        assert_eq!(piece.cells(), Some([(4, 5), (5, 5), (4, 6), (5, 6)]));
    }

    #[test]
    fn test_fits_applies_rotation_delta() {
        // I north is horizontal on row 1 of its box; east is vertical in column 2.
        let field = Field::new(4, 2);
        let piece = FallingPiece {
            piece: Some(PieceKind::I),
            ..FallingPiece::default()
        };
        assert!(piece.fits(&field, 0, 0, 0));
        assert!(!piece.fits(&field, 1, 0, 0));
        assert!(!piece.fits(&field, 0, 0, 1));
    }
}
