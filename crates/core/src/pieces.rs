//! Pieces module - tetromino geometry
//!
//! Every piece lives in a 4x4 box. A shape is the list of mino offsets inside
//! that box for one rotation. There are no wall kicks: a rotation either fits
//! at the same position or it is rejected like any other move.

use crate::types::{PieceKind, Rotation, PIECE_BOX};

/// Offset of a single mino relative to the piece origin (top-left of its box)
pub type MinoOffset = (i32, i32);

/// Shape of a piece - 4 mino offsets from the piece origin
pub type PieceShape = [MinoOffset; 4];

/// Renderable bitmap of a piece; occupied cells hold [`PieceKind::code`]
pub type PieceDisplay = [[u8; PIECE_BOX]; PIECE_BOX];

/// Shapes indexed by rotation (North, East, South, West)
type RotationTable = [PieceShape; 4];

const I_SHAPES: RotationTable = [
    [(0, 1), (1, 1), (2, 1), (3, 1)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
];

const O_SHAPES: RotationTable = [[(1, 0), (2, 0), (1, 1), (2, 1)]; 4];

const T_SHAPES: RotationTable = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

const S_SHAPES: RotationTable = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(1, 1), (2, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_SHAPES: RotationTable = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

const J_SHAPES: RotationTable = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

const L_SHAPES: RotationTable = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

fn rotation_table(kind: PieceKind) -> &'static RotationTable {
    match kind {
        PieceKind::I => &I_SHAPES,
        PieceKind::O => &O_SHAPES,
        PieceKind::T => &T_SHAPES,
        PieceKind::S => &S_SHAPES,
        PieceKind::Z => &Z_SHAPES,
        PieceKind::J => &J_SHAPES,
        PieceKind::L => &L_SHAPES,
    }
}

/// Get the mino offsets for a piece kind and rotation
pub fn shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    rotation_table(kind)[rotation.index()]
}

/// Render a piece into its 4x4 bitmap, row-major (`display[y][x]`)
pub fn display(kind: PieceKind, rotation: Rotation) -> PieceDisplay {
    let mut grid = [[0u8; PIECE_BOX]; PIECE_BOX];
    for (dx, dy) in shape(kind, rotation) {
        grid[dy as usize][dx as usize] = kind.code();
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    #[test]
    fn test_all_shapes_fit_in_box() {
        for kind in PieceKind::ALL {
            for rotation in ROTATIONS {
                for (dx, dy) in shape(kind, rotation) {
                    assert!((0..PIECE_BOX as i32).contains(&dx), "{:?} {:?}", kind, rotation);
                    assert!((0..PIECE_BOX as i32).contains(&dy), "{:?} {:?}", kind, rotation);
                }
            }
        }
    }

    #[test]
    fn test_shapes_have_four_distinct_minos() {
        for kind in PieceKind::ALL {
            for rotation in ROTATIONS {
                let mut minos = shape(kind, rotation).to_vec();
                minos.sort_unstable();
                minos.dedup();
                assert_eq!(minos.len(), 4, "{:?} {:?}", kind, rotation);
            }
        }
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let north = shape(PieceKind::O, Rotation::North);
        for rotation in ROTATIONS {
            assert_eq!(shape(PieceKind::O, rotation), north);
        }
    }

    #[test]
    fn test_display_marks_shape_cells() {
        let grid = display(PieceKind::T, Rotation::North);
        let code = PieceKind::T.code();
        assert_eq!(grid[0], [0, code, 0, 0]);
        assert_eq!(grid[1], [code, code, code, 0]);
        assert_eq!(grid[2], [0, 0, 0, 0]);
        assert_eq!(grid[3], [0, 0, 0, 0]);
    }
}
