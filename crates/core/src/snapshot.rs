//! Serializable views of the simulation state.
//!
//! These are what event payloads and read accessors hand out; they never
//! borrow from the live state.

use serde::{Deserialize, Serialize};

use crate::falling::FallingPiece;
use crate::types::{PieceKind, Rotation};

/// Full field contents, row-major from the top; 0 = empty, otherwise the piece code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FallingPieceSnapshot {
    pub piece: Option<PieceKind>,
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
    pub fall_timer: i32,
}

impl From<&FallingPiece> for FallingPieceSnapshot {
    fn from(value: &FallingPiece) -> Self {
        Self {
            piece: value.piece,
            x: value.x,
            y: value.y,
            rotation: value.rotation,
            fall_timer: value.fall_timer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub field: FieldSnapshot,
    pub falling_piece: FallingPieceSnapshot,
    pub next_piece: PieceKind,
    pub hold_piece: Option<PieceKind>,
    pub hold_locked: bool,
    pub over: bool,
    pub lines_cleared: u64,
    pub pieces_locked: u64,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.over
    }
}
