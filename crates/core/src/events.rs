//! Change notifications emitted by the simulation.
//!
//! [`GameState`](crate::GameState) queues these in the order the changes
//! happen; the owner drains and broadcasts them after each operation.

use serde::{Deserialize, Serialize};

use crate::pieces::PieceDisplay;
use crate::snapshot::{FallingPieceSnapshot, FieldSnapshot};
use crate::types::PieceKind;

pub const EVENT_FIELD_UPDATE: &str = "game_field_update";
pub const EVENT_FALLING_PIECE_UPDATE: &str = "game_falling_piece_update";
pub const EVENT_NEXT_PIECE_UPDATE: &str = "game_next_piece_update";
pub const EVENT_HOLD_PIECE_UPDATE: &str = "game_hold_piece_update";
pub const EVENT_GAME_OVER: &str = "game_over";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// The locked cells changed
    #[serde(rename = "game_field_update")]
    FieldUpdate { field: FieldSnapshot },
    /// The falling piece moved, rotated, spawned or changed timer
    #[serde(rename = "game_falling_piece_update")]
    FallingPieceUpdate {
        falling_piece: FallingPieceSnapshot,
        piece_display: Option<PieceDisplay>,
    },
    #[serde(rename = "game_next_piece_update")]
    NextPieceUpdate { piece: PieceKind },
    #[serde(rename = "game_hold_piece_update")]
    HoldPieceUpdate { piece: Option<PieceKind> },
    #[serde(rename = "game_over")]
    GameOver,
}

impl GameEvent {
    /// Event type name used on the bus
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::FieldUpdate { .. } => EVENT_FIELD_UPDATE,
            GameEvent::FallingPieceUpdate { .. } => EVENT_FALLING_PIECE_UPDATE,
            GameEvent::NextPieceUpdate { .. } => EVENT_NEXT_PIECE_UPDATE,
            GameEvent::HoldPieceUpdate { .. } => EVENT_HOLD_PIECE_UPDATE,
            GameEvent::GameOver => EVENT_GAME_OVER,
        }
    }
}
