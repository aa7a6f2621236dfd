//! Core simulation - deterministic and free of I/O
//!
//! This crate holds the game rules of a single bloccs game. Nothing here
//! knows about threads, timers or transports: time arrives as a millisecond
//! delta passed to [`GameState::update`], commands arrive as [`Command`]
//! values or single-character tokens, and changes leave as queued
//! [`GameEvent`]s.
//!
//! # Module Structure
//!
//! - [`field`]: grid of locked cells, collision queries, row clearing, dirty flag
//! - [`pieces`]: tetromino shapes and their 4x4 display bitmaps
//! - [`rng`]: piece sources, including the seeded 7-bag generator
//! - [`falling`]: the active piece's placement and fall timer
//! - [`game_state`]: tick state machine, lock sequence, hold, hard lock, commands
//! - [`events`]: change notifications
//! - [`snapshot`]: serializable views used as event payloads
//!
//! # Example
//!
//! ```
//! use bloccs_core::GameState;
//! use bloccs_core::types::Command;
//!
//! let mut game = GameState::new(10, 20, 1.0, 12345);
//! game.update(10); // spawns the first piece
//!
//! game.apply(Command::MoveRight);
//! game.apply(Command::HardLock);
//! game.update(10); // locks it
//!
//! assert_eq!(game.pieces_locked(), 1);
//! assert!(!game.drain_events().is_empty());
//! ```

pub mod events;
pub mod falling;
pub mod field;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod snapshot;

pub use bloccs_types as types;

pub use events::GameEvent;
pub use falling::FallingPiece;
pub use field::Field;
pub use game_state::{GameState, TickOutcome};
pub use pieces::{display, shape, PieceDisplay, PieceShape};
pub use rng::{PieceSource, RandomBagGenerator, SequenceSource, SimpleRng};
pub use snapshot::{FallingPieceSnapshot, FieldSnapshot, GameSnapshot};
pub use types::Command;
