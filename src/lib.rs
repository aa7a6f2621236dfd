//! bloccs (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so binaries, tests and
//! benches can use `bloccs::{core, event, game, types}`.

pub use bloccs_core as core;
pub use bloccs_event as event;
pub use bloccs_game as game;
pub use bloccs_types as types;
