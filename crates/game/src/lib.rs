//! Game runtime - ticking, serialization of access, and event broadcast.
//!
//! [`Game`] wraps one [`GameState`](bloccs_core::GameState) in a mutex, drives
//! it from a fixed-rate tokio task, and publishes everything the simulation
//! reports on the game's `update/<id>` topic of a shared
//! [`Bus`](bloccs_event::Bus).
//!
//! # Lifecycle
//!
//! 1. [`Game::new`] registers the topic.
//! 2. [`Game::start`] spawns the tick task (100 Hz by default).
//! 3. Commands ([`Game::command`], [`Game::apply`], ...) may be issued from any
//!    task or thread at any time; they are serialized with the ticks.
//! 4. [`Game::stop`] signals the task, waits for it to exit, and removes the topic.
//!
//! Once the game is over the task keeps running but every update is a no-op.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bloccs_game::{Game, GameConfig};
//! use bloccs_event::Bus;
//!
//! # async fn demo() {
//! let bus = Arc::new(Bus::default());
//! let game = Game::new(bus, "demo", &GameConfig::default());
//! let mut events = game.subscribe().unwrap();
//!
//! game.start();
//! game.command("L");
//! let first = events.recv().await.unwrap();
//! println!("{} {}", first.topic, first.event_type);
//! game.stop().await;
//! # }
//! ```

pub mod config;
pub mod game;

pub use bloccs_core as core;
pub use bloccs_event as event;
pub use bloccs_types as types;

pub use config::GameConfig;
pub use game::Game;
