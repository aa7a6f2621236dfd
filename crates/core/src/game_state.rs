//! Game state module - the per-game simulation
//!
//! `GameState` owns the field, the falling piece, the next and hold slots and
//! the piece generator, and runs the per-tick state machine:
//!
//! | Falling piece | Timer | Effect |
//! |---------------|-------|--------|
//! | none | - | spawn the queued next piece |
//! | active | > 0 after subtracting the tick delta | nothing |
//! | active, can fall | <= 0 | move down one row, reset timer |
//! | active, cannot fall | <= 0 | lock, clear rows, spawn next |
//!
//! At most one automatic step happens per tick: the timer is reset to a full
//! fall period as soon as it expires, whatever the delta was.
//!
//! Invalid operations (blocked moves, a second hold before a lock, commands
//! after game over) are no-ops. Every observable change is queued as a
//! [`GameEvent`]; the owner drains the queue after each operation.

use std::fmt;

use tracing::{debug, info, warn};

use crate::events::GameEvent;
use crate::falling::FallingPiece;
use crate::field::Field;
use crate::rng::{PieceSource, RandomBagGenerator};
use crate::snapshot::GameSnapshot;
use crate::types::{Command, PieceKind, Rotation, MS_PER_SECOND};

/// Result of one [`GameState::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// The field changed during this tick (a snapshot was queued)
    pub dirty: bool,
    /// The game ended during this tick
    pub game_over: bool,
    /// Rows removed by a lock during this tick
    pub cleared_rows: usize,
}

pub struct GameState {
    field: Field,
    falling: FallingPiece,
    next_piece: PieceKind,
    hold_piece: Option<PieceKind>,
    /// Set by a hold, cleared by the next lock or spawn from an empty slot
    hold_lock: bool,
    over: bool,
    /// Automatic fall rate in cells per second
    fall_speed: f64,
    source: Box<dyn PieceSource>,
    events: Vec<GameEvent>,
    lines_cleared: u64,
    pieces_locked: u64,
    ticks: u64,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("field", &self.field)
            .field("falling", &self.falling)
            .field("next_piece", &self.next_piece)
            .field("hold_piece", &self.hold_piece)
            .field("hold_lock", &self.hold_lock)
            .field("over", &self.over)
            .field("fall_speed", &self.fall_speed)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Empty `width` x `height` field fed by a seeded 7-bag generator
    pub fn new(width: usize, height: usize, fall_speed: f64, seed: u32) -> Self {
        Self::with_source(
            Field::new(width, height),
            fall_speed,
            Box::new(RandomBagGenerator::new(seed)),
        )
    }

    /// Start from an existing field and piece source
    ///
    /// The next slot is filled immediately; no piece is falling until the
    /// first [`update`](Self::update).
    pub fn with_source(field: Field, fall_speed: f64, mut source: Box<dyn PieceSource>) -> Self {
        let next_piece = source.next_piece();
        Self {
            field,
            falling: FallingPiece::default(),
            next_piece,
            hold_piece: None,
            hold_lock: false,
            over: false,
            fall_speed,
            source,
            events: Vec::new(),
            lines_cleared: 0,
            pieces_locked: 0,
            ticks: 0,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn falling_piece(&self) -> &FallingPiece {
        &self.falling
    }

    pub fn next_piece(&self) -> PieceKind {
        self.next_piece
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold_piece
    }

    pub fn hold_locked(&self) -> bool {
        self.hold_lock
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Total rows cleared since the game began
    pub fn lines_cleared(&self) -> u64 {
        self.lines_cleared
    }

    pub fn pieces_locked(&self) -> u64 {
        self.pieces_locked
    }

    /// Updates that ran (updates after game over are not counted)
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Events queued since the last drain, oldest first
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            field: self.field.snapshot(),
            falling_piece: self.falling.snapshot(),
            next_piece: self.next_piece,
            hold_piece: self.hold_piece,
            hold_locked: self.hold_lock,
            over: self.over,
            lines_cleared: self.lines_cleared,
            pieces_locked: self.pieces_locked,
        }
    }

    fn publish_falling_piece(&mut self) {
        self.events.push(GameEvent::FallingPieceUpdate {
            falling_piece: self.falling.snapshot(),
            piece_display: self.falling.display(),
        });
    }

    /// Whether the falling piece would fit after the given deltas
    pub fn can_move(&self, dr: i32, dx: i32, dy: i32) -> bool {
        self.falling.fits(&self.field, dr, dx, dy)
    }

    /// Apply the deltas if the result fits; returns whether the piece moved
    pub fn move_piece(&mut self, dr: i32, dx: i32, dy: i32) -> bool {
        if !self.can_move(dr, dx, dy) {
            return false;
        }

        self.falling.rotation = self.falling.rotation.offset(dr);
        self.falling.x += dx;
        self.falling.y += dy;
        self.publish_falling_piece();
        true
    }

    /// Milliseconds per automatic step at the configured fall speed
    pub fn fall_timer(&self) -> i32 {
        (MS_PER_SECOND / self.fall_speed) as i32
    }

    fn reset_falling_piece(&mut self) {
        self.falling.x = self.field.center_x();
        self.falling.y = 0;
        self.falling.rotation = Rotation::North;
        self.falling.fall_timer = self.fall_timer();
        self.publish_falling_piece();
    }

    /// Make `kind` the falling piece at the spawn position
    ///
    /// Overlap at the spawn position is not checked here; game over detection
    /// after a lock handles it.
    pub fn spawn(&mut self, kind: PieceKind) {
        self.falling.piece = Some(kind);
        self.reset_falling_piece();
    }

    /// Spawn the queued next piece and refill the next slot from the generator
    pub fn advance_next(&mut self) {
        let kind = self.next_piece;
        self.spawn(kind);
        self.next_piece = self.source.next_piece();
        self.events.push(GameEvent::NextPieceUpdate {
            piece: self.next_piece,
        });
    }

    /// Write the falling piece into the field, clear full rows and spawn the
    /// next piece; returns the number of rows cleared
    fn lock(&mut self) -> usize {
        if let Some(kind) = self.falling.piece {
            let (rotation, x, y) = (self.falling.rotation, self.falling.x, self.falling.y);
            if !self.field.put_piece(kind, rotation, x, y) {
                warn!(piece = kind.as_str(), x, y, "locked piece overlaps the field");
            }
            self.pieces_locked += 1;
        }

        let cleared = self.field.clear_full_rows();
        if cleared > 0 {
            self.lines_cleared += cleared as u64;
            debug!(cleared, total = self.lines_cleared, "rows cleared");
        }

        self.advance_next();
        self.hold_lock = false;
        cleared
    }

    /// Advance the falling piece by `delta` ms; returns (rows cleared, game over)
    fn update_falling(&mut self, delta: i32) -> (usize, bool) {
        if !self.falling.is_active() {
            self.advance_next();
            self.hold_lock = false;
            return (0, false);
        }

        self.falling.fall_timer = self.falling.fall_timer.saturating_sub(delta);
        if self.falling.fall_timer > 0 {
            return (0, false);
        }

        self.falling.fall_timer = self.fall_timer();
        if self.move_piece(0, 0, 1) {
            return (0, false);
        }

        let cleared = self.lock();
        let boxed_in =
            !self.can_move(0, 0, 1) && !self.can_move(0, 1, 0) && !self.can_move(0, -1, 0);
        (cleared, boxed_in)
    }

    /// Run one tick of `delta_ms` milliseconds
    ///
    /// No-op once the game is over. Queues a field snapshot when the field
    /// changed and a game over event the tick the game ends.
    pub fn update(&mut self, delta_ms: u32) -> TickOutcome {
        if self.over {
            return TickOutcome::default();
        }

        self.ticks += 1;
        let delta = i32::try_from(delta_ms).unwrap_or(i32::MAX);
        let (cleared_rows, game_over) = self.update_falling(delta);

        let dirty = self.field.is_dirty();
        if dirty {
            self.events.push(GameEvent::FieldUpdate {
                field: self.field.snapshot(),
            });
            self.field.clear_dirty();
        }

        if game_over {
            info!(
                lines = self.lines_cleared,
                pieces = self.pieces_locked,
                "game over"
            );
            self.events.push(GameEvent::GameOver);
        }
        self.over = game_over;

        TickOutcome {
            dirty,
            game_over,
            cleared_rows,
        }
    }

    /// Put the falling piece aside, or swap it with the held one
    ///
    /// Allowed once between locks. Swapping back a held piece does not draw
    /// from the generator; holding into an empty slot does.
    pub fn hold(&mut self) -> bool {
        let Some(current) = self.falling.piece else {
            return false;
        };
        if self.hold_lock {
            return false;
        }

        self.hold_lock = true;

        match self.hold_piece.replace(current) {
            Some(held) => {
                self.falling.piece = Some(held);
                self.reset_falling_piece();
            }
            None => self.advance_next(),
        }

        self.events.push(GameEvent::HoldPieceUpdate {
            piece: self.hold_piece,
        });
        true
    }

    /// Drop the falling piece to its lowest legal row and expire its timer
    ///
    /// Only positions the piece; the next tick performs the lock.
    pub fn hard_lock(&mut self) -> bool {
        if !self.falling.is_active() {
            return false;
        }

        let height = self.field.height() as i32;
        let mut dy = 0;
        while dy < height && self.can_move(0, 0, dy) {
            dy += 1;
        }

        self.falling.y += (dy - 1).max(0);
        self.falling.fall_timer = 0;
        self.publish_falling_piece();
        true
    }

    /// Apply a command; returns whether the game state changed
    pub fn apply(&mut self, command: Command) -> bool {
        if self.over {
            return false;
        }

        match command {
            Command::MoveLeft => self.move_piece(0, -1, 0),
            Command::MoveRight => self.move_piece(0, 1, 0),
            Command::SoftDrop => self.move_piece(0, 0, 1),
            Command::RotateCw => self.move_piece(1, 0, 0),
            Command::RotateCcw => self.move_piece(-1, 0, 0),
            Command::HardLock => self.hard_lock(),
            Command::Hold => self.hold(),
        }
    }

    /// Apply a command token; returns whether the token was understood
    pub fn command(&mut self, token: &str) -> bool {
        match Command::from_token(token) {
            Some(command) => {
                self.apply(command);
                true
            }
            None => false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        use crate::types::{DEFAULT_FALL_SPEED, DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH};

        Self::new(DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT, DEFAULT_FALL_SPEED, 1)
    }
}
