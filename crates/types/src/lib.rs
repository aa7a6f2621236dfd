//! Shared data types and constants for the bloccs simulation.
//!
//! Everything here is plain data. The simulation (`bloccs-core`), the runtime
//! (`bloccs-game`) and any transport layer agree on these definitions.
//!
//! # Field dimensions
//!
//! - **Width**: 10 columns by default (indexed from the left)
//! - **Height**: 20 rows by default (indexed from the top, row 0 is the spawn row)
//!
//! # Timing
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 10 | Fixed tick period (100 Hz) |
//! | `DEFAULT_FALL_SPEED` | 1.0 | Automatic fall rate in cells per second |
//! | `MS_PER_SECOND` | 1000 | Used to turn a fall speed into a fall timer |
//!
//! # Commands
//!
//! | Token | Command |
//! |-------|---------|
//! | `L` | move left |
//! | `R` | move right |
//! | `D` | soft drop one row |
//! | `P` | hard lock ("punch") |
//! | `X` | hold |
//! | `C` | rotate clockwise |
//! | `A` | rotate counter-clockwise |
//!
//! # Examples
//!
//! ```
//! use bloccs_types::{Command, PieceKind, Rotation};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(Rotation::North.offset(-1), Rotation::West);
//! assert_eq!(Command::from_token("X"), Some(Command::Hold));
//! assert_eq!(Command::from_token("?"), None);
//! ```

use serde::{Deserialize, Serialize};

/// Default field width in cells
pub const DEFAULT_FIELD_WIDTH: usize = 10;

/// Default field height in cells
pub const DEFAULT_FIELD_HEIGHT: usize = 20;

/// Fixed tick period in milliseconds (100 Hz)
pub const TICK_MS: u64 = 10;

/// Default automatic fall rate (cells per second)
pub const DEFAULT_FALL_SPEED: f64 = 1.0;

/// Milliseconds in a second
pub const MS_PER_SECOND: f64 = 1000.0;

/// Edge length of the square box every piece shape fits in
pub const PIECE_BOX: usize = 4;

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds, in the order a fresh bag is filled before shuffling
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use bloccs_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Non-zero cell code used in field and piece bitmaps (0 means empty)
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }
}

/// Rotation state of a piece
///
/// The cycle goes North → East → South → West → North. North is the spawn
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    const CYCLE: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    /// Rotate clockwise (90°)
    pub fn rotate_cw(&self) -> Self {
        self.offset(1)
    }

    /// Rotate counter-clockwise (-90°)
    pub fn rotate_ccw(&self) -> Self {
        self.offset(-1)
    }

    /// Apply a signed number of clockwise quarter turns
    ///
    /// # Examples
    ///
    /// ```
    /// use bloccs_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.offset(0), Rotation::North);
    /// assert_eq!(Rotation::North.offset(2), Rotation::South);
    /// assert_eq!(Rotation::East.offset(-2), Rotation::West);
    /// assert_eq!(Rotation::West.offset(5), Rotation::North);
    /// ```
    pub fn offset(&self, quarter_turns: i32) -> Self {
        let idx = (self.index() as i32 + quarter_turns).rem_euclid(4);
        Self::CYCLE[idx as usize]
    }

    /// Position in the clockwise cycle, North = 0
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }
}

/// Discrete commands accepted by a running game
///
/// Commands arrive as single-character tokens; how they are produced
/// (keyboard, network, replay) is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Move the falling piece one column left
    MoveLeft,
    /// Move the falling piece one column right
    MoveRight,
    /// Move the falling piece one row down
    SoftDrop,
    /// Drop the falling piece to its lowest legal row; it locks on the next tick
    HardLock,
    /// Swap the falling piece with the hold slot
    Hold,
    /// Rotate the falling piece 90° clockwise
    RotateCw,
    /// Rotate the falling piece 90° counter-clockwise
    RotateCcw,
}

impl Command {
    /// Parse a command token (case-sensitive, exactly one character)
    ///
    /// # Examples
    ///
    /// ```
    /// use bloccs_types::Command;
    ///
    /// assert_eq!(Command::from_token("L"), Some(Command::MoveLeft));
    /// assert_eq!(Command::from_token("P"), Some(Command::HardLock));
    /// assert_eq!(Command::from_token("l"), None);
    /// assert_eq!(Command::from_token("LR"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "L" => Some(Command::MoveLeft),
            "R" => Some(Command::MoveRight),
            "D" => Some(Command::SoftDrop),
            "P" => Some(Command::HardLock),
            "X" => Some(Command::Hold),
            "C" => Some(Command::RotateCw),
            "A" => Some(Command::RotateCcw),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Command::MoveLeft => "L",
            Command::MoveRight => "R",
            Command::SoftDrop => "D",
            Command::HardLock => "P",
            Command::Hold => "X",
            Command::RotateCw => "C",
            Command::RotateCcw => "A",
        }
    }
}

/// A cell of the field
///
/// - `None`: empty
/// - `Some(PieceKind)`: occupied by a locked mino of that kind
pub type Cell = Option<PieceKind>;
