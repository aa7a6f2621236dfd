//! RNG module - random bag piece generation
//!
//! Each bag holds one of each of the seven kinds, shuffled. Pieces are drawn
//! from the bag until it is empty, then a new bag is shuffled. Every kind
//! therefore appears exactly once per seven draws (aligned to bag boundaries),
//! and the longest possible gap between two pieces of the same kind is 12.
//!
//! Shuffling uses a small seeded LCG so a game can be replayed from its seed.

use crate::types::PieceKind;

/// Infinite, non-blocking supply of pieces
pub trait PieceSource: Send {
    fn next_piece(&mut self) -> PieceKind;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would stay at the increment forever; nudge it.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in `[0, max)`
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct RandomBagGenerator {
    bag: [PieceKind; 7],
    /// Index of the next piece to draw; 7 means the bag is spent
    bag_index: usize,
    rng: SimpleRng,
}

impl RandomBagGenerator {
    pub fn new(seed: u32) -> Self {
        let mut generator = Self {
            bag: PieceKind::ALL,
            bag_index: 0,
            rng: SimpleRng::new(seed),
        };
        generator.refill_bag();
        generator
    }

    fn refill_bag(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.bag_index = 0;
    }

    /// The piece the next draw will return
    pub fn peek(&self) -> PieceKind {
        if self.bag_index < self.bag.len() {
            return self.bag[self.bag_index];
        }
        let mut preview = self.clone();
        preview.refill_bag();
        preview.bag[0]
    }

    /// Pieces left in the current bag
    pub fn remaining(&self) -> &[PieceKind] {
        &self.bag[self.bag_index..]
    }

    pub fn draw(&mut self) -> PieceKind {
        if self.bag_index >= self.bag.len() {
            self.refill_bag();
        }
        let piece = self.bag[self.bag_index];
        self.bag_index += 1;
        piece
    }
}

impl PieceSource for RandomBagGenerator {
    fn next_piece(&mut self) -> PieceKind {
        self.draw()
    }
}

/// Repeats a fixed sequence of pieces forever
///
/// Useful for replays and for setting up exact scenarios.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequenceSource {
    /// # Panics
    ///
    /// Panics if `pieces` is empty.
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        assert!(!pieces.is_empty(), "sequence needs at least one piece");
        Self { pieces, index: 0 }
    }
}

impl PieceSource for SequenceSource {
    fn next_piece(&mut self) -> PieceKind {
        let piece = self.pieces[self.index];
        self.index = (self.index + 1) % self.pieces.len();
        piece
    }
}

impl Default for RandomBagGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}
