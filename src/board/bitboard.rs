//! Bitboard occupancy set for one stone color

use super::{Pos, TOTAL_CELLS};

const WORDS: usize = 4;

/// One bit per intersection, 4 x u64 covers the 225 cells (4 * 64 = 256 >= 225)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitboard {
    bits: [u64; WORDS],
}

impl Bitboard {
    /// Create empty bitboard
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    #[inline]
    fn split(pos: Pos) -> (usize, usize) {
        let idx = pos.to_index();
        (idx / 64, idx % 64)
    }

    /// Set a bit at position
    #[inline]
    pub fn set(&mut self, pos: Pos) {
        let (word, bit) = Self::split(pos);
        self.bits[word] |= 1u64 << bit;
    }

    /// Clear a bit at position
    #[inline]
    pub fn clear(&mut self, pos: Pos) {
        let (word, bit) = Self::split(pos);
        self.bits[word] &= !(1u64 << bit);
    }

    /// Check if bit is set at position
    #[inline]
    pub fn get(&self, pos: Pos) -> bool {
        let (word, bit) = Self::split(pos);
        (self.bits[word] >> bit) & 1 == 1
    }

    /// Count total set bits (popcount)
    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Cells set in either board
    #[inline]
    pub fn union(&self, other: &Bitboard) -> Bitboard {
        let mut bits = self.bits;
        for (word, o) in bits.iter_mut().zip(other.bits.iter()) {
            *word |= o;
        }
        Bitboard { bits }
    }

    /// Reset every bit
    #[inline]
    pub fn reset(&mut self) {
        self.bits = [0; WORDS];
    }

    /// Iterate over set bit positions in row-major order
    pub fn iter_ones(&self) -> BitboardIter {
        BitboardIter {
            bits: self.bits,
            word_idx: 0,
            current_word: self.bits[0],
        }
    }
}

/// Iterator over set bits in a Bitboard
pub struct BitboardIter {
    bits: [u64; WORDS],
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitboardIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_word == 0 {
            self.word_idx += 1;
            if self.word_idx >= WORDS {
                return None;
            }
            self.current_word = self.bits[self.word_idx];
        }

        let bit_pos = self.current_word.trailing_zeros() as usize;
        let idx = self.word_idx * 64 + bit_pos;

        // Clear lowest set bit
        self.current_word &= self.current_word - 1;

        // Bits past 225 are never set, but guard anyway
        if idx < TOTAL_CELLS {
            Some(Pos::from_index(idx))
        } else {
            None
        }
    }
}
