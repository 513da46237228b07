//! Board structure with a reversible scratch-placement stack

use std::fmt;
use std::ops::{Deref, DerefMut};

use super::bitboard::Bitboard;
use super::{Pos, Stone, BOARD_SIZE, TOTAL_CELLS};

/// Game board
///
/// Committed stones and scratch stones share the same bitboards. Scratch
/// placements are recorded on a stack so that search and rule lookahead can
/// try moves in place and undo them without copying the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
    /// Pending scratch placements: position and the value it replaced
    scratch: Vec<(Pos, Stone)>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
            scratch: Vec::with_capacity(16),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        BOARD_SIZE
    }

    #[inline]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        Pos::is_valid(row, col)
    }

    /// Get stone at signed coordinates. Off-board reads as Empty.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> Stone {
        match Pos::checked(row, col) {
            Some(pos) => self.stone_at(pos),
            None => Stone::Empty,
        }
    }

    /// Get stone at position
    #[inline]
    pub fn stone_at(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    #[inline]
    fn set(&mut self, pos: Pos, stone: Stone) {
        self.black.clear(pos);
        self.white.clear(pos);
        match stone {
            Stone::Black => self.black.set(pos),
            Stone::White => self.white.set(pos),
            Stone::Empty => {}
        }
    }

    /// Commit a stone. Fails without side effects if the cell is taken.
    pub fn try_place(&mut self, pos: Pos, stone: Stone) -> bool {
        if stone.is_empty() || !self.is_empty(pos) {
            return false;
        }
        self.set(pos, stone);
        true
    }

    /// Commit a stone at signed coordinates; off-board is a plain failure.
    pub fn try_place_at(&mut self, row: i32, col: i32, stone: Stone) -> bool {
        match Pos::checked(row, col) {
            Some(pos) => self.try_place(pos, stone),
            None => false,
        }
    }

    /// Speculatively place a stone.
    ///
    /// Returns `false` and leaves the stack untouched when the coordinates are
    /// off the board, the cell is occupied or `stone` is Empty. Only a `true`
    /// return must be paired with a later [`Board::pop_scratch`].
    pub fn push_scratch(&mut self, row: i32, col: i32, stone: Stone) -> bool {
        let Some(pos) = Pos::checked(row, col) else {
            return false;
        };
        if stone.is_empty() {
            return false;
        }
        let prev = self.stone_at(pos);
        if !prev.is_empty() {
            return false;
        }
        self.scratch.push((pos, prev));
        self.set(pos, stone);
        true
    }

    /// Undo the most recent scratch placement. No-op on an empty stack.
    pub fn pop_scratch(&mut self) {
        if let Some((pos, prev)) = self.scratch.pop() {
            self.set(pos, prev);
        }
    }

    /// Scratch-place a stone and get a guard that pops it when dropped.
    ///
    /// `None` when the placement was rejected (nothing to undo).
    pub fn scratch(&mut self, pos: Pos, stone: Stone) -> Option<Scratch<'_>> {
        if self.push_scratch(pos.row as i32, pos.col as i32, stone) {
            Some(Scratch { board: self })
        } else {
            None
        }
    }

    /// Number of pending scratch placements
    #[inline]
    pub fn scratch_depth(&self) -> usize {
        self.scratch.len()
    }

    /// Reset every cell to Empty and drop any pending scratch placements
    pub fn clear(&mut self) {
        self.black.reset();
        self.white.reset();
        self.scratch.clear();
    }

    /// Get bitboard for a color (returns None for Empty)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Option<&Bitboard> {
        match stone {
            Stone::Black => Some(&self.black),
            Stone::White => Some(&self.white),
            Stone::Empty => None,
        }
    }

    /// Occupied cells with their stone, in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (Pos, Stone)> + '_ {
        self.black
            .union(&self.white)
            .iter_ones()
            .map(move |pos| (pos, self.stone_at(pos)))
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() as usize == TOTAL_CELLS
    }
}

/// A live scratch placement; dropping it restores the board.
pub struct Scratch<'a> {
    board: &'a mut Board,
}

impl Deref for Scratch<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        self.board.pop_scratch();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE {
            write!(f, "{:>2}", col)?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE {
            write!(f, "{:>2} ", row)?;
            for col in 0..BOARD_SIZE {
                let stone = self.stone_at(Pos::new(row as u8, col as u8));
                write!(f, " {}", stone.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
