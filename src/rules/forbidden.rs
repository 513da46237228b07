//! Renju-style forbidden moves: overline, double-four and double-three
//!
//! Detection is table driven. For each axis through the candidate point the
//! board is projected onto an 11-cell string (radius 5) using three symbols:
//!
//! - `O` the mover's stone
//! - `X` an opponent stone or a cell off the board
//! - `.` an empty cell
//!
//! An axis has an open four (resp. open three) when its projection contains
//! one of the shapes in [`OPEN_FOUR_PATTERNS`] (resp. [`OPEN_THREE_PATTERNS`]).
//! An axis that already shows an open four is never counted as a three.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone, DIRECTIONS};

use super::win::count_connected;

/// Projection radius on each side of the candidate point
const RADIUS: i32 = 5;
const LINE_LEN: usize = (2 * RADIUS + 1) as usize;

/// Straight four and the three split fours
pub const OPEN_FOUR_PATTERNS: [&[u8]; 4] = [b".OOOO.", b".OOO.O.", b".OO.OO.", b".O.OOO."];

/// Straight threes with extension room and the one-gap / two-gap splits
pub const OPEN_THREE_PATTERNS: [&[u8]; 7] = [
    b"..OOO..",
    b".OOO..",
    b"..OOO.",
    b".OO.O.",
    b".O.OO.",
    b".OO..O.",
    b".O..OO.",
];

/// Why a move is forbidden for the restricted side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Forbidden {
    /// Six or more in a row
    #[display("overline")]
    Overline,
    /// Two or more open fours at once
    #[display("double four")]
    DoubleFour,
    /// Two or more open threes at once
    #[display("double three")]
    DoubleThree,
}

/// Project the axis (dr, dc) through `pos` onto `O` / `X` / `.` symbols.
pub fn line_projection(board: &Board, pos: Pos, dr: i32, dc: i32, me: Stone) -> [u8; LINE_LEN] {
    let mut buf = [b'X'; LINE_LEN];
    for (slot, k) in buf.iter_mut().zip(-RADIUS..=RADIUS) {
        let (r, c) = pos.offset(dr, dc, k);
        if !board.in_bounds(r, c) {
            continue;
        }
        let cell = board.get(r, c);
        *slot = if cell.is_empty() {
            b'.'
        } else if cell == me {
            b'O'
        } else {
            b'X'
        };
    }
    buf
}

#[inline]
fn contains(line: &[u8], pattern: &[u8]) -> bool {
    line.windows(pattern.len()).any(|w| w == pattern)
}

#[inline]
fn matches_any(line: &[u8], patterns: &[&[u8]]) -> bool {
    patterns.iter().any(|p| contains(line, p))
}

/// True if any axis through `pos` holds six or more of `stone` in a row.
pub fn is_overline(board: &Board, pos: Pos, stone: Stone) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| count_connected(board, pos, dr, dc, stone) >= 6)
}

/// Number of axes through `pos` that show an open four for `me`.
///
/// Reads the board as it is: the stone at `pos` must already be placed.
pub fn count_open_fours(board: &Board, pos: Pos, me: Stone) -> u8 {
    DIRECTIONS
        .iter()
        .filter(|&&(dr, dc)| {
            let line = line_projection(board, pos, dr, dc, me);
            matches_any(&line, &OPEN_FOUR_PATTERNS)
        })
        .count() as u8
}

/// Number of axes through `pos` that show an open three (and no open four).
pub fn count_open_threes(board: &Board, pos: Pos, me: Stone) -> u8 {
    DIRECTIONS
        .iter()
        .filter(|&&(dr, dc)| {
            let line = line_projection(board, pos, dr, dc, me);
            !matches_any(&line, &OPEN_FOUR_PATTERNS) && matches_any(&line, &OPEN_THREE_PATTERNS)
        })
        .count() as u8
}

/// Classify playing `stone` at `pos`.
///
/// The stone is placed on the scratch stack for the duration of the check and
/// is always taken back. Occupied or off-board targets return `None`; whether
/// the cell is free is the placement's concern, not this rule's.
pub fn forbidden_kind(board: &mut Board, pos: Pos, stone: Stone) -> Option<Forbidden> {
    let placed = board.scratch(pos, stone)?;

    if is_overline(&placed, pos, stone) {
        return Some(Forbidden::Overline);
    }
    if count_open_fours(&placed, pos, stone) >= 2 {
        return Some(Forbidden::DoubleFour);
    }
    if count_open_threes(&placed, pos, stone) >= 2 {
        return Some(Forbidden::DoubleThree);
    }
    None
}

/// True if playing `stone` at `pos` is an overline, double-four or double-three.
#[inline]
pub fn is_forbidden_move(board: &mut Board, pos: Pos, stone: Stone) -> bool {
    forbidden_kind(board, pos, stone).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::check_win;

    fn board_with(black: &[(u8, u8)], white: &[(u8, u8)]) -> Board {
        let mut board = Board::new();
        for &(r, c) in black {
            assert!(board.try_place(Pos::new(r, c), Stone::Black));
        }
        for &(r, c) in white {
            assert!(board.try_place(Pos::new(r, c), Stone::White));
        }
        board
    }

    #[test]
    fn test_projection_symbols() {
        let board = board_with(&[(0, 1)], &[(0, 3)]);
        let line = line_projection(&board, Pos::new(0, 1), 0, 1, Stone::Black);
        // cols -4..=6
        assert_eq!(&line, b"XXXX.O.X...");
        // Same line from White's point of view
        let line = line_projection(&board, Pos::new(0, 1), 0, 1, Stone::White);
        assert_eq!(&line, b"XXXX.X.O...");
    }

    #[test]
    fn test_open_four_scenario() {
        let board = board_with(&[(7, 4), (7, 5), (7, 6), (7, 7)], &[]);
        assert_eq!(count_open_fours(&board, Pos::new(7, 7), Stone::Black), 1);
    }

    #[test]
    fn test_split_four_counts() {
        // . O O . O O . on row 3
        let board = board_with(&[(3, 4), (3, 5), (3, 7), (3, 8)], &[]);
        assert_eq!(count_open_fours(&board, Pos::new(3, 5), Stone::Black), 1);
    }

    #[test]
    fn test_blocked_four_is_not_open() {
        let board = board_with(&[(7, 4), (7, 5), (7, 6), (7, 7)], &[(7, 8)]);
        assert_eq!(count_open_fours(&board, Pos::new(7, 7), Stone::Black), 0);
    }

    #[test]
    fn test_empty_board_not_forbidden() {
        let mut board = Board::new();
        assert_eq!(forbidden_kind(&mut board, Pos::center(), Stone::Black), None);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_double_three_cross() {
        let mut board = board_with(&[(7, 6), (7, 8), (6, 7), (8, 7)], &[]);
        let before = board.clone();
        assert_eq!(
            forbidden_kind(&mut board, Pos::new(7, 7), Stone::Black),
            Some(Forbidden::DoubleThree)
        );
        assert_eq!(board, before, "scratch stone must be taken back");
    }

    #[test]
    fn test_double_three_diagonals() {
        let mut board = board_with(&[(6, 6), (8, 8), (6, 8), (8, 6)], &[]);
        assert!(is_forbidden_move(&mut board, Pos::new(7, 7), Stone::Black));
    }

    #[test]
    fn test_double_three_split_shapes() {
        let mut board = board_with(&[(7, 5), (7, 6), (5, 8), (6, 8)], &[]);
        // Horizontal through (7,8): . O O . O .  (cols 4..9)
        // Vertical through (7,8):   . O O O .    (rows 4..8)
        assert_eq!(
            forbidden_kind(&mut board, Pos::new(7, 8), Stone::Black),
            Some(Forbidden::DoubleThree)
        );
    }

    #[test]
    fn test_single_open_three_allowed() {
        let mut board = board_with(&[(7, 6), (7, 8)], &[]);
        assert!(!is_forbidden_move(&mut board, Pos::new(7, 7), Stone::Black));
        board.try_place(Pos::new(7, 7), Stone::Black);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7), Stone::Black), 1);
    }

    #[test]
    fn test_blocked_three_not_counted() {
        // Horizontal three blocked by White on the left; vertical three open
        let mut board = board_with(&[(7, 6), (7, 8), (6, 7), (8, 7)], &[(7, 5)]);
        assert!(!is_forbidden_move(&mut board, Pos::new(7, 7), Stone::Black));
    }

    #[test]
    fn test_double_four() {
        let mut board = board_with(&[(7, 4), (7, 5), (7, 6), (4, 7), (5, 7), (6, 7)], &[]);
        assert_eq!(
            forbidden_kind(&mut board, Pos::new(7, 7), Stone::Black),
            Some(Forbidden::DoubleFour)
        );
    }

    #[test]
    fn test_four_three_is_allowed() {
        // Horizontal open four plus vertical open three: the four's axis is
        // not counted again as a three.
        let mut board = board_with(&[(7, 4), (7, 5), (7, 6), (5, 7), (6, 7)], &[]);
        assert!(!is_forbidden_move(&mut board, Pos::new(7, 7), Stone::Black));

        board.try_place(Pos::new(7, 7), Stone::Black);
        assert_eq!(count_open_fours(&board, Pos::new(7, 7), Stone::Black), 1);
        assert_eq!(count_open_threes(&board, Pos::new(7, 7), Stone::Black), 1);
    }

    #[test]
    fn test_overline_forbidden_even_though_it_wins() {
        let mut board = board_with(&[(7, 2), (7, 3), (7, 4), (7, 6), (7, 7)], &[]);
        let pos = Pos::new(7, 5);
        assert_eq!(
            forbidden_kind(&mut board, pos, Stone::Black),
            Some(Forbidden::Overline)
        );

        // Committing it anyway would register as a win
        board.try_place(pos, Stone::Black);
        assert!(check_win(&board, pos, Stone::Black));
        assert!(is_overline(&board, pos, Stone::Black));
    }

    #[test]
    fn test_exact_five_is_not_overline() {
        let mut board = board_with(&[(7, 3), (7, 4), (7, 6), (7, 7)], &[]);
        assert_eq!(forbidden_kind(&mut board, Pos::new(7, 5), Stone::Black), None);
    }

    #[test]
    fn test_occupied_target_is_not_classified() {
        let mut board = board_with(&[(7, 6), (7, 8), (6, 7), (8, 7)], &[(7, 7)]);
        let before = board.clone();
        assert_eq!(forbidden_kind(&mut board, Pos::new(7, 7), Stone::Black), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_pending_scratch_survives_check() {
        let mut board = board_with(&[(7, 6), (7, 8), (6, 7)], &[]);
        assert!(board.push_scratch(8, 7, Stone::Black));
        assert!(is_forbidden_move(&mut board, Pos::new(7, 7), Stone::Black));
        assert_eq!(board.scratch_depth(), 1);
        board.pop_scratch();
        assert_eq!(board.get(8, 7), Stone::Empty);
    }
}
