//! Five-in-a-row detection, winning-line extraction and draw detection
//!
//! A win can only be created by the stone just played, so every check here is
//! local to that position. Off-board cells simply end a run.

use crate::board::{Board, Pos, Stone, DIRECTIONS};

/// Count consecutive `stone` cells starting one step from `pos` in (dr, dc).
#[inline]
pub fn count_one_direction(board: &Board, pos: Pos, dr: i32, dc: i32, stone: Stone) -> usize {
    let mut count = 0;
    let (mut r, mut c) = pos.offset(dr, dc, 1);
    while board.in_bounds(r, c) && board.get(r, c) == stone {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

/// Length of the run of `stone` through `pos` along the (dr, dc) axis.
///
/// `pos` itself is counted unconditionally.
#[inline]
pub fn count_connected(board: &Board, pos: Pos, dr: i32, dc: i32, stone: Stone) -> usize {
    1 + count_one_direction(board, pos, dr, dc, stone)
        + count_one_direction(board, pos, -dr, -dc, stone)
}

/// True iff the stone at `pos` is part of a run of five or more.
pub fn check_win(board: &Board, pos: Pos, stone: Stone) -> bool {
    if stone.is_empty() {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| count_connected(board, pos, dr, dc, stone) >= 5)
}

/// Coordinates of the winning run through `pos`, from its start to its end.
///
/// Axes are tried in [`DIRECTIONS`] order; the first one with a run of five or
/// more is returned in full (overlines included). Empty when there is no win.
pub fn winning_line(board: &Board, pos: Pos, stone: Stone) -> Vec<Pos> {
    if stone.is_empty() {
        return Vec::new();
    }

    for &(dr, dc) in &DIRECTIONS {
        if count_connected(board, pos, dr, dc, stone) < 5 {
            continue;
        }

        // Walk back to the start of the run
        let back = count_one_direction(board, pos, -dr, -dc, stone) as i32;
        let (sr, sc) = pos.offset(dr, dc, -back);

        let mut line = Vec::with_capacity(5);
        let (mut r, mut c) = (sr, sc);
        while let Some(p) = Pos::checked(r, c) {
            if board.stone_at(p) != stone {
                break;
            }
            line.push(p);
            r += dr;
            c += dc;
        }
        return line;
    }

    Vec::new()
}

/// True iff no empty intersection remains.
#[inline]
pub fn is_draw(board: &Board) -> bool {
    board.is_full()
}
