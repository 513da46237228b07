//! Heuristic evaluation function for omok board positions
//!
//! Every occupied cell contributes its line-shape score over the four axes
//! plus a centre-proximity bonus. Own stones count positively, opponent stones
//! negatively at 1.5x, so the search leans towards blocking over building.

use crate::board::{Board, Pos, Stone, CENTER, DIRECTIONS};
use crate::rules::count_connected;

use super::patterns::line_score;

/// True if the first cell past the run of `stone` from `pos` in (dr, dc) is an
/// empty intersection on the board.
#[inline]
pub fn open_end(board: &Board, pos: Pos, dr: i32, dc: i32, stone: Stone) -> bool {
    let (mut r, mut c) = (pos.row as i32, pos.col as i32);
    while board.in_bounds(r, c) && board.get(r, c) == stone {
        r += dr;
        c += dc;
    }
    board.in_bounds(r, c) && board.get(r, c).is_empty()
}

/// Line-shape score of the stone at `pos`, summed over the four axes.
pub fn stone_score(board: &Board, pos: Pos, stone: Stone) -> i32 {
    DIRECTIONS
        .iter()
        .map(|&(dr, dc)| {
            let run = count_connected(board, pos, dr, dc, stone);
            let open_ends = u8::from(open_end(board, pos, dr, dc, stone))
                + u8::from(open_end(board, pos, -dr, -dc, stone));
            line_score(run, open_ends)
        })
        .sum()
}

/// Closer to the middle is worth more: 14 at the centre, 0 in a corner.
#[inline]
pub fn center_bonus(pos: Pos) -> i32 {
    let c = CENTER as i32;
    (c - (c - pos.row as i32).abs()) + (c - (c - pos.col as i32).abs())
}

/// Evaluate the board from `ai`'s point of view.
#[must_use]
pub fn evaluate(board: &Board, ai: Stone) -> i32 {
    board
        .occupied()
        .map(|(pos, stone)| {
            let score = stone_score(board, pos, stone) + center_bonus(pos);
            if stone == ai {
                score
            } else {
                -(score * 3 / 2)
            }
        })
        .sum()
}
