//! Which side the restriction applies to, and move admission

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone};

use super::forbidden::{forbidden_kind, Forbidden};

/// Why a move was refused. The board and turn are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum MoveRejection {
    #[display("game is not in progress")]
    GameOver,
    #[display("not your turn")]
    NotYourTurn,
    #[display("intersection is occupied")]
    Occupied,
    #[display("forbidden move: {_0}")]
    Forbidden(Forbidden),
}

/// Rule variant: plain five-in-a-row, optionally with overline / double-four /
/// double-three restrictions for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub restricted: Option<Stone>,
}

impl RuleSet {
    /// Restrictions apply to Black, the side that moves first
    pub const RENJU: RuleSet = RuleSet {
        restricted: Some(Stone::Black),
    };

    /// No restrictions for either side
    pub const FREESTYLE: RuleSet = RuleSet { restricted: None };

    #[inline]
    pub fn is_restricted(&self, stone: Stone) -> bool {
        !stone.is_empty() && self.restricted == Some(stone)
    }

    /// Admission check run before a committed placement.
    pub fn check(&self, board: &mut Board, pos: Pos, stone: Stone) -> Result<(), MoveRejection> {
        if !board.is_empty(pos) {
            return Err(MoveRejection::Occupied);
        }
        if self.is_restricted(stone) {
            if let Some(kind) = forbidden_kind(board, pos, stone) {
                return Err(MoveRejection::Forbidden(kind));
            }
        }
        Ok(())
    }

    /// Convenience wrapper around [`RuleSet::check`]
    #[inline]
    pub fn is_valid_move(&self, board: &mut Board, pos: Pos, stone: Stone) -> bool {
        self.check(board, pos, stone).is_ok()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::RENJU
    }
}
