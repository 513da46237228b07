//! Game rules for omok
//!
//! This module implements the rule set:
//! - Win conditions (five or more in a row through the last move)
//! - Forbidden moves for the restricted side (overline, double-four, double-three)
//! - Draw on a full board
//!
//! Every function here is total. Off-board coordinates read as blocking,
//! never as a fault.

pub mod forbidden;
pub mod ruleset;
pub mod win;

// Re-exports for convenient access
pub use forbidden::{
    count_open_fours, count_open_threes, forbidden_kind, is_forbidden_move, is_overline,
    line_projection, Forbidden,
};
pub use ruleset::{MoveRejection, RuleSet};
pub use win::{check_win, count_connected, count_one_direction, is_draw, winning_line};
