//! Position evaluation: payoff table and board heuristic

pub mod heuristic;
pub mod patterns;

pub use heuristic::{center_bonus, evaluate, open_end, stone_score};
pub use patterns::{line_score, PatternScore};
