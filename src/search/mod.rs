//! Search module for the omok AI
//!
//! Contains:
//! - Candidate generation around existing stones
//! - Fixed-depth minimax with alpha-beta pruning

pub mod alphabeta;

pub use alphabeta::{candidate_moves, SearchResult, Searcher, DEFAULT_DEPTH, DEFAULT_RADIUS};
