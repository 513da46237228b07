//! Minimax search with alpha-beta pruning
//!
//! The search works directly on the caller's board through the scratch stack:
//! every speculative stone is pushed before recursing and popped right after,
//! so the board is returned exactly as it was received and no copies are made.
//!
//! # Example
//!
//! ```
//! use omok::board::{Board, Pos, Stone};
//! use omok::search::Searcher;
//!
//! let mut board = Board::new();
//! board.try_place(Pos::new(7, 7), Stone::Black);
//!
//! let searcher = Searcher::new(2);
//! let result = searcher.find_best_move(&mut board, Stone::White);
//! assert!(board.is_empty(result.best_move));
//! ```

use std::cell::Cell;

use tracing::{debug, instrument};

use crate::board::{Board, Pos, Stone, BOARD_SIZE};
use crate::eval::evaluate;
use crate::rules::{forbidden_kind, RuleSet};

/// Default lookahead below the root move
pub const DEFAULT_DEPTH: u8 = 3;

/// Default Chebyshev distance from existing stones for candidate moves
pub const DEFAULT_RADIUS: u8 = 1;

/// Search result containing the chosen move and associated statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Move to play (the centre when nothing else is available)
    pub best_move: Pos,
    /// Minimax score of `best_move`
    pub score: i32,
    /// Nodes visited, root children included
    pub nodes: u64,
}

/// Empty cells within `radius` of any stone, in discovery order.
///
/// Occupied cells are visited row-major; around each one the neighbourhood is
/// scanned row offset first, then column offset. An empty board yields only
/// the centre.
pub fn candidate_moves(board: &Board, radius: u8) -> Vec<Pos> {
    let r = radius as i32;
    let mut seen = [false; BOARD_SIZE * BOARD_SIZE];
    let mut moves = Vec::new();

    for (pos, _) in board.occupied() {
        for dr in -r..=r {
            for dc in -r..=r {
                let Some(next) = Pos::checked(pos.row as i32 + dr, pos.col as i32 + dc) else {
                    continue;
                };
                let idx = next.to_index();
                if board.is_empty(next) && !seen[idx] {
                    seen[idx] = true;
                    moves.push(next);
                }
            }
        }
    }

    if moves.is_empty() && board.is_board_empty() {
        moves.push(Pos::center());
    }
    moves
}

/// Alpha-beta searcher. Stateless between calls apart from configuration.
#[derive(Debug, Clone)]
pub struct Searcher {
    depth: u8,
    radius: u8,
    rules: RuleSet,
    nodes: Cell<u64>,
}

impl Searcher {
    /// Searcher with the given depth, default radius and Renju restrictions.
    pub fn new(depth: u8) -> Self {
        Self::with_config(depth, DEFAULT_RADIUS, RuleSet::default())
    }

    pub fn with_config(depth: u8, radius: u8, rules: RuleSet) -> Self {
        Self {
            depth,
            radius: radius.max(1),
            rules,
            nodes: Cell::new(0),
        }
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    #[inline]
    pub fn radius(&self) -> u8 {
        self.radius
    }

    #[inline]
    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    /// Root candidates for `ai`. Forbidden points are skipped when `ai` is the
    /// restricted side, unless that would leave nothing to play.
    fn root_candidates(&self, board: &mut Board, ai: Stone) -> Vec<Pos> {
        let all = candidate_moves(board, self.radius);
        if !self.rules.is_restricted(ai) {
            return all;
        }
        let legal: Vec<Pos> = all
            .iter()
            .copied()
            .filter(|&pos| forbidden_kind(board, pos, ai).is_none())
            .collect();
        if legal.is_empty() {
            all
        } else {
            legal
        }
    }

    /// Pick the move for `ai`.
    ///
    /// Each root candidate is scratch-placed and scored by a minimizing
    /// search of `depth` plies. The strictly best score wins; ties keep the
    /// first candidate seen. The board is left exactly as given.
    #[instrument(skip(self, board), fields(depth = self.depth, stones = board.stone_count()))]
    pub fn find_best_move(&self, board: &mut Board, ai: Stone) -> SearchResult {
        self.nodes.set(0);
        let mut best_move = Pos::center();
        let mut best_score = i32::MIN;

        for pos in self.root_candidates(board, ai) {
            let Some(mut placed) = board.scratch(pos, ai) else {
                continue;
            };
            self.bump();
            let score = self.minimax(&mut placed, self.depth, false, ai, i32::MIN, i32::MAX);
            drop(placed);

            if score > best_score {
                best_score = score;
                best_move = pos;
            }
        }

        if best_score == i32::MIN {
            best_score = evaluate(board, ai);
        }

        let nodes = self.nodes.get();
        debug!(best = %best_move, score = best_score, nodes, "search finished");
        SearchResult {
            best_move,
            score: best_score,
            nodes,
        }
    }

    /// Alpha-beta minimax below a root move.
    ///
    /// `maximizing` is true when `ai` is to move. Leaves (depth 0) and
    /// positions without candidates are scored by [`evaluate`].
    pub fn minimax(
        &self,
        board: &mut Board,
        depth: u8,
        maximizing: bool,
        ai: Stone,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        if depth == 0 {
            return evaluate(board, ai);
        }

        let candidates = candidate_moves(board, self.radius);
        if candidates.is_empty() {
            return evaluate(board, ai);
        }

        let mover = if maximizing { ai } else { ai.opponent() };

        if maximizing {
            let mut best = i32::MIN;
            for pos in candidates {
                let Some(mut placed) = board.scratch(pos, mover) else {
                    continue;
                };
                self.bump();
                let score = self.minimax(&mut placed, depth - 1, false, ai, alpha, beta);
                drop(placed);

                best = best.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = i32::MAX;
            for pos in candidates {
                let Some(mut placed) = board.scratch(pos, mover) else {
                    continue;
                };
                self.bump();
                let score = self.minimax(&mut placed, depth - 1, true, ai, alpha, beta);
                drop(placed);

                best = best.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    #[inline]
    fn bump(&self) {
        self.nodes.set(self.nodes.get() + 1);
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference search with no pruning at all.
    fn full_minimax(board: &mut Board, depth: u8, maximizing: bool, ai: Stone, radius: u8) -> i32 {
        if depth == 0 {
            return evaluate(board, ai);
        }
        let candidates = candidate_moves(board, radius);
        if candidates.is_empty() {
            return evaluate(board, ai);
        }
        let mover = if maximizing { ai } else { ai.opponent() };
        let scores = candidates.into_iter().filter_map(|pos| {
            let mut placed = board.scratch(pos, mover)?;
            Some(full_minimax(&mut placed, depth - 1, !maximizing, ai, radius))
        });
        let scores: Vec<i32> = scores.collect();
        if maximizing {
            scores.into_iter().max().unwrap_or(i32::MIN)
        } else {
            scores.into_iter().min().unwrap_or(i32::MAX)
        }
    }

    fn full_best_move(board: &mut Board, ai: Stone, depth: u8, radius: u8) -> (Pos, i32) {
        let mut best = (Pos::center(), i32::MIN);
        for pos in candidate_moves(board, radius) {
            let Some(mut placed) = board.scratch(pos, ai) else {
                continue;
            };
            let score = full_minimax(&mut placed, depth, false, ai, radius);
            drop(placed);
            if score > best.1 {
                best = (pos, score);
            }
        }
        best
    }

    fn board_with(black: &[(u8, u8)], white: &[(u8, u8)]) -> Board {
        let mut board = Board::new();
        for &(r, c) in black {
            board.try_place(Pos::new(r, c), Stone::Black);
        }
        for &(r, c) in white {
            board.try_place(Pos::new(r, c), Stone::White);
        }
        board
    }

    #[test]
    fn test_candidates_empty_board_is_center() {
        assert_eq!(candidate_moves(&Board::new(), 1), vec![Pos::center()]);
        assert_eq!(candidate_moves(&Board::new(), 2), vec![Pos::center()]);
    }

    #[test]
    fn test_candidates_around_center_stone() {
        let board = board_with(&[(7, 7)], &[]);
        let moves = candidate_moves(&board, 1);
        assert_eq!(moves.len(), 8);
        let mut expected = Vec::new();
        for dr in -1i32..=1 {
            for dc in -1i32..=1 {
                if dr != 0 || dc != 0 {
                    expected.push(Pos::new((7 + dr) as u8, (7 + dc) as u8));
                }
            }
        }
        assert_eq!(moves, expected);
    }

    #[test]
    fn test_candidates_radius_two_and_corner() {
        let board = board_with(&[(7, 7)], &[]);
        assert_eq!(candidate_moves(&board, 2).len(), 24);

        let corner = board_with(&[(0, 0)], &[]);
        assert_eq!(candidate_moves(&corner, 1).len(), 3);
    }

    #[test]
    fn test_candidates_deduplicated() {
        let board = board_with(&[(7, 7)], &[(7, 8)]);
        let moves = candidate_moves(&board, 1);
        // 3x4 block minus the two stones
        assert_eq!(moves.len(), 10);
        let mut sorted = moves.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), moves.len());
    }

    #[test]
    fn test_empty_board_plays_center() {
        let mut board = Board::new();
        let result = Searcher::new(2).find_best_move(&mut board, Stone::Black);
        assert_eq!(result.best_move, Pos::center());
        assert!(board.is_board_empty());
    }

    #[test]
    fn test_board_restored_after_search() {
        let mut board = board_with(&[(7, 7), (8, 8)], &[(7, 8)]);
        let before = board.clone();
        let _ = Searcher::new(3).find_best_move(&mut board, Stone::White);
        assert_eq!(board, before);
        assert_eq!(board.scratch_depth(), 0);
    }

    #[test]
    fn test_completes_five() {
        let mut board = board_with(&[(7, 3), (7, 4), (7, 5), (7, 6)], &[(6, 3), (6, 4), (8, 8)]);
        let result = Searcher::new(2).find_best_move(&mut board, Stone::Black);
        assert!(
            result.best_move == Pos::new(7, 2) || result.best_move == Pos::new(7, 7),
            "expected a winning point, got {}",
            result.best_move
        );
    }

    #[test]
    fn test_blocks_open_four_threat() {
        // White has four in a row with one open end: Black must take (5,9)
        let mut board = board_with(&[(5, 4), (9, 9)], &[(5, 5), (5, 6), (5, 7), (5, 8)]);
        let result = Searcher::new(1).find_best_move(&mut board, Stone::Black);
        assert_eq!(result.best_move, Pos::new(5, 9));
    }

    #[test]
    fn test_deterministic() {
        let mut board = board_with(&[(7, 7), (6, 8)], &[(7, 8), (8, 6)]);
        let searcher = Searcher::new(2);
        let first = searcher.find_best_move(&mut board, Stone::Black);
        for _ in 0..3 {
            assert_eq!(searcher.find_best_move(&mut board, Stone::Black), first);
        }
    }

    #[test]
    fn test_pruning_matches_full_minimax() {
        let positions = [
            board_with(&[(7, 7)], &[(7, 8)]),
            board_with(&[(7, 7), (8, 8)], &[(6, 6), (7, 8)]),
            board_with(&[(0, 0), (1, 1)], &[(0, 1)]),
        ];
        let searcher = Searcher::with_config(2, 1, RuleSet::FREESTYLE);
        for mut board in positions {
            for ai in [Stone::Black, Stone::White] {
                let pruned = searcher.find_best_move(&mut board, ai);
                let (mv, score) = full_best_move(&mut board, ai, 2, 1);
                assert_eq!(pruned.best_move, mv);
                assert_eq!(pruned.score, score);
            }
        }
    }

    #[test]
    fn test_node_count_covers_root() {
        let mut board = board_with(&[(7, 7), (8, 8)], &[(6, 6), (7, 8)]);
        let searcher = Searcher::with_config(2, 1, RuleSet::FREESTYLE);
        let result = searcher.find_best_move(&mut board, Stone::Black);

        let n = candidate_moves(&board, 1).len() as u64;
        assert!(result.nodes > n);
        // Counter resets between searches
        assert_eq!(searcher.find_best_move(&mut board, Stone::Black).nodes, result.nodes);
    }

    #[test]
    fn test_restricted_root_skips_forbidden_point() {
        // (7,7) would be a double three for Black and also looks attractive
        let mut board = board_with(&[(7, 6), (7, 8), (6, 7), (8, 7)], &[(0, 0)]);
        let result = Searcher::new(1).find_best_move(&mut board, Stone::Black);
        assert_ne!(result.best_move, Pos::new(7, 7));

        let free = Searcher::with_config(1, 1, RuleSet::FREESTYLE);
        assert_eq!(free.find_best_move(&mut board, Stone::Black).best_move, Pos::new(7, 7));
    }
}
