//! AI against itself on one board

use rand::Rng;
use tracing::{debug, info};

use crate::board::Move;
use crate::config::OmokConfig;
use crate::search::Searcher;

use super::session::{GameMode, GameSession, GameStatus, MoveOutcome};

#[derive(Debug, Clone)]
pub struct SelfPlayReport {
    pub status: GameStatus,
    pub moves: Vec<Move>,
    /// Nodes searched over the whole game
    pub nodes: u64,
}

/// Play until a result or `max_moves` stones. Both sides search with the
/// configured depth and rules.
pub fn self_play<R: Rng>(config: &OmokConfig, max_moves: usize, rng: &mut R) -> (GameSession, SelfPlayReport) {
    let searcher = Searcher::with_config(*config.search().depth(), *config.search().radius(), config.ruleset());
    let mut session = GameSession::new(GameMode::Hotseat, config);
    session.start(rng);

    let mut nodes = 0;
    while session.status().is_in_progress() && session.history().len() < max_moves {
        let mut board = session.board().clone();
        let side = session.current_turn();
        let result = searcher.find_best_move(&mut board, side);
        nodes += result.nodes;

        match session.apply_move(result.best_move) {
            MoveOutcome::Rejected(reason) => {
                // Only reachable when every candidate is forbidden
                info!(?side, %reason, "no legal move, resigning");
                session.resign(side);
            }
            outcome => debug!(?side, pos = %result.best_move, ?outcome, "self-play move"),
        }
    }

    let report = SelfPlayReport {
        status: session.status().clone(),
        moves: session.history().to_vec(),
        nodes,
    };
    (session, report)
}
