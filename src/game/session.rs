//! Game session: one match from start to result
//!
//! The session owns the board, enforces turn order and the rule variant,
//! resolves wins, draws, timeouts and resignations, and drives the AI
//! worker for `VsAi` games.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::board::{Board, Move, Pos, Stone};
use crate::config::OmokConfig;
use crate::rules::{check_win, is_draw, winning_line, MoveRejection, RuleSet};
use crate::search::Searcher;

use super::ai_task::{AiReply, AiTask};
use super::clock::GameClock;

/// Who sits at the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Human against the search AI
    VsAi { human: Stone },
    /// Two humans sharing one board
    Hotseat,
    /// Human against a remote opponent; the server decides colours
    Online { local: Stone },
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::VsAi { human: Stone::Black }
    }
}

/// The two seats of a session. In `VsAi` the first seat is the human, in
/// `Online` it is the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    Player1,
    Player2,
}

impl Participant {
    pub fn other(self) -> Participant {
        match self {
            Participant::Player1 => Participant::Player2,
            Participant::Player2 => Participant::Player1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    AwaitingStart,
    InProgress,
    Won { winner: Stone, line: Vec<Pos> },
    Draw,
    Timeout { loser: Stone },
    Resigned { loser: Stone },
}

impl GameStatus {
    #[inline]
    pub fn is_in_progress(&self) -> bool {
        matches!(self, GameStatus::InProgress)
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::AwaitingStart | GameStatus::InProgress)
    }
}

/// Result of submitting a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stone committed; `next` is to move
    Placed { stone: Stone, next: Stone },
    Won { winner: Stone, line: Vec<Pos> },
    Draw,
    /// Nothing changed
    Rejected(MoveRejection),
}

/// Main game state
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    mode: GameMode,
    rules: RuleSet,
    searcher: Searcher,
    black_player: Participant,
    current_turn: Stone,
    history: Vec<Move>,
    status: GameStatus,
    version: u64,
    clock: GameClock,
    ai: AiTask,
}

impl GameSession {
    pub fn new(mode: GameMode, config: &OmokConfig) -> Self {
        let rules = config.ruleset();
        Self {
            board: Board::new(),
            mode,
            rules,
            searcher: Searcher::with_config(*config.search().depth(), *config.search().radius(), rules),
            black_player: Participant::Player1,
            current_turn: Stone::Black,
            history: Vec::new(),
            status: GameStatus::AwaitingStart,
            version: 0,
            clock: GameClock::new(config.per_side()),
            ai: AiTask::Idle,
        }
    }

    /// Start (or restart) with a coin flip deciding who holds Black.
    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        let black = if rng.gen_bool(0.5) {
            Participant::Player1
        } else {
            Participant::Player2
        };
        self.start_with(black);
    }

    /// Start (or restart) with `black` holding the black stones.
    /// Black always moves first.
    #[instrument(skip(self), fields(version = self.version + 1))]
    pub fn start_with(&mut self, black: Participant) {
        let first_seat = if black == Participant::Player1 {
            Stone::Black
        } else {
            Stone::White
        };
        self.mode = match self.mode {
            GameMode::VsAi { .. } => GameMode::VsAi { human: first_seat },
            GameMode::Online { .. } => GameMode::Online { local: first_seat },
            GameMode::Hotseat => GameMode::Hotseat,
        };
        self.black_player = black;
        self.board.clear();
        self.history.clear();
        self.clock.reset();
        self.current_turn = Stone::Black;
        self.status = GameStatus::InProgress;
        self.ai = AiTask::Idle;
        self.version += 1;
        info!(mode = ?self.mode, "game started");
    }

    /// Submit a move for the side to move.
    ///
    /// Human entry point. Refused with `NotYourTurn` while the AI is to move;
    /// AI replies go through [`GameSession::apply_move_as`].
    pub fn apply_move(&mut self, pos: Pos) -> MoveOutcome {
        if self.is_ai_turn() {
            debug!(%pos, "move refused, AI to move");
            return MoveOutcome::Rejected(MoveRejection::NotYourTurn);
        }
        self.apply_move_as(self.current_turn, pos)
    }

    /// Submit a move on behalf of `side`.
    #[instrument(skip(self), fields(version = self.version))]
    pub fn apply_move_as(&mut self, side: Stone, pos: Pos) -> MoveOutcome {
        if let Err(rejection) = self.validate(side, pos) {
            debug!(%rejection, "move rejected");
            return MoveOutcome::Rejected(rejection);
        }
        self.commit(side, pos)
    }

    /// Would `side` be allowed to play `pos` now? Nothing is committed.
    pub fn validate(&mut self, side: Stone, pos: Pos) -> Result<(), MoveRejection> {
        if !self.status.is_in_progress() {
            return Err(MoveRejection::GameOver);
        }
        if side != self.current_turn {
            return Err(MoveRejection::NotYourTurn);
        }
        self.rules.check(&mut self.board, pos, side)
    }

    fn commit(&mut self, side: Stone, pos: Pos) -> MoveOutcome {
        if !self.board.try_place(pos, side) {
            return MoveOutcome::Rejected(MoveRejection::Occupied);
        }
        self.history.push(Move::new(pos, side));

        if check_win(&self.board, pos, side) {
            let line = winning_line(&self.board, pos, side);
            info!(winner = ?side, moves = self.history.len(), "game won");
            self.status = GameStatus::Won {
                winner: side,
                line: line.clone(),
            };
            return MoveOutcome::Won { winner: side, line };
        }

        if is_draw(&self.board) {
            info!("board full, draw");
            self.status = GameStatus::Draw;
            return MoveOutcome::Draw;
        }

        self.current_turn = side.opponent();
        MoveOutcome::Placed {
            stone: side,
            next: self.current_turn,
        }
    }

    /// Charge `elapsed` to the side to move. Returns the loser if their time
    /// ran out on this tick.
    pub fn tick(&mut self, elapsed: Duration) -> Option<Stone> {
        if !self.status.is_in_progress() {
            return None;
        }
        let side = self.current_turn;
        if self.clock.deduct(side, elapsed) {
            info!(loser = ?side, "time out");
            self.status = GameStatus::Timeout { loser: side };
            return Some(side);
        }
        None
    }

    pub fn remaining(&self, side: Stone) -> Duration {
        self.clock.remaining(side)
    }

    /// `side` gives up. Only meaningful while the game is running.
    #[instrument(skip(self))]
    pub fn resign(&mut self, side: Stone) -> bool {
        if !self.status.is_in_progress() || side.is_empty() {
            return false;
        }
        info!(loser = ?side, "resigned");
        self.status = GameStatus::Resigned { loser: side };
        true
    }

    /// Winning colour for any decided result.
    pub fn winner(&self) -> Option<Stone> {
        match &self.status {
            GameStatus::Won { winner, .. } => Some(*winner),
            GameStatus::Timeout { loser } | GameStatus::Resigned { loser } => Some(loser.opponent()),
            _ => None,
        }
    }

    /// Colour played by the AI, if this is a `VsAi` game.
    pub fn ai_stone(&self) -> Option<Stone> {
        match self.mode {
            GameMode::VsAi { human } => Some(human.opponent()),
            _ => None,
        }
    }

    pub fn is_ai_turn(&self) -> bool {
        self.status.is_in_progress() && self.ai_stone() == Some(self.current_turn)
    }

    pub fn is_ai_thinking(&self) -> bool {
        self.ai.is_thinking()
    }

    /// Spawn the search for the AI's move. No-op unless it is the AI's turn
    /// and no search is already running.
    pub fn start_ai_thinking(&mut self) -> bool {
        if !self.is_ai_turn() || self.ai.is_thinking() {
            return false;
        }
        debug!(version = self.version, ply = self.history.len(), "AI thinking");
        self.ai = AiTask::spawn(
            self.board.clone(),
            self.current_turn,
            self.version,
            self.history.len(),
            self.searcher.clone(),
        );
        true
    }

    /// Apply the AI's move if it has finished.
    pub fn poll_ai(&mut self) -> Option<MoveOutcome> {
        let reply = self.ai.try_take()?;
        self.apply_ai_reply(reply)
    }

    /// Like [`GameSession::poll_ai`] but waits up to `timeout`.
    pub fn wait_ai(&mut self, timeout: Duration) -> Option<MoveOutcome> {
        let reply = self.ai.wait(timeout)?;
        self.apply_ai_reply(reply)
    }

    fn apply_ai_reply(&mut self, reply: AiReply) -> Option<MoveOutcome> {
        let fresh = reply.version == self.version
            && reply.ply == self.history.len()
            && self.is_ai_turn()
            && reply.stone == self.current_turn;
        if !fresh {
            debug!(
                reply_version = reply.version,
                version = self.version,
                "discarding stale AI result"
            );
            return None;
        }
        debug!(
            best = %reply.result.best_move,
            score = reply.result.score,
            nodes = reply.result.nodes,
            elapsed_ms = reply.elapsed.as_millis() as u64,
            "AI move"
        );
        Some(self.apply_move_as(reply.stone, reply.result.best_move))
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[inline]
    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    #[inline]
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    #[inline]
    pub fn current_turn(&self) -> Stone {
        self.current_turn
    }

    /// The first mover's colour. Always Black; what varies is who holds it.
    #[inline]
    pub fn starting_stone(&self) -> Stone {
        Stone::Black
    }

    #[inline]
    pub fn black_player(&self) -> Participant {
        self.black_player
    }

    /// Seat holding `stone`.
    pub fn participant(&self, stone: Stone) -> Option<Participant> {
        match stone {
            Stone::Black => Some(self.black_player),
            Stone::White => Some(self.black_player.other()),
            Stone::Empty => None,
        }
    }

    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }
}
