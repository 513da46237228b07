//! Omok (five-in-a-row) engine with Renju-style restrictions
//!
//! A 15x15 five-in-a-row engine and match relay:
//! - Five or more in a row wins
//! - One side (Black by default) may not play overlines, double fours or
//!   double threes
//! - A full board without a winner is a draw
//! - Online games go through a relay that pairs players and enforces turn
//!   order
//!
//! # Architecture
//!
//! - [`board`]: Bitboard-backed grid with a reversible scratch stack
//! - [`rules`]: Win, forbidden-move and draw detection
//! - [`eval`]: Pattern payoffs and static evaluation
//! - [`search`]: Minimax with alpha-beta pruning
//! - [`game`]: Session state machine, clocks and the background AI
//! - [`net`]: Wire protocol, matchmaking coordinator, TCP server and client
//! - [`config`]: TOML configuration
//!
//! # Quick Start
//!
//! ```
//! use omok::{GameMode, GameSession, MoveOutcome, OmokConfig, Participant, Pos, Stone};
//!
//! let config = OmokConfig::default().with_depth(1);
//! let mut session = GameSession::new(GameMode::VsAi { human: Stone::Black }, &config);
//! session.start_with(Participant::Player1);
//!
//! let outcome = session.apply_move(Pos::new(7, 7));
//! assert_eq!(outcome, MoveOutcome::Placed { stone: Stone::Black, next: Stone::White });
//! assert!(session.is_ai_turn());
//! ```

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod eval;
pub mod game;
pub mod net;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Move, Pos, Stone, BOARD_SIZE};
pub use config::OmokConfig;
pub use error::{ConfigError, OmokError, OmokResult};
pub use game::{GameMode, GameSession, GameStatus, MoveOutcome, Participant};
pub use rules::{Forbidden, MoveRejection, RuleSet};
pub use search::{SearchResult, Searcher};
