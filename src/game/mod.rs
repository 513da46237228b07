//! Match state: turn order, results, clocks and the AI worker

pub mod ai_task;
pub mod clock;
pub mod selfplay;
pub mod session;

pub use ai_task::{AiReply, AiTask};
pub use clock::{FormattedClock, GameClock};
pub use selfplay::{self_play, SelfPlayReport};
pub use session::{GameMode, GameSession, GameStatus, MoveOutcome, Participant};
