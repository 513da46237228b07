//! Background AI computation
//!
//! The search runs on its own thread with a private board copy and reports
//! back over a channel. The session polls without blocking, so clocks keep
//! running while the AI thinks.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::board::{Board, Stone};
use crate::search::{SearchResult, Searcher};

/// Search result tagged with the session state it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiReply {
    /// Session version at spawn time
    pub version: u64,
    /// Number of moves on the board at spawn time
    pub ply: usize,
    pub stone: Stone,
    pub result: SearchResult,
    pub elapsed: Duration,
}

/// AI computation state
#[derive(Debug, Default)]
pub enum AiTask {
    #[default]
    Idle,
    Thinking {
        receiver: Receiver<AiReply>,
        start_time: Instant,
    },
}

impl AiTask {
    /// Start searching `board` for `stone` on a worker thread.
    pub fn spawn(mut board: Board, stone: Stone, version: u64, ply: usize, searcher: Searcher) -> Self {
        let (tx, rx) = channel();
        let start_time = Instant::now();

        thread::spawn(move || {
            let result = searcher.find_best_move(&mut board, stone);
            let reply = AiReply {
                version,
                ply,
                stone,
                result,
                elapsed: start_time.elapsed(),
            };
            // Receiver is gone when the session restarted meanwhile
            if tx.send(reply).is_err() {
                debug!(version, "AI result dropped, session moved on");
            }
        });

        AiTask::Thinking {
            receiver: rx,
            start_time,
        }
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self, AiTask::Thinking { .. })
    }

    /// Time spent so far, if a search is running.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            AiTask::Thinking { start_time, .. } => Some(start_time.elapsed()),
            AiTask::Idle => None,
        }
    }

    /// Non-blocking check for a finished search. Returns to Idle once the
    /// reply is taken or the worker died.
    pub fn try_take(&mut self) -> Option<AiReply> {
        let outcome = match self {
            AiTask::Thinking { receiver, .. } => receiver.try_recv(),
            AiTask::Idle => return None,
        };
        match outcome {
            Ok(reply) => {
                *self = AiTask::Idle;
                Some(reply)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("AI worker exited without a result");
                *self = AiTask::Idle;
                None
            }
        }
    }

    /// Blocks up to `timeout` for the running search.
    pub fn wait(&mut self, timeout: Duration) -> Option<AiReply> {
        let outcome = match self {
            AiTask::Thinking { receiver, .. } => receiver.recv_timeout(timeout),
            AiTask::Idle => return None,
        };
        match outcome {
            Ok(reply) => {
                *self = AiTask::Idle;
                Some(reply)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("AI worker exited without a result");
                *self = AiTask::Idle;
                None
            }
        }
    }
}
