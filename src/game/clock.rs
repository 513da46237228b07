//! Per-side countdown clocks

use std::fmt;
use std::time::Duration;

use crate::board::Stone;

/// Remaining thinking time for both colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    per_side: Duration,
    black: Duration,
    white: Duration,
}

impl GameClock {
    pub fn new(per_side: Duration) -> Self {
        Self {
            per_side,
            black: per_side,
            white: per_side,
        }
    }

    /// Both sides back to the full budget.
    pub fn reset(&mut self) {
        self.black = self.per_side;
        self.white = self.per_side;
    }

    #[inline]
    pub fn per_side(&self) -> Duration {
        self.per_side
    }

    /// Time left for `side`. Empty has no clock and reads zero.
    pub fn remaining(&self, side: Stone) -> Duration {
        match side {
            Stone::Black => self.black,
            Stone::White => self.white,
            Stone::Empty => Duration::ZERO,
        }
    }

    /// Deducts `elapsed` from `side`, saturating at zero.
    /// Returns true once that side has no time left.
    pub fn deduct(&mut self, side: Stone, elapsed: Duration) -> bool {
        let slot = match side {
            Stone::Black => &mut self.black,
            Stone::White => &mut self.white,
            Stone::Empty => return false,
        };
        *slot = slot.saturating_sub(elapsed);
        slot.is_zero()
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

/// `m:ss` rendering of a remaining time, rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattedClock(pub Duration);

impl fmt::Display for FormattedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        write!(f, "{}:{:02}", secs / 60, secs % 60)
    }
}
