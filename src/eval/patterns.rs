//! Pattern scores for omok evaluation
//!
//! Only the ordering matters for play strength:
//! FIVE >> OPEN_FOUR >> FOUR > OPEN_THREE >> THREE > OPEN_TWO > TWO.

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    /// Five or more in a row
    pub const FIVE: i32 = 100_000;
    /// Four with both ends open: _OOOO_
    pub const OPEN_FOUR: i32 = 10_000;
    /// Four with one end open: XOOOO_
    pub const FOUR: i32 = 1_000;
    /// Three with both ends open: _OOO_
    pub const OPEN_THREE: i32 = 500;
    /// Three with one end open
    pub const THREE: i32 = 100;
    /// Two with both ends open
    pub const OPEN_TWO: i32 = 50;
    /// Two with one end open
    pub const TWO: i32 = 10;
}

/// Payoff for a contiguous run of `run` stones with `open_ends` (0..=2) free ends.
#[inline]
pub fn line_score(run: usize, open_ends: u8) -> i32 {
    let (open, half) = match run {
        r if r >= 5 => return PatternScore::FIVE,
        4 => (PatternScore::OPEN_FOUR, PatternScore::FOUR),
        3 => (PatternScore::OPEN_THREE, PatternScore::THREE),
        2 => (PatternScore::OPEN_TWO, PatternScore::TWO),
        _ => return 0,
    };
    match open_ends {
        2 => open,
        1 => half,
        _ => 0,
    }
}
