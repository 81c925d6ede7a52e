//! The `Score` and `ParseableScore` traits.

use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use thiserror::Error;

use super::ScoreLevel;

/// Core trait for all score types.
///
/// Scores are the weights of constraints and the totals a session reports.
/// Higher-priority levels are compared first.
///
/// The unchecked operators (`+`, `-`, unary `-`) are kept for convenience in
/// user code; the network itself only uses [`Score::checked_add`],
/// [`Score::checked_sub`] and [`Score::checked_mul`] so that an overflow is
/// reported instead of wrapping.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if every hard level is non-negative. Scores without
    /// hard levels are feasible when every level is non-negative.
    fn is_feasible(&self) -> bool;

    fn zero() -> Self;

    fn levels_count() -> usize;

    /// Returns the score values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Inverse of [`Score::to_level_numbers`].
    ///
    /// # Panics
    /// If `levels.len() != levels_count()`.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// # Panics
    /// If `index >= levels_count()`.
    fn level_label(index: usize) -> ScoreLevel;

    /// Level-wise addition, `None` on overflow.
    fn checked_add(&self, other: &Self) -> Option<Self>;

    /// Level-wise subtraction, `None` on overflow.
    fn checked_sub(&self, other: &Self) -> Option<Self>;

    /// Multiplies every level by an integer factor, `None` on overflow.
    fn checked_mul(&self, factor: i64) -> Option<Self>;

    /// Returns true if every level is zero.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Scores that can be parsed from a string, used for configured weights.
pub trait ParseableScore: Score {
    /// Reads the `Display` form back: `7`, `-1hard/3soft`,
    /// `0hard/-2medium/5soft` or `[0/-1]hard/[4]soft`. Surrounding
    /// whitespace is ignored.
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    fn to_string_repr(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Score parse error: {message}")]
pub struct ScoreParseError {
    pub message: String,
}
