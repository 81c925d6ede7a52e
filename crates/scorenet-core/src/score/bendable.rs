//! BendableScore - Score with a compile-time number of hard and soft levels

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// A score with `H` hard levels and `S` soft levels.
///
/// Levels are compared hard first, then soft, each from index 0 upwards.
///
/// # Examples
///
/// ```
/// use scorenet_core::{BendableScore, Score};
///
/// let a = BendableScore::<2, 1>::of([0, -1], [-10]);
/// let b = BendableScore::<2, 1>::of([0, 0], [-500]);
/// assert!(b > a);
/// assert!(!a.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BendableScore<const H: usize, const S: usize> {
    hard: [i64; H],
    soft: [i64; S],
}

impl<const H: usize, const S: usize> BendableScore<H, S> {
    #[inline]
    pub const fn of(hard: [i64; H], soft: [i64; S]) -> Self {
        BendableScore { hard, soft }
    }

    /// A score of one point at the given hard level.
    pub fn one_hard(level: usize) -> Self {
        let mut score = Self::default();
        score.hard[level] = 1;
        score
    }

    /// A score of one point at the given soft level.
    pub fn one_soft(level: usize) -> Self {
        let mut score = Self::default();
        score.soft[level] = 1;
        score
    }

    pub fn hard_scores(&self) -> &[i64; H] {
        &self.hard
    }

    pub fn soft_scores(&self) -> &[i64; S] {
        &self.soft
    }

    fn zip_checked(&self, other: &Self, op: fn(i64, i64) -> Option<i64>) -> Option<Self> {
        let mut out = Self::default();
        for i in 0..H {
            out.hard[i] = op(self.hard[i], other.hard[i])?;
        }
        for i in 0..S {
            out.soft[i] = op(self.soft[i], other.soft[i])?;
        }
        Some(out)
    }

    fn map_levels(&self, f: impl Fn(i64) -> i64) -> Self {
        BendableScore {
            hard: self.hard.map(&f),
            soft: self.soft.map(&f),
        }
    }
}

impl<const H: usize, const S: usize> Default for BendableScore<H, S> {
    fn default() -> Self {
        BendableScore {
            hard: [0; H],
            soft: [0; S],
        }
    }
}

impl<const H: usize, const S: usize> Score for BendableScore<H, S> {
    fn is_feasible(&self) -> bool {
        self.hard.iter().all(|&s| s >= 0)
    }

    fn zero() -> Self {
        Self::default()
    }

    fn levels_count() -> usize {
        H + S
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        self.hard.iter().chain(self.soft.iter()).copied().collect()
    }

    fn from_level_numbers(levels: &[i64]) -> Self {
        assert_eq!(
            levels.len(),
            H + S,
            "BendableScore<{}, {}> requires exactly {} levels",
            H,
            S,
            H + S
        );
        let mut score = Self::default();
        score.hard.copy_from_slice(&levels[..H]);
        score.soft.copy_from_slice(&levels[H..]);
        score
    }

    fn level_label(index: usize) -> ScoreLevel {
        if index < H {
            ScoreLevel::Hard
        } else if index < H + S {
            ScoreLevel::Soft
        } else {
            panic!("BendableScore has {} levels, got index {}", H + S, index)
        }
    }

    fn checked_add(&self, other: &Self) -> Option<Self> {
        self.zip_checked(other, i64::checked_add)
    }

    fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.zip_checked(other, i64::checked_sub)
    }

    fn checked_mul(&self, factor: i64) -> Option<Self> {
        let mut out = Self::default();
        for i in 0..H {
            out.hard[i] = self.hard[i].checked_mul(factor)?;
        }
        for i in 0..S {
            out.soft[i] = self.soft[i].checked_mul(factor)?;
        }
        Some(out)
    }
}

impl<const H: usize, const S: usize> Ord for BendableScore<H, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hard
            .cmp(&other.hard)
            .then_with(|| self.soft.cmp(&other.soft))
    }
}

impl<const H: usize, const S: usize> PartialOrd for BendableScore<H, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const H: usize, const S: usize> Add for BendableScore<H, S> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut out = self;
        for i in 0..H {
            out.hard[i] += other.hard[i];
        }
        for i in 0..S {
            out.soft[i] += other.soft[i];
        }
        out
    }
}

impl<const H: usize, const S: usize> Sub for BendableScore<H, S> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + (-other)
    }
}

impl<const H: usize, const S: usize> Neg for BendableScore<H, S> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map_levels(|s| -s)
    }
}

impl<const H: usize, const S: usize> fmt::Debug for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BendableScore(hard: {:?}, soft: {:?})",
            self.hard, self.soft
        )
    }
}

impl<const H: usize, const S: usize> fmt::Display for BendableScore<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "[0/0]hard/[-10/-20/-30]soft"
        let join = |levels: &[i64]| {
            levels
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("/")
        };
        write!(f, "[{}]hard/[{}]soft", join(&self.hard[..]), join(&self.soft[..]))
    }
}

fn parse_levels<const N: usize>(part: &str, label: &str) -> Result<[i64; N], ScoreParseError> {
    let inner = part
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| ScoreParseError {
            message: format!("{} part '{}' must be wrapped in brackets", label, part),
        })?;

    let values: Vec<&str> = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split('/').collect()
    };
    if values.len() != N {
        return Err(ScoreParseError {
            message: format!(
                "{} part '{}' has {} levels, expected {}",
                label,
                part,
                values.len(),
                N
            ),
        });
    }

    let mut levels = [0; N];
    for (slot, value) in levels.iter_mut().zip(values) {
        *slot = value.trim().parse::<i64>().map_err(|e| ScoreParseError {
            message: format!("Invalid {} score '{}': {}", label, value, e),
        })?;
    }
    Ok(levels)
}

impl<const H: usize, const S: usize> ParseableScore for BendableScore<H, S> {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (hard_part, soft_part) = s.split_once("hard/").ok_or_else(|| ScoreParseError {
            message: format!(
                "Invalid BendableScore format '{}': expected '[...]hard/[...]soft'",
                s
            ),
        })?;
        let soft_part = soft_part
            .trim()
            .strip_suffix("soft")
            .ok_or_else(|| ScoreParseError {
                message: format!("Soft score part '{}' must end with 'soft'", soft_part),
            })?;

        Ok(BendableScore::of(
            parse_levels::<H>(hard_part, "hard")?,
            parse_levels::<S>(soft_part, "soft")?,
        ))
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}
