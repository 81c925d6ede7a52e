//! Generates fixed-level score types.
//!
//! Every level is an `i64` stored in a named field. Levels compare in
//! declaration order and print as `<value><suffix>` joined by `/`.

/// Declares a score struct with one `i64` field per level.
///
/// ```ignore
/// level_score! {
///     /// Doc comment of the type.
///     pub struct HardSoftScore {
///         hard: Hard => "hard",
///         soft: Soft => "soft",
///     }
/// }
/// ```
///
/// Generates the struct, `ZERO`, `of(..)`, one getter per level, `Score`,
/// `ParseableScore`, `Ord`, the arithmetic operators, `Debug` and `Display`.
macro_rules! level_score {
    (
        $(#[$meta:meta])*
        pub struct $type:ident {
            $($field:ident : $level:ident => $suffix:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $type {
            $($field: i64),+
        }

        impl $type {
            /// The zero score.
            pub const ZERO: $type = $type { $($field: 0),+ };

            const LEVELS: &'static [$crate::score::ScoreLevel] = &[$($crate::score::ScoreLevel::$level),+];
            const SUFFIXES: &'static [&'static str] = &[$($suffix),+];

            #[inline]
            pub const fn of($($field: i64),+) -> Self {
                $type { $($field),+ }
            }

            $(
                #[inline]
                pub const fn $field(&self) -> i64 {
                    self.$field
                }
            )+

            fn from_levels(mut levels: impl Iterator<Item = i64>) -> Self {
                $type { $($field: levels.next().unwrap_or_default()),+ }
            }

            fn try_zip(&self, other: &Self, op: fn(i64, i64) -> Option<i64>) -> Option<Self> {
                Some($type { $($field: op(self.$field, other.$field)?),+ })
            }
        }

        impl $crate::score::Score for $type {
            /// Hard levels must be non-negative. A score without hard levels
            /// is feasible when every level is non-negative.
            fn is_feasible(&self) -> bool {
                let has_hard = Self::LEVELS.contains(&$crate::score::ScoreLevel::Hard);
                <Self as $crate::score::Score>::to_level_numbers(self)
                    .iter()
                    .zip(Self::LEVELS)
                    .all(|(value, level)| (has_hard && *level != $crate::score::ScoreLevel::Hard) || *value >= 0)
            }

            #[inline]
            fn zero() -> Self {
                $type::ZERO
            }

            #[inline]
            fn levels_count() -> usize {
                Self::LEVELS.len()
            }

            fn to_level_numbers(&self) -> Vec<i64> {
                vec![$(self.$field),+]
            }

            fn from_level_numbers(levels: &[i64]) -> Self {
                assert_eq!(
                    levels.len(),
                    Self::LEVELS.len(),
                    "{} has {} levels",
                    stringify!($type),
                    Self::LEVELS.len()
                );
                Self::from_levels(levels.iter().copied())
            }

            fn level_label(index: usize) -> $crate::score::ScoreLevel {
                match Self::LEVELS.get(index) {
                    Some(level) => *level,
                    None => panic!("{} has no level {}", stringify!($type), index),
                }
            }

            fn checked_add(&self, other: &Self) -> Option<Self> {
                self.try_zip(other, i64::checked_add)
            }

            fn checked_sub(&self, other: &Self) -> Option<Self> {
                self.try_zip(other, i64::checked_sub)
            }

            fn checked_mul(&self, factor: i64) -> Option<Self> {
                Some($type { $($field: self.$field.checked_mul(factor)?),+ })
            }
        }

        impl $crate::score::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::ScoreParseError> {
                let s = s.trim();
                let parts: Vec<&str> = s.split('/').collect();
                if parts.len() != Self::SUFFIXES.len() {
                    return Err($crate::score::ScoreParseError {
                        message: format!(
                            "{} '{}' needs {} levels separated by '/'",
                            stringify!($type),
                            s,
                            Self::SUFFIXES.len()
                        ),
                    });
                }
                let mut levels = Vec::with_capacity(parts.len());
                for (part, suffix) in parts.iter().zip(Self::SUFFIXES) {
                    let number = part.trim().strip_suffix(suffix).ok_or_else(|| {
                        $crate::score::ScoreParseError {
                            message: format!("level '{}' of '{}' must end with '{}'", part, s, suffix),
                        }
                    })?;
                    levels.push(number.parse::<i64>().map_err(|e| $crate::score::ScoreParseError {
                        message: format!("level '{}' of '{}': {}", part, s, e),
                    })?);
                }
                Ok(Self::from_levels(levels.into_iter()))
            }

            fn to_string_repr(&self) -> String {
                self.to_string()
            }
        }

        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                ($(self.$field,)+).cmp(&($(other.$field,)+))
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type { $($field: self.$field + other.$field),+ }
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type { $($field: self.$field - other.$field),+ }
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type { $($field: -self.$field),+ }
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let levels: Vec<String> = vec![$(self.$field.to_string()),+];
                write!(f, "{}({})", stringify!($type), levels.join(", "))
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let levels: Vec<String> = vec![$(format!("{}{}", self.$field, $suffix)),+];
                f.write_str(&levels.join("/"))
            }
        }
    };
}
