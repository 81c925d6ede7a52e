//! Constraint identity and impact direction.

use std::fmt;

/// Names a constraint within a network.
///
/// The package is optional; without one the full name is just the name.
///
/// ```
/// use scorenet_core::ConstraintRef;
///
/// assert_eq!(ConstraintRef::new("rooms", "Conflict").full_name(), "rooms/Conflict");
/// assert_eq!(ConstraintRef::new("", "Conflict").full_name(), "Conflict");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    pub package: String,
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// `package/name`, used for weights, lookups and duplicate detection.
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}/", self.package)?;
        }
        f.write_str(&self.name)
    }
}

/// Whether matches lower or raise the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    Penalty,
    Reward,
}

impl ImpactType {
    /// Sign applied to `weight x match_weight`.
    pub const fn sign(self) -> i64 {
        match self {
            ImpactType::Penalty => -1,
            ImpactType::Reward => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_with_and_without_package() {
        let packaged = ConstraintRef::new("my.package", "Overlap");
        assert_eq!(packaged.full_name(), "my.package/Overlap");
        assert_eq!(ConstraintRef::new("", "Overlap").full_name(), "Overlap");
        assert_ne!(packaged, ConstraintRef::new("", "Overlap"));
    }

    #[test]
    fn test_impact_sign() {
        assert_eq!(ImpactType::Penalty.sign(), -1);
        assert_eq!(ImpactType::Reward.sign(), 1);
    }
}
