use smallvec::SmallVec;

use crate::value::Value;

/// How a stored key part relates to a queried key part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    /// The same relation seen from the other operand.
    ///
    /// `a < b` holds exactly when `b > a` holds.
    pub fn flip(self) -> Self {
        match self {
            Comparison::Less => Comparison::Greater,
            Comparison::LessOrEqual => Comparison::GreaterOrEqual,
            Comparison::Greater => Comparison::Less,
            Comparison::GreaterOrEqual => Comparison::LessOrEqual,
        }
    }
}

/// A key extracted from one side of a join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct IndexKey {
    /// Values of the equality joiners, matched as one composite key.
    pub(crate) equal: SmallVec<[Value; 2]>,
    /// One value per comparison joiner, in declaration order.
    pub(crate) compare: SmallVec<[Value; 2]>,
}
