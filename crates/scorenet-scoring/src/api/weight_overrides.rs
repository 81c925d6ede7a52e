//! Weights chosen at build time.
//!
//! When a network is built, each constraint's weight comes from the first
//! source that names it: an override, then the configured weight string,
//! then the weight the constraint declares. A zero weight leaves the
//! constraint out of the network.

use std::collections::BTreeMap;
use std::sync::Arc;

use scorenet_core::Score;

/// Supplies weights by full constraint name.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    fn weight(&self, full_name: &str) -> Option<Sc>;
}

impl<Sc: Score, P: WeightProvider<Sc> + ?Sized> WeightProvider<Sc> for Arc<P> {
    fn weight(&self, full_name: &str) -> Option<Sc> {
        (**self).weight(full_name)
    }
}

/// A fixed table of weights, keyed by `package/name` (or `name` when the
/// constraint has no package).
#[derive(Debug, Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    table: BTreeMap<String, Sc>,
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    pub fn from_pairs<N: Into<String>>(pairs: impl IntoIterator<Item = (N, Sc)>) -> Self {
        Self {
            table: pairs.into_iter().map(|(name, w)| (name.into(), w)).collect(),
        }
    }

    /// Sets a weight, replacing any earlier one. Zero disables the
    /// constraint.
    pub fn put(&mut self, full_name: impl Into<String>, weight: Sc) -> Option<Sc> {
        self.table.insert(full_name.into(), weight)
    }

    pub fn remove(&mut self, full_name: &str) -> Option<Sc> {
        self.table.remove(full_name)
    }

    /// Constraint names with their weights, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Sc)> {
        self.table.iter().map(|(name, w)| (name.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, full_name: &str) -> Option<Sc> {
        self.table.get(full_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorenet_core::HardSoftScore;

    #[test]
    fn test_put_replaces_and_lists_sorted() {
        let mut overrides = ConstraintWeightOverrides::from_pairs([("b", HardSoftScore::of_hard(2))]);
        assert_eq!(overrides.put("a", HardSoftScore::ZERO), None);
        assert_eq!(
            overrides.put("b", HardSoftScore::of_soft(1)),
            Some(HardSoftScore::of_hard(2))
        );

        let names: Vec<&str> = overrides.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(overrides.weight("b"), Some(HardSoftScore::of_soft(1)));
        assert_eq!(overrides.remove("a"), Some(HardSoftScore::ZERO));
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_shared_provider() {
        let shared = Arc::new(ConstraintWeightOverrides::from_pairs([("a", HardSoftScore::of_hard(2))]));
        assert_eq!(shared.weight("a"), Some(HardSoftScore::of_hard(2)));
        assert_eq!(shared.weight("c"), None);

        let provider: &dyn WeightProvider<HardSoftScore> = &shared;
        assert_eq!(provider.weight("a"), Some(HardSoftScore::of_hard(2)));
    }
}
