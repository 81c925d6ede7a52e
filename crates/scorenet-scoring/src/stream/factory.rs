use std::marker::PhantomData;

use scorenet_core::{Fact, Score};

use super::definition::StreamDef;
use super::joiner::{less_than, Joiner};
use super::{BiConstraintStream, UniConstraintStream};

/// Entry point of the stream API.
///
/// ```
/// use scorenet_core::{HardSoftScore, PlanningId};
/// use scorenet_scoring::stream::joiner::equal;
/// use scorenet_scoring::stream::ConstraintFactory;
///
/// #[derive(Debug)]
/// struct Shift { id: u32, employee: u32 }
///
/// impl PlanningId for Shift {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// let factory = ConstraintFactory::<HardSoftScore>::new();
/// let double_booked = factory
///     .for_each_unique_pair::<Shift>(equal(|s: &Shift| s.employee))
///     .penalize(HardSoftScore::of_hard(1))
///     .as_constraint("Double booking");
/// assert_eq!(double_booked.weight(), HardSoftScore::of_hard(1));
/// ```
pub struct ConstraintFactory<Sc: Score> {
    _phantom: PhantomData<fn() -> Sc>,
}

impl<Sc: Score> ConstraintFactory<Sc> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    /// Streams every tracked fact of type `T`.
    pub fn for_each<T: Fact>(&self) -> UniConstraintStream<T, Sc> {
        UniConstraintStream::from_def(StreamDef::for_each::<T>())
    }

    /// Streams each unordered pair of distinct `T` facts matching `joiner`
    /// exactly once.
    ///
    /// Pairs are ordered by fact id, the lower id first.
    pub fn for_each_unique_pair<T>(&self, joiner: Joiner<(T,), T>) -> BiConstraintStream<T, T, Sc>
    where
        T: Fact,
        T::Id: Ord,
    {
        let joiner = joiner.and(less_than(|a: &T| a.fact_id(), |b: &T| b.fact_id()));
        self.for_each::<T>().join(self.for_each::<T>(), joiner)
    }
}

impl<Sc: Score> Default for ConstraintFactory<Sc> {
    fn default() -> Self {
        Self::new()
    }
}
