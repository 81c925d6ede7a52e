//! Streams of single facts or derived values.

use scorenet_core::Fact;

use super::definition::ExistenceMode;
use super::joiner::{equal, filtering, Joiner};
use super::{expansion, join_def, BiConstraintStream, StreamDef};

impl_arity_stream!(UniConstraintStream, 1, A);

impl<A, Sc> UniConstraintStream<A, Sc>
where
    A: Send + Sync + 'static,
    Sc: scorenet_core::Score,
{
    /// Pairs every `A` with every matching `B`.
    ///
    /// Joining a type with itself yields ordered pairs, including each fact
    /// paired with itself unless a joiner or filter excludes it.
    pub fn join<B>(self, other: UniConstraintStream<B, Sc>, joiner: Joiner<(A,), B>) -> BiConstraintStream<A, B, Sc>
    where
        B: Send + Sync + 'static,
    {
        BiConstraintStream::from_def(join_def(&self.def, &other.def, joiner.parts, 2))
    }

    /// Replaces each value with the items `expand` returns for it.
    pub fn flatten_last<M, I, F>(self, expand: F) -> UniConstraintStream<M, Sc>
    where
        M: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = M>,
        F: Fn(&A) -> I + Send + Sync + 'static,
    {
        UniConstraintStream::from_def(StreamDef::unary(
            &self.def,
            super::definition::StreamOp::FlattenLast(expansion(expand)),
            1,
        ))
    }
}

impl<A, Sc> UniConstraintStream<A, Sc>
where
    A: Fact,
    Sc: scorenet_core::Score,
{
    /// Keeps facts for which another fact of the same type matches.
    ///
    /// The fact itself never counts as its own match.
    pub fn if_exists_other(self, joiner: Joiner<(A,), A>) -> Self {
        self.existence_other(ExistenceMode::Exists, joiner)
    }

    /// Keeps facts for which no other fact of the same type matches.
    pub fn if_not_exists_other(self, joiner: Joiner<(A,), A>) -> Self {
        self.existence_other(ExistenceMode::NotExists, joiner)
    }

    /// Adds every tracked `A` that is not in the stream yet.
    ///
    /// Facts already in the stream are kept as they are, so a stream
    /// holding some of the facts once ends up holding all of them once.
    pub fn complement(self) -> Self {
        let missing = UniConstraintStream::<A, Sc>::from_def(StreamDef::for_each::<A>())
            .if_not_exists(self.clone(), equal(|a: &A| a.fact_id()));
        self.concat(missing)
    }

    fn existence_other(self, mode: ExistenceMode, joiner: Joiner<(A,), A>) -> Self {
        let joiner = joiner.and(filtering(|a: &A, b: &A| a.fact_id() != b.fact_id()));
        self.existence(mode, &StreamDef::for_each::<A>(), joiner.parts)
    }
}
