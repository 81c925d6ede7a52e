//! Streams of pairs.

use super::joiner::Joiner;
use super::{expansion, join_def, StreamDef, TriConstraintStream};

impl_arity_stream!(BiConstraintStream, 2, A, B);

impl<A, B, Sc> BiConstraintStream<A, B, Sc>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    Sc: scorenet_core::Score,
{
    /// Extends every pair with each matching `C`.
    pub fn join<C>(
        self,
        other: super::UniConstraintStream<C, Sc>,
        joiner: Joiner<(A, B), C>,
    ) -> TriConstraintStream<A, B, C, Sc>
    where
        C: Send + Sync + 'static,
    {
        TriConstraintStream::from_def(join_def(&self.def, &other.def, joiner.parts, 3))
    }

    /// Replaces the second element with each item `expand` returns for it.
    pub fn flatten_last<M, I, F>(self, expand: F) -> BiConstraintStream<A, M, Sc>
    where
        M: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = M>,
        F: Fn(&B) -> I + Send + Sync + 'static,
    {
        BiConstraintStream::from_def(StreamDef::unary(
            &self.def,
            super::definition::StreamOp::FlattenLast(expansion(expand)),
            2,
        ))
    }
}
