//! Streams of triples.

use super::joiner::Joiner;
use super::{expansion, join_def, QuadConstraintStream, StreamDef};

impl_arity_stream!(TriConstraintStream, 3, A, B, C);

impl<A, B, C, Sc> TriConstraintStream<A, B, C, Sc>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    C: Send + Sync + 'static,
    Sc: scorenet_core::Score,
{
    /// Extends every triple with each matching `D`.
    pub fn join<D>(
        self,
        other: super::UniConstraintStream<D, Sc>,
        joiner: Joiner<(A, B, C), D>,
    ) -> QuadConstraintStream<A, B, C, D, Sc>
    where
        D: Send + Sync + 'static,
    {
        QuadConstraintStream::from_def(join_def(&self.def, &other.def, joiner.parts, 4))
    }

    /// Replaces the third element with each item `expand` returns for it.
    pub fn flatten_last<M, I, F>(self, expand: F) -> TriConstraintStream<A, B, M, Sc>
    where
        M: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = M>,
        F: Fn(&C) -> I + Send + Sync + 'static,
    {
        TriConstraintStream::from_def(StreamDef::unary(
            &self.def,
            super::definition::StreamOp::FlattenLast(expansion(expand)),
            3,
        ))
    }
}
