//! Streams of quadruples. Quadruples cannot be joined further.

use super::{expansion, StreamDef};

impl_arity_stream!(QuadConstraintStream, 4, A, B, C, D);

impl<A, B, C, D, Sc> QuadConstraintStream<A, B, C, D, Sc>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    C: Send + Sync + 'static,
    D: Send + Sync + 'static,
    Sc: scorenet_core::Score,
{
    /// Replaces the fourth element with each item `expand` returns for it.
    pub fn flatten_last<M, I, F>(self, expand: F) -> QuadConstraintStream<A, B, C, M, Sc>
    where
        M: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
        I: IntoIterator<Item = M>,
        F: Fn(&D) -> I + Send + Sync + 'static,
    {
        QuadConstraintStream::from_def(StreamDef::unary(
            &self.def,
            super::definition::StreamOp::FlattenLast(expansion(expand)),
            4,
        ))
    }
}
