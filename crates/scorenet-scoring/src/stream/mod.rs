//! Fluent constraint stream API.
//!
//! Streams describe constraints; they do not evaluate anything. A
//! [`NetworkTemplate`](crate::network::NetworkTemplate) compiles the
//! finished [`Constraint`]s into a node network, and score sessions created
//! from it evaluate the constraints incrementally.
//!
//! ```text
//! ConstraintFactory::new()
//!     .for_each::<Shift>()            -> UniConstraintStream<Shift, Sc>
//!     .join(other, equal(..))         -> BiConstraintStream<Shift, Shift, Sc>
//!     .filter(|a, b| ..)              -> BiConstraintStream<Shift, Shift, Sc>
//!     .penalize(weight)               -> ConstraintBuilder<(Shift, Shift), Sc>
//!     .as_constraint(name)            -> Constraint<Sc>
//! ```

#[macro_use]
mod arity_stream_macros;
mod bi_stream;
pub mod collector;
mod constraint;
pub(crate) mod definition;
mod factory;
pub mod function;
pub mod joiner;
mod quad_stream;
mod tri_stream;
mod uni_stream;


use std::slice;
use std::sync::Arc;

pub use bi_stream::BiConstraintStream;
pub use constraint::{Constraint, ConstraintBuilder, ConstraintProvider};
pub use factory::ConstraintFactory;
pub use quad_stream::QuadConstraintStream;
pub use tri_stream::TriConstraintStream;
pub use uni_stream::UniConstraintStream;

use definition::{Expansion, StreamDef, StreamOp};
use joiner::{JoinerPart, JoinerSet};

use crate::value::{fact_at, Value};

fn join_def(left: &Arc<StreamDef>, right: &Arc<StreamDef>, parts: Vec<JoinerPart>, arity: usize) -> Arc<StreamDef> {
    StreamDef::binary(left, right, StreamOp::Join(Arc::new(JoinerSet::new(parts))), arity)
}

fn expansion<X, M, I, F>(expand: F) -> Expansion
where
    X: 'static,
    M: Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
    I: IntoIterator<Item = M>,
    F: Fn(&X) -> I + Send + Sync + 'static,
{
    Arc::new(move |last: &Value| {
        expand(fact_at::<X>(slice::from_ref(last), 0))
            .into_iter()
            .map(Value::key)
            .collect()
    })
}
