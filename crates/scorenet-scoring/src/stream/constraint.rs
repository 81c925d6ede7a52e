//! Finished constraint definitions.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use scorenet_core::{ConstraintRef, ImpactType, Score};

use super::definition::StreamDef;
use super::function::{erase, ErasedFn, TupleFn};
use super::ConstraintFactory;

/// A stream with its impact attached, waiting for a name.
pub struct ConstraintBuilder<L, Sc: Score> {
    stream: Arc<StreamDef>,
    impact: ImpactType,
    weight: Sc,
    weigher: Option<ErasedFn<i64>>,
    justifier: Option<ErasedFn<String>>,
    _phantom: PhantomData<fn() -> L>,
}

impl<L, Sc> ConstraintBuilder<L, Sc>
where
    L: 'static,
    Sc: Score,
{
    pub(crate) fn new(
        stream: Arc<StreamDef>,
        impact: ImpactType,
        weight: Sc,
        weigher: Option<ErasedFn<i64>>,
    ) -> Self {
        Self {
            stream,
            impact,
            weight,
            weigher,
            justifier: None,
            _phantom: PhantomData,
        }
    }

    /// Describes each match for score explanations.
    ///
    /// Without a justification, a match is described by its facts.
    pub fn justify_with<F>(mut self, justification: F) -> Self
    where
        F: TupleFn<L, String>,
    {
        self.justifier = Some(erase(justification));
        self
    }

    /// Names the constraint.
    pub fn as_constraint(self, name: impl Into<String>) -> Constraint<Sc> {
        self.as_constraint_in("", name)
    }

    /// Names the constraint within a package.
    pub fn as_constraint_in(self, package: impl Into<String>, name: impl Into<String>) -> Constraint<Sc> {
        Constraint {
            constraint_ref: ConstraintRef::new(package, name),
            impact: self.impact,
            weight: self.weight,
            stream: self.stream,
            weigher: self.weigher,
            justifier: self.justifier,
        }
    }
}

/// A named constraint, ready to be compiled into a network.
#[derive(Clone)]
pub struct Constraint<Sc: Score> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) impact: ImpactType,
    pub(crate) weight: Sc,
    pub(crate) stream: Arc<StreamDef>,
    pub(crate) weigher: Option<ErasedFn<i64>>,
    pub(crate) justifier: Option<ErasedFn<String>>,
}

impl<Sc: Score> Constraint<Sc> {
    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact
    }

    /// The declared weight, before overrides.
    pub fn weight(&self) -> Sc {
        self.weight
    }
}

impl<Sc: Score> fmt::Debug for Constraint<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("constraint_ref", &self.constraint_ref)
            .field("impact", &self.impact)
            .field("weight", &self.weight)
            .field("stream", &self.stream.op.name())
            .finish()
    }
}

/// Supplies the constraints of a problem.
///
/// ```
/// use scorenet_core::{PlanningId, SimpleScore};
/// use scorenet_scoring::stream::{Constraint, ConstraintFactory, ConstraintProvider};
///
/// #[derive(Debug)]
/// struct Task { id: u32, done: bool }
///
/// impl PlanningId for Task {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// struct Tasks;
///
/// impl ConstraintProvider<SimpleScore> for Tasks {
///     fn define_constraints(&self, factory: &ConstraintFactory<SimpleScore>) -> Vec<Constraint<SimpleScore>> {
///         vec![factory
///             .for_each::<Task>()
///             .filter(|t: &Task| !t.done)
///             .penalize(SimpleScore::of(1))
///             .as_constraint("Open task")]
///     }
/// }
///
/// let constraints = Tasks.define_constraints(&ConstraintFactory::new());
/// assert_eq!(constraints[0].constraint_ref().name, "Open task");
/// ```
pub trait ConstraintProvider<Sc: Score> {
    fn define_constraints(&self, factory: &ConstraintFactory<Sc>) -> Vec<Constraint<Sc>>;
}
