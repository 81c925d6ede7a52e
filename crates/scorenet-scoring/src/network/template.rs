use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use scorenet_config::NetworkConfig;
use scorenet_core::{ParseableScore, Result, Score};

use super::builder::NetworkBuilder;
use crate::api::WeightProvider;
use crate::node::{Downstream, NodeId, NodeSpec, TerminalSpec};
use crate::session::ScoreSession;
use crate::stream::{Constraint, ConstraintFactory, ConstraintProvider};

/// One node of a template: what it computes and how it is wired.
pub(crate) struct TemplateNode<Sc: Score> {
    pub(crate) spec: NodeSpec<Sc>,
    /// Per input side, the slot this node owns in the producer's tuples.
    pub(crate) input_slots: SmallVec<[usize; 2]>,
    pub(crate) downstream: Vec<Downstream>,
    /// Longest path from a source node.
    pub(crate) layer: usize,
    pub(crate) arity: usize,
}

/// A constraint that made it into the network.
pub(crate) struct ConstraintEntry<Sc: Score> {
    pub(crate) terminal: NodeId,
    pub(crate) spec: Arc<TerminalSpec<Sc>>,
    pub(crate) is_hard: bool,
}

pub(crate) struct Topology<Sc: Score> {
    pub(crate) nodes: Vec<TemplateNode<Sc>>,
    /// Node ids grouped by layer, in build order within a layer.
    pub(crate) layers: Vec<Vec<NodeId>>,
    pub(crate) sources: HashMap<TypeId, SmallVec<[NodeId; 1]>>,
    pub(crate) constraints: Vec<ConstraintEntry<Sc>>,
    pub(crate) config: NetworkConfig,
    pub(crate) shared: usize,
}

/// The compiled, immutable form of a set of constraints.
///
/// Cloning is cheap and the template is `Send + Sync`, so one template can
/// feed sessions on many threads.
///
/// # Example
///
/// ```
/// use scorenet_config::NetworkConfig;
/// use scorenet_core::{PlanningId, SimpleScore};
/// use scorenet_scoring::stream::ConstraintFactory;
/// use scorenet_scoring::NetworkTemplate;
///
/// #[derive(Debug)]
/// struct Task { id: u32, done: bool }
///
/// impl PlanningId for Task {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// let factory = ConstraintFactory::<SimpleScore>::new();
/// let open = factory
///     .for_each::<Task>()
///     .filter(|t: &Task| !t.done)
///     .penalize(SimpleScore::of(1))
///     .as_constraint("Open task");
///
/// let template = NetworkTemplate::build(vec![open], &NetworkConfig::default()).unwrap();
/// let mut session = template.new_session().unwrap();
/// session.insert(Task { id: 1, done: false }).unwrap();
/// session.insert(Task { id: 2, done: true }).unwrap();
/// assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1));
/// ```
pub struct NetworkTemplate<Sc: Score> {
    inner: Arc<Topology<Sc>>,
}

impl<Sc: Score> Clone for NetworkTemplate<Sc> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Sc: ParseableScore> NetworkTemplate<Sc> {
    /// Compiles constraints into a network.
    ///
    /// Weights configured in `config.constraint_weights` replace the
    /// declared ones. Constraints whose weight ends up zero are left out.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreNetError::ConstraintDefinition`](scorenet_core::ScoreNetError::ConstraintDefinition)
    /// naming the offending constraint for empty or duplicate names,
    /// streams whose arities do not line up and unparsable weights.
    pub fn build(constraints: Vec<Constraint<Sc>>, config: &NetworkConfig) -> Result<Self> {
        NetworkBuilder::new(config).build(constraints, None)
    }

    /// Compiles constraints, taking weights from `overrides` first.
    pub fn build_with_overrides(
        constraints: Vec<Constraint<Sc>>,
        config: &NetworkConfig,
        overrides: &dyn WeightProvider<Sc>,
    ) -> Result<Self> {
        NetworkBuilder::new(config).build(constraints, Some(overrides))
    }

    /// Compiles the constraints of a provider.
    pub fn from_provider<P>(provider: &P, config: &NetworkConfig) -> Result<Self>
    where
        P: ConstraintProvider<Sc> + ?Sized,
    {
        let factory = ConstraintFactory::new();
        Self::build(provider.define_constraints(&factory), config)
    }
}

impl<Sc: Score> NetworkTemplate<Sc> {
    pub(crate) fn from_topology(topology: Topology<Sc>) -> Self {
        Self {
            inner: Arc::new(topology),
        }
    }

    pub(crate) fn topology(&self) -> &Topology<Sc> {
        &self.inner
    }

    /// Starts an empty session over this network.
    pub fn new_session(&self) -> Result<ScoreSession<Sc>> {
        ScoreSession::new(self.clone())
    }

    /// Number of nodes, sources and terminals included.
    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Number of stream definitions that resolved to an existing node.
    pub fn shared_node_count(&self) -> usize {
        self.inner.shared
    }

    /// Number of active constraints.
    pub fn constraint_count(&self) -> usize {
        self.inner.constraints.len()
    }

    /// Full names of the active constraints, in declaration order.
    pub fn constraint_names(&self) -> Vec<String> {
        self.inner
            .constraints
            .iter()
            .map(|c| c.spec.constraint_ref.full_name())
            .collect()
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.inner.config
    }
}

impl<Sc: Score> fmt::Debug for NetworkTemplate<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkTemplate")
            .field("nodes", &self.inner.nodes.len())
            .field("layers", &self.inner.layers.len())
            .field("constraints", &self.inner.constraints.len())
            .field("shared", &self.inner.shared)
            .finish()
    }
}
