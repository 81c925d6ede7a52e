use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, warn};

use scorenet_config::NetworkConfig;
use scorenet_core::{ParseableScore, Result, Score, ScoreLevel, ScoreNetError};

use super::template::{ConstraintEntry, NetworkTemplate, TemplateNode, Topology};
use crate::api::WeightProvider;
use crate::node::{Downstream, NodeId, NodeSpec, Side, TerminalSpec};
use crate::stream::definition::{ExistenceMode, StreamDef, StreamOp, MAX_ARITY};
use crate::stream::function::fn_identity;
use crate::stream::Constraint;

/// Structural identity of an operator, closures compared by pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OpKey {
    ForEach(TypeId),
    Filter(usize),
    Join(SmallVec<[usize; 4]>),
    Exists(ExistenceMode, SmallVec<[usize; 4]>),
    Group(Option<usize>, Option<usize>),
    Map(usize),
    FlattenLast(usize),
    Distinct,
    Concat,
}

impl OpKey {
    fn of(op: &StreamOp) -> Self {
        match op {
            StreamOp::ForEach { type_id, .. } => OpKey::ForEach(*type_id),
            StreamOp::Filter(predicate) => OpKey::Filter(fn_identity(predicate)),
            StreamOp::Join(joiners) => OpKey::Join(joiners.signature()),
            StreamOp::Exists { mode, joiners } => OpKey::Exists(*mode, joiners.signature()),
            StreamOp::Group { key, collector } => OpKey::Group(
                key.as_ref().map(fn_identity),
                collector.as_ref().map(fn_identity),
            ),
            StreamOp::Map(mapper) => OpKey::Map(fn_identity(mapper)),
            StreamOp::FlattenLast(expand) => OpKey::FlattenLast(fn_identity(expand)),
            StreamOp::Distinct => OpKey::Distinct,
            StreamOp::Concat => OpKey::Concat,
        }
    }
}

type MemoKey = (OpKey, SmallVec<[NodeId; 2]>);

/// Compiles constraint definitions into a node arena.
///
/// Stream definitions are resolved bottom-up. A definition whose operator
/// and inputs match an existing node reuses it, so equal prefixes of
/// different constraints are evaluated once. Both caches live for one
/// `build` call, or for one constraint when node sharing is off.
pub(crate) struct NetworkBuilder<'a, Sc: Score> {
    config: &'a NetworkConfig,
    nodes: Vec<TemplateNode<Sc>>,
    memo: HashMap<MemoKey, NodeId>,
    by_def: HashMap<usize, NodeId>,
    sources: HashMap<TypeId, SmallVec<[NodeId; 1]>>,
    shared: usize,
}

impl<'a, Sc: ParseableScore> NetworkBuilder<'a, Sc> {
    pub(crate) fn new(config: &'a NetworkConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            memo: HashMap::new(),
            by_def: HashMap::new(),
            sources: HashMap::new(),
            shared: 0,
        }
    }

    pub(crate) fn build(
        mut self,
        constraints: Vec<Constraint<Sc>>,
        overrides: Option<&dyn WeightProvider<Sc>>,
    ) -> Result<NetworkTemplate<Sc>> {
        validate_names(&constraints)?;

        let mut entries = Vec::with_capacity(constraints.len());
        for constraint in &constraints {
            let name = constraint.constraint_ref.full_name();
            let weight = self.resolve_weight(constraint, &name, overrides)?;
            if weight.is_zero() {
                warn!(
                    event = "constraint_disabled",
                    constraint = %name,
                    "Constraint has a zero weight and is not built",
                );
                continue;
            }
            if !self.config.node_sharing {
                self.memo.clear();
                self.by_def.clear();
            }

            let input = self.resolve(&constraint.stream, &name)?;
            let spec = Arc::new(TerminalSpec {
                constraint_ref: constraint.constraint_ref.clone(),
                impact: constraint.impact,
                weight,
                weigher: constraint.weigher.clone(),
                justifier: constraint.justifier.clone(),
            });
            let arity = self.nodes[input.0].arity;
            let terminal = self.push_node(NodeSpec::Terminal(spec.clone()), &[input], arity);
            entries.push(ConstraintEntry {
                terminal,
                spec,
                is_hard: is_hard(&weight),
            });
        }

        let depth = self.nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0);
        let mut layers = vec![Vec::new(); depth];
        for (i, node) in self.nodes.iter().enumerate() {
            layers[node.layer].push(NodeId(i));
        }

        debug!(
            event = "network_built",
            constraints = entries.len(),
            nodes = self.nodes.len(),
            shared = self.shared,
            layers = layers.len(),
            node_sharing = self.config.node_sharing,
        );

        Ok(NetworkTemplate::from_topology(Topology {
            nodes: self.nodes,
            layers,
            sources: self.sources,
            constraints: entries,
            config: self.config.clone(),
            shared: self.shared,
        }))
    }

    /// Overrides win over configured weights, which win over the declared
    /// weight.
    fn resolve_weight(
        &self,
        constraint: &Constraint<Sc>,
        name: &str,
        overrides: Option<&dyn WeightProvider<Sc>>,
    ) -> Result<Sc> {
        if let Some(weight) = overrides.and_then(|o| o.weight(name)) {
            return Ok(weight);
        }
        let configured = self
            .config
            .weight_for::<Sc>(name)
            .map_err(|e| ScoreNetError::definition(name, e.to_string()))?;
        Ok(configured.unwrap_or(constraint.weight))
    }

    fn resolve(&mut self, def: &Arc<StreamDef>, constraint: &str) -> Result<NodeId> {
        let address = Arc::as_ptr(def) as usize;
        if let Some(&id) = self.by_def.get(&address) {
            self.shared += 1;
            return Ok(id);
        }

        let mut inputs: SmallVec<[NodeId; 2]> = SmallVec::new();
        for parent in &def.parents {
            inputs.push(self.resolve(parent, constraint)?);
        }
        let input_arities: SmallVec<[usize; 2]> =
            inputs.iter().map(|id| self.nodes[id.0].arity).collect();
        let arity = def
            .op
            .output_arity(&input_arities)
            .filter(|&arity| arity == def.arity && arity <= MAX_ARITY)
            .ok_or_else(|| {
                ScoreNetError::definition(
                    constraint,
                    format!(
                        "{} cannot consume streams of arity {:?}",
                        def.op.name(),
                        input_arities.as_slice()
                    ),
                )
            })?;

        let key = (OpKey::of(&def.op), inputs.clone());
        let id = match self.memo.get(&key) {
            Some(&id) => {
                self.shared += 1;
                id
            }
            None => {
                let id = self.push_node(NodeSpec::Stream(def.op.clone()), &inputs, arity);
                if let StreamOp::ForEach { type_id, .. } = def.op {
                    self.sources.entry(type_id).or_default().push(id);
                }
                self.memo.insert(key, id);
                id
            }
        };
        self.by_def.insert(address, id);
        Ok(id)
    }

    /// Appends a node, wiring it as the next consumer of each input.
    ///
    /// The first input feeds the left side, the second the right side.
    fn push_node(&mut self, spec: NodeSpec<Sc>, inputs: &[NodeId], arity: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut input_slots = SmallVec::new();
        let mut layer = 0;
        for (i, input) in inputs.iter().enumerate() {
            let producer = &mut self.nodes[input.0];
            input_slots.push(producer.downstream.len());
            producer.downstream.push(Downstream {
                node: id,
                side: if i == 0 { Side::Left } else { Side::Right },
            });
            layer = layer.max(producer.layer + 1);
        }
        self.nodes.push(TemplateNode {
            spec,
            input_slots,
            downstream: Vec::new(),
            layer,
            arity,
        });
        id
    }
}

fn validate_names<Sc: Score>(constraints: &[Constraint<Sc>]) -> Result<()> {
    let mut seen = HashSet::new();
    for constraint in constraints {
        let name = constraint.constraint_ref.full_name();
        if constraint.constraint_ref.name.trim().is_empty() {
            return Err(ScoreNetError::definition(name, "constraint name is empty"));
        }
        if !seen.insert(name.clone()) {
            return Err(ScoreNetError::definition(name, "constraint name is not unique"));
        }
    }
    Ok(())
}

/// A weight is hard if its highest non-zero level is a hard level.
fn is_hard<Sc: Score>(weight: &Sc) -> bool {
    weight
        .to_level_numbers()
        .iter()
        .position(|&level| level != 0)
        .is_some_and(|index| Sc::level_label(index) == ScoreLevel::Hard)
}
