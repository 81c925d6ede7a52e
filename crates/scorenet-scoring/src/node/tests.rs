//! Tests for individual nodes, driven without a scheduler.

use std::sync::Arc;

use smallvec::smallvec;

use scorenet_core::{ConstraintRef, ImpactType, SimpleScore};

use super::distinct::DistinctNode;
use super::exists::ExistsNode;
use super::filter::FilterNode;
use super::group::GroupNode;
use super::join::JoinNode;
use super::*;
use crate::stream::collector::{count, erase_collector};
use crate::stream::definition::ExistenceMode;
use crate::stream::function::ErasedFn;
use crate::stream::joiner::{equal, JoinerSet};
use crate::tuple::{TupleArena, TupleState};
use crate::value::{Facts, Value};

/// Allocates a settled input tuple with room for `width` consumers.
fn input(tuples: &mut TupleArena, value: i64, width: usize) -> TupleId {
    let id = tuples.alloc(smallvec![Value::key(value)], width);
    tuples.set_state(id, TupleState::Ok).unwrap();
    id
}

fn set_input(tuples: &mut TupleArena, id: TupleId, value: i64) {
    tuples.refresh_facts(id, smallvec![Value::key(value)]).unwrap();
}

/// Marks every queued output as propagated.
fn settle_queue(tuples: &mut TupleArena, queue: &mut Vec<TupleId>) {
    for id in queue.drain(..) {
        match tuples.state(id).unwrap() {
            TupleState::Dying | TupleState::Aborting => {
                tuples.release(id).unwrap();
            }
            _ => tuples.set_state(id, TupleState::Ok).unwrap(),
        }
    }
}

fn value_of(facts: &[Value], index: usize) -> i64 {
    *facts[index].get::<i64>().unwrap()
}

fn positive() -> ErasedFn<bool> {
    Arc::new(|facts: &[Value]| value_of(facts, 0) > 0)
}

fn parity_joiners() -> Arc<JoinerSet> {
    Arc::new(JoinerSet::new(equal(|v: &i64| v % 2).parts))
}

#[test]
fn test_filter_flips_outcome() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = FilterNode::new(positive(), 0);

    let t = input(&mut tuples, 5, 1);
    node.insert(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 1);
    let out = queue[0];
    settle_queue(&mut tuples, &mut queue);

    set_input(&mut tuples, t, -1);
    node.update(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(tuples.state(out).unwrap(), TupleState::Dying);
    settle_queue(&mut tuples, &mut queue);

    set_input(&mut tuples, t, 2);
    node.update(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(tuples.state(queue[0]).unwrap(), TupleState::Creating);
}

#[test]
fn test_filter_absorbs_unchanged_update() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = FilterNode::new(positive(), 0);

    let t = input(&mut tuples, 5, 1);
    node.insert(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    settle_queue(&mut tuples, &mut queue);

    node.update(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert!(queue.is_empty());
}

#[test]
fn test_retract_before_propagation_aborts() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = FilterNode::new(positive(), 0);

    let t = input(&mut tuples, 5, 1);
    node.insert(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    let out = queue[0];
    node.retract(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();

    assert_eq!(queue, vec![out]);
    assert_eq!(tuples.state(out).unwrap(), TupleState::Aborting);
}

#[test]
fn test_join_pairs_and_retract() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = JoinNode::new(parity_joiners(), 0, 0);

    let l1 = input(&mut tuples, 1, 1);
    let l2 = input(&mut tuples, 2, 1);
    let r3 = input(&mut tuples, 3, 1);
    let r5 = input(&mut tuples, 5, 1);
    node.insert(Side::Left, l1, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.insert(Side::Left, l2, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.insert(Side::Right, r3, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.insert(Side::Right, r5, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();

    // odd left 1 pairs with both odd rights
    assert_eq!(queue.len(), 2);
    let pair = tuples.facts(queue[0]).unwrap().clone();
    assert_eq!((value_of(&pair, 0), value_of(&pair, 1)), (1, 3));
    settle_queue(&mut tuples, &mut queue);

    node.retract(Side::Left, l1, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().all(|t| tuples.state(*t).unwrap() == TupleState::Dying));
}

#[test]
fn test_join_rekeys_on_update() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = JoinNode::new(parity_joiners(), 0, 0);

    let l = input(&mut tuples, 1, 1);
    let r = input(&mut tuples, 2, 1);
    node.insert(Side::Left, l, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.insert(Side::Right, r, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert!(queue.is_empty());

    set_input(&mut tuples, l, 4);
    node.update(Side::Left, l, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 1);
    let pair = tuples.facts(queue[0]).unwrap().clone();
    assert_eq!((value_of(&pair, 0), value_of(&pair, 1)), (4, 2));
}

#[test]
fn test_not_exists_propagates_zero_transitions_only() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = ExistsNode::new(ExistenceMode::NotExists, parity_joiners(), 0, 0);

    let left = input(&mut tuples, 1, 1);
    node.insert(Side::Left, left, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 1);
    let out = queue[0];
    settle_queue(&mut tuples, &mut queue);

    let r1 = input(&mut tuples, 3, 1);
    let r2 = input(&mut tuples, 7, 1);
    node.insert(Side::Right, r1, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(tuples.state(out).unwrap(), TupleState::Dying);
    settle_queue(&mut tuples, &mut queue);

    node.insert(Side::Right, r2, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.retract(Side::Right, r1, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert!(queue.is_empty());

    node.retract(Side::Right, r2, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(tuples.state(queue[0]).unwrap(), TupleState::Creating);
}

#[test]
fn test_group_emits_once_per_settle() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let key: ErasedFn<Value> = Arc::new(|facts: &[Value]| Value::key(value_of(facts, 0) % 2));
    let mut node = GroupNode::new(Some(key), Some(erase_collector::<(i64,), _>(count())), 0);

    let inputs: Vec<TupleId> = (1..=3).map(|v| input(&mut tuples, v, 1)).collect();
    for &t in &inputs {
        node.insert(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    }
    assert!(queue.is_empty());
    node.settle(&mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 2);

    let odd = queue
        .iter()
        .copied()
        .find(|t| tuples.facts(*t).unwrap()[0] == Value::key(1i64))
        .unwrap();
    assert_eq!(tuples.facts(odd).unwrap()[1], Value::data(2usize));
    settle_queue(&mut tuples, &mut queue);

    // moving 3 to the even group changes both counts
    set_input(&mut tuples, inputs[2], 4);
    node.update(inputs[2], &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.settle(&mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().all(|t| tuples.state(*t).unwrap() == TupleState::Updating));
    settle_queue(&mut tuples, &mut queue);

    // a retract and re-insert of the same contribution nets out
    node.retract(inputs[0], &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.insert(inputs[0], &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.settle(&mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert!(queue.is_empty());
}

#[test]
fn test_group_retracts_emptied_group() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = GroupNode::new(None, Some(erase_collector::<(i64,), _>(count())), 0);

    let t = input(&mut tuples, 1, 1);
    node.insert(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.settle(&mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    let out = queue[0];
    settle_queue(&mut tuples, &mut queue);

    node.retract(t, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.settle(&mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue, vec![out]);
    assert_eq!(tuples.state(out).unwrap(), TupleState::Dying);
}

#[test]
fn test_distinct_counts_contributors() {
    let mut tuples = TupleArena::new();
    let mut queue = Vec::new();
    let mut node = DistinctNode::new(0);

    let a = input(&mut tuples, 7, 1);
    let b = input(&mut tuples, 7, 1);
    node.insert(a, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    node.insert(b, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue.len(), 1);
    let out = queue[0];
    settle_queue(&mut tuples, &mut queue);

    node.retract(a, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert!(queue.is_empty());
    node.retract(b, &mut NodeContext::new(&mut tuples, &mut queue, 0)).unwrap();
    assert_eq!(queue, vec![out]);
}

#[test]
fn test_terminal_totals() {
    let spec = Arc::new(TerminalSpec {
        constraint_ref: ConstraintRef::new("", "Weighted"),
        impact: ImpactType::Penalty,
        weight: SimpleScore::of(2),
        weigher: Some(Arc::new(|facts: &[Value]| value_of(facts, 0))),
        justifier: None,
    });
    let mut node = TerminalNode::new(spec);
    let mut tuples = TupleArena::new();
    let t = input(&mut tuples, 3, 0);
    let u = input(&mut tuples, 1, 0);

    node.insert(t, tuples.facts(t).unwrap()).unwrap();
    node.insert(u, tuples.facts(u).unwrap()).unwrap();
    assert_eq!(node.total(), SimpleScore::of(-8));

    set_input(&mut tuples, t, 5);
    node.update(t, tuples.facts(t).unwrap()).unwrap();
    assert_eq!(node.total(), SimpleScore::of(-12));

    node.retract(u).unwrap();
    assert_eq!(node.total(), SimpleScore::of(-10));
    assert_eq!(node.match_count(), 1);
    assert_eq!(node.recount().unwrap(), node.total());
    assert!(node.retract(u).is_err());
}

#[test]
fn test_terminal_overflow() {
    let spec = Arc::new(TerminalSpec {
        constraint_ref: ConstraintRef::new("", "Huge"),
        impact: ImpactType::Reward,
        weight: SimpleScore::of(i64::MAX),
        weigher: Some(Arc::new(|_: &[Value]| 2)),
        justifier: None,
    });
    let mut node = TerminalNode::new(spec);
    let mut tuples = TupleArena::new();
    let t = input(&mut tuples, 1, 0);
    let facts: Facts = tuples.facts(t).unwrap().clone();

    let err = node.insert(t, &facts).unwrap_err();
    assert!(matches!(err, scorenet_core::ScoreNetError::ScoreOverflow { .. }));
}

#[test]
fn test_instantiate_requires_inputs() {
    let spec: NodeSpec<SimpleScore> = NodeSpec::Stream(StreamOp::Filter(positive()));
    assert!(NodeKind::instantiate(&spec, &[]).is_err());
    assert!(NodeKind::instantiate(&spec, &[0]).is_ok());
}
