//! Tests for score sessions.

use scorenet_config::{EnvironmentMode, NetworkConfig};
use scorenet_core::{HardSoftScore, PlanningId, ScoreNetError, SimpleScore};

use super::{ScoreSession, SessionState};
use crate::stream::collector::{count, max, sum};
use crate::stream::joiner::{equal, equal_bi, less_than};
use crate::stream::{Constraint, ConstraintFactory};
use crate::NetworkTemplate;

#[derive(Debug, Clone)]
struct Entity {
    id: u32,
    value: &'static str,
}

impl PlanningId for Entity {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone)]
struct Shift {
    id: u32,
    employee: u32,
    hours: i64,
}

impl PlanningId for Shift {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

fn entity(id: u32, value: &'static str) -> Entity {
    Entity { id, value }
}

fn shift(id: u32, employee: u32, hours: i64) -> Shift {
    Shift { id, employee, hours }
}

fn session_of<Sc: scorenet_core::ParseableScore>(
    constraints: Vec<Constraint<Sc>>,
    config: &NetworkConfig,
) -> ScoreSession<Sc> {
    NetworkTemplate::build(constraints, config)
        .unwrap()
        .new_session()
        .unwrap()
}

fn same_value_pairs(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    factory
        .for_each::<Entity>()
        .join(factory.for_each::<Entity>(), equal(|e: &Entity| e.value))
        .filter(|a: &Entity, b: &Entity| a.id != b.id)
        .penalize(HardSoftScore::of_hard(1))
        .as_constraint("Same value")
}

#[test]
fn test_ordered_pairs_scenario() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);

    session.insert(entity(2, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-2));

    session.update(entity(2, "Y")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);

    session.retract(&entity(1, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
}

#[test]
fn test_unique_pair_scenario() {
    let factory = ConstraintFactory::<HardSoftScore>::new();
    let conflict = factory
        .for_each_unique_pair::<Entity>(equal(|e: &Entity| e.value))
        .penalize(HardSoftScore::of_hard(1))
        .as_constraint("Same value");
    let mut session = session_of(vec![conflict], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-1));

    session.insert(entity(3, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-3));
}

#[test]
fn test_self_join_includes_identity_pairs() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let pairs = factory
        .for_each::<Entity>()
        .join(factory.for_each::<Entity>(), equal(|e: &Entity| e.value))
        .penalize(SimpleScore::of(1))
        .as_constraint("Pairs");
    let mut session = session_of(vec![pairs], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-4));
}

#[test]
fn test_protocol_errors() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    assert!(matches!(
        session.insert(entity(1, "Y")),
        Err(ScoreNetError::FactAlreadyTracked { .. })
    ));
    assert!(matches!(
        session.update(entity(9, "Y")),
        Err(ScoreNetError::FactNotTracked { .. })
    ));
    assert!(matches!(
        session.retract(&entity(9, "Y")),
        Err(ScoreNetError::FactNotTracked { .. })
    ));
    // protocol errors leave the session usable
    assert_eq!(session.state(), SessionState::Dirty);
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
}

#[test]
fn test_state_and_lookup() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());
    assert_eq!(session.state(), SessionState::Idle);

    session.insert(entity(1, "X")).unwrap();
    assert_eq!(session.state(), SessionState::Dirty);
    assert!(session.contains::<Entity>(&1));
    assert!(!session.contains::<Shift>(&1));

    session.update(entity(1, "Z")).unwrap();
    assert_eq!(session.get::<Entity>(&1).unwrap().value, "Z");

    session.calculate_score().unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.fact_count(), 1);
}

#[test]
fn test_insert_then_retract_cancels() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    session.retract(&entity(2, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
    assert!(!session.contains::<Entity>(&2));

    // one source tuple and the (1, 1) join pair
    assert_eq!(session.tuple_count(), 2);
}

#[test]
fn test_facts_without_constraints_are_tracked() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(shift(1, 1, 8)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
    assert_eq!(session.fact_count(), 1);
    assert_eq!(session.tuple_count(), 0);
    session.retract(&shift(1, 1, 8)).unwrap();
}

#[test]
fn test_group_by_sum_over_limit() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let overtime = factory
        .for_each::<Shift>()
        .group_by(|s: &Shift| s.employee, sum(|s: &Shift| s.hours))
        .filter(|_: &u32, hours: &i64| *hours > 10)
        .penalize_with(SimpleScore::of(1), |_: &u32, hours: &i64| hours - 10)
        .as_constraint("Overtime");
    let mut session = session_of(vec![overtime], &NetworkConfig::default());

    session.insert(shift(1, 7, 8)).unwrap();
    session.insert(shift(2, 7, 5)).unwrap();
    session.insert(shift(3, 8, 8)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-3));

    session.update(shift(2, 8, 5)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-3));

    session.retract(&shift(3, 8, 8)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::ZERO);
}

#[test]
fn test_group_by_collector_and_max() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let total = factory
        .for_each::<Shift>()
        .group_by_collector(count())
        .reward_with(SimpleScore::of(1), |n: &usize| *n as i64)
        .as_constraint("Shift count");
    let longest = factory
        .for_each::<Shift>()
        .group_by(|s: &Shift| s.employee, max(|s: &Shift| s.hours))
        .penalize_with(SimpleScore::of(1), |_: &u32, hours: &Option<i64>| hours.unwrap_or(0))
        .as_constraint("Longest shift");
    let mut session = session_of(vec![total, longest], &NetworkConfig::default());

    session.insert(shift(1, 1, 4)).unwrap();
    session.insert(shift(2, 1, 9)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(2 - 9));

    session.retract(&shift(2, 1, 9)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(1 - 4));

    session.retract(&shift(1, 1, 4)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::ZERO);
}

#[test]
fn test_if_not_exists_other() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let alone = factory
        .for_each::<Shift>()
        .if_not_exists_other(equal(|s: &Shift| s.employee))
        .penalize(SimpleScore::of(1))
        .as_constraint("Alone");
    let mut session = session_of(vec![alone], &NetworkConfig::default());

    session.insert(shift(1, 1, 1)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1));
    session.insert(shift(2, 1, 1)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::ZERO);
    session.update(shift(2, 2, 1)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-2));
}

#[test]
fn test_map_flatten_and_distinct() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let employees = factory
        .for_each::<Shift>()
        .map(|s: &Shift| s.employee)
        .distinct()
        .penalize(SimpleScore::of(1))
        .as_constraint("Employees");
    let hours = factory
        .for_each::<Shift>()
        .flatten_last(|s: &Shift| 0..s.hours)
        .penalize(SimpleScore::of(10))
        .as_constraint("Hours");
    let mut session = session_of(vec![employees, hours], &NetworkConfig::default());

    session.insert(shift(1, 1, 2)).unwrap();
    session.insert(shift(2, 1, 1)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1 - 30));

    session.update(shift(2, 2, 3)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-2 - 50));
}

#[test]
fn test_exists_and_grouping_on_wider_streams() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let listed_pairs = factory
        .for_each_unique_pair::<Shift>(equal(|s: &Shift| s.employee))
        .if_exists(
            factory.for_each::<Entity>(),
            equal_bi(|a: &Shift, _: &Shift| a.employee, |e: &Entity| e.id),
        )
        .group_by(|a: &Shift, _: &Shift| a.employee, count())
        .penalize_with(SimpleScore::of(1), |_: &u32, pairs: &usize| *pairs as i64)
        .as_constraint("Listed pairs");
    let listed_triples = factory
        .for_each_unique_pair::<Shift>(equal(|s: &Shift| s.employee))
        .join(
            factory.for_each::<Entity>(),
            equal_bi(|a: &Shift, _: &Shift| a.employee, |e: &Entity| e.id),
        )
        .group_by_collector(count())
        .reward_with(SimpleScore::of(10), |n: &usize| *n as i64)
        .as_constraint("Listed triples");
    let mut session = session_of(vec![listed_pairs, listed_triples], &NetworkConfig::default());

    for (id, employee) in [(1, 1), (2, 1), (3, 1), (4, 2)] {
        session.insert(shift(id, employee, 4)).unwrap();
    }
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::ZERO);

    session.insert(entity(1, "A")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-3 + 30));

    session.insert(entity(2, "B")).unwrap();
    session.insert(shift(5, 2, 4)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-4 + 40));

    session.retract(&entity(1, "A")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1 + 10));
}

#[test]
fn test_concat_and_complement() {
    for node_sharing in [true, false] {
        let factory = ConstraintFactory::<SimpleScore>::new();
        let reviewed = factory
            .for_each::<Shift>()
            .filter(|s: &Shift| s.hours > 8)
            .concat(factory.for_each::<Shift>().filter(|s: &Shift| s.employee == 0))
            .penalize(SimpleScore::of(1))
            .as_constraint("Reviewed");
        let everyone = factory
            .for_each::<Shift>()
            .filter(|s: &Shift| s.hours > 8)
            .complement()
            .penalize(SimpleScore::of(100))
            .as_constraint("Everyone");
        let entities = factory.for_each::<Entity>();
        let doubled = entities
            .clone()
            .concat(entities)
            .penalize(SimpleScore::of(1000))
            .as_constraint("Doubled");
        let config = NetworkConfig::default().with_node_sharing(node_sharing);
        let mut session = session_of(vec![reviewed, everyone, doubled], &config);

        session.insert(shift(1, 0, 10)).unwrap();
        assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-2 - 100));

        session.insert(shift(2, 3, 4)).unwrap();
        assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-2 - 200));

        session.update(shift(1, 3, 4)).unwrap();
        assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-200));

        session.update(shift(2, 0, 4)).unwrap();
        session.retract(&shift(1, 3, 4)).unwrap();
        assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1 - 100));

        session.insert(entity(1, "A")).unwrap();
        assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1 - 100 - 2000));
        session.retract(&entity(1, "A")).unwrap();
        assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1 - 100));
    }
}

#[test]
fn test_comparison_joiner() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let shorter = factory
        .for_each::<Shift>()
        .join(
            factory.for_each::<Shift>(),
            less_than(|a: &Shift| a.hours, |b: &Shift| b.hours),
        )
        .penalize(SimpleScore::of(1))
        .as_constraint("Shorter");
    let mut session = session_of(vec![shorter], &NetworkConfig::default());

    for (id, hours) in [(1, 3), (2, 5), (3, 5), (4, 8)] {
        session.insert(shift(id, 0, hours)).unwrap();
    }
    // 3<5, 3<5, 3<8, 5<8, 5<8
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-5));
}

#[test]
fn test_explain_with_justifications() {
    let factory = ConstraintFactory::<HardSoftScore>::new();
    let conflict = factory
        .for_each_unique_pair::<Entity>(equal(|e: &Entity| e.value))
        .penalize(HardSoftScore::of_hard(1))
        .justify_with(|a: &Entity, b: &Entity| format!("{} and {} share {}", a.id, b.id, a.value))
        .as_constraint("Same value");
    let config = NetworkConfig::default().with_justifications(true);
    let mut session = session_of(vec![conflict], &config);

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    let explanation = session.explain().unwrap();

    assert_eq!(explanation.score, HardSoftScore::of_hard(-1));
    let analysis = explanation.constraint("Same value").unwrap();
    assert!(analysis.is_hard);
    assert_eq!(analysis.match_count(), 1);
    assert_eq!(analysis.matches[0].justification.description, "1 and 2 share X");
    assert_eq!(analysis.matches[0].justification.entities.len(), 2);
}

#[test]
fn test_explain_without_justifications_counts_only() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    let explanation = session.explain().unwrap();

    assert_eq!(explanation.total_match_count(), 2);
    assert!(explanation.all_matches().is_empty());
}

#[test]
fn test_indictments() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let long = factory
        .for_each::<Shift>()
        .penalize_with(SimpleScore::of(1), |s: &Shift| s.hours)
        .as_constraint("Hours");
    let mut session = session_of(vec![long], &NetworkConfig::default());

    session.insert(shift(1, 1, 4)).unwrap();
    session.insert(shift(2, 1, 9)).unwrap();
    let indictments = session.indictments().unwrap();

    assert_eq!(indictments.len(), 2);
    let worst = indictments.worst_entities()[0];
    assert_eq!(worst.as_entity::<Shift>().unwrap().id, 2);
    assert_eq!(
        indictments.get_fact(&shift(1, 1, 4)).unwrap().score,
        SimpleScore::of(-4)
    );
}

#[test]
fn test_overflow_corrupts_session() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let huge = factory
        .for_each::<Shift>()
        .penalize_with(SimpleScore::of(i64::MAX), |s: &Shift| s.hours)
        .as_constraint("Huge");
    let mut session = session_of(vec![huge], &NetworkConfig::default());

    session.insert(shift(1, 1, 2)).unwrap();
    assert!(matches!(
        session.calculate_score(),
        Err(ScoreNetError::ScoreOverflow { .. })
    ));
    assert_eq!(session.state(), SessionState::Corrupted);
    assert!(matches!(
        session.insert(shift(2, 1, 1)),
        Err(ScoreNetError::SessionCorrupted)
    ));
    assert!(matches!(
        session.calculate_score(),
        Err(ScoreNetError::SessionCorrupted)
    ));
}

#[test]
fn test_asserted_modes_accept_consistent_sessions() {
    for mode in [EnvironmentMode::FastAssert, EnvironmentMode::FullAssert] {
        let factory = ConstraintFactory::new();
        let config = NetworkConfig::default().with_environment_mode(mode);
        let mut session = session_of(vec![same_value_pairs(&factory)], &config);

        session.insert(entity(1, "X")).unwrap();
        session.insert(entity(2, "X")).unwrap();
        session.insert(entity(3, "Y")).unwrap();
        assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-2));
        session.update(entity(3, "X")).unwrap();
        assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-6));
    }
}

#[test]
fn test_reset_keeps_network() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    session.calculate_score().unwrap();
    session.reset().unwrap();

    assert_eq!(session.fact_count(), 0);
    assert_eq!(session.tuple_count(), 0);
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_hard(-2));
    session.close();
}

#[test]
fn test_constraint_score() {
    let factory = ConstraintFactory::new();
    let mut session = session_of(vec![same_value_pairs(&factory)], &NetworkConfig::default());

    session.insert(entity(1, "X")).unwrap();
    session.insert(entity(2, "X")).unwrap();
    assert_eq!(
        session.constraint_score("Same value").unwrap(),
        Some(HardSoftScore::of_hard(-2))
    );
    assert_eq!(session.constraint_score("Missing").unwrap(), None);
}
