//! Properties every incremental score must satisfy regardless of the order
//! and shape of the changes that produced it.

mod common;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scorenet_config::NetworkConfig;
use scorenet_core::{HardSoftScore, Score};
use scorenet_scoring::stream::joiner::equal;
use scorenet_scoring::stream::ConstraintFactory;
use scorenet_scoring::{NetworkTemplate, ScoreSession};
use scorenet_test::entity::same_value_unique_pairs;
use scorenet_test::{Employee, Entity, Shift};

use common::{
    random_employee, random_shift, same_value_constraint, same_value_oracle, scheduling_oracle,
    SchedulingConstraints,
};

fn scheduling_session(config: &NetworkConfig) -> ScoreSession<HardSoftScore> {
    NetworkTemplate::from_provider(&SchedulingConstraints, config)
        .unwrap()
        .new_session()
        .unwrap()
}

fn random_plan(seed: u64, shifts: u32, employees: u32) -> (Vec<Shift>, Vec<Employee>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let shifts = (0..shifts).map(|id| random_shift(&mut rng, id)).collect();
    let employees = (0..employees).map(|id| random_employee(&mut rng, id)).collect();
    (shifts, employees)
}

fn load(session: &mut ScoreSession<HardSoftScore>, shifts: &[Shift], employees: &[Employee]) {
    for employee in employees {
        session.insert(employee.clone()).unwrap();
    }
    for shift in shifts {
        session.insert(shift.clone()).unwrap();
    }
}

#[test]
fn test_insert_then_retract_restores_previous_score() {
    let (shifts, employees) = random_plan(7, 20, 4);
    let mut session = scheduling_session(&NetworkConfig::new());
    load(&mut session, &shifts[..10], &employees);
    let before = session.calculate_score().unwrap();

    for shift in &shifts[10..] {
        session.insert(shift.clone()).unwrap();
    }
    session.calculate_score().unwrap();
    for shift in &shifts[10..] {
        session.retract(shift).unwrap();
    }

    assert_eq!(session.calculate_score().unwrap(), before);
    assert_eq!(session.fact_count(), 10 + employees.len());
}

#[test]
fn test_insert_and_retract_within_one_flush_is_invisible() {
    let (shifts, employees) = random_plan(8, 12, 3);
    let mut session = scheduling_session(&NetworkConfig::new());
    load(&mut session, &shifts, &employees);
    let before = session.calculate_score().unwrap();

    let extra = Shift::new(99, Some(0), 0, 12).with_skill("cook");
    session.insert(extra.clone()).unwrap();
    session.update(Shift::new(99, Some(1), 2, 14)).unwrap();
    session.retract(&extra).unwrap();

    assert_eq!(session.calculate_score().unwrap(), before);
}

#[test]
fn test_update_equals_retract_then_insert() {
    let (shifts, employees) = random_plan(9, 16, 4);
    let mut rng = ChaCha8Rng::seed_from_u64(90);
    let mut updated = scheduling_session(&NetworkConfig::new());
    let mut replaced = scheduling_session(&NetworkConfig::new());
    load(&mut updated, &shifts, &employees);
    load(&mut replaced, &shifts, &employees);

    for _ in 0..40 {
        let id = rng.random_range(0..shifts.len() as u32);
        let shift = random_shift(&mut rng, id);
        updated.update(shift.clone()).unwrap();
        replaced.retract(&shift).unwrap();
        replaced.insert(shift).unwrap();
        assert_eq!(updated.calculate_score().unwrap(), replaced.calculate_score().unwrap());
    }
}

#[test]
fn test_insertion_order_does_not_change_score() {
    let (shifts, employees) = random_plan(10, 25, 5);
    let expected = scheduling_oracle(&shifts, &employees);
    let mut rng = ChaCha8Rng::seed_from_u64(100);

    for _ in 0..5 {
        let mut shuffled = shifts.clone();
        shuffled.shuffle(&mut rng);
        let mut session = scheduling_session(&NetworkConfig::new());
        for shift in &shuffled {
            session.insert(shift.clone()).unwrap();
        }
        for employee in &employees {
            session.insert(employee.clone()).unwrap();
        }
        assert_eq!(session.calculate_score().unwrap(), expected);
    }
}

#[test]
fn test_flush_granularity_does_not_change_score() {
    let (shifts, employees) = random_plan(11, 20, 4);
    let mut eager = scheduling_session(&NetworkConfig::new());
    let mut lazy = scheduling_session(&NetworkConfig::new());

    for employee in &employees {
        eager.insert(employee.clone()).unwrap();
        eager.calculate_score().unwrap();
        lazy.insert(employee.clone()).unwrap();
    }
    for shift in &shifts {
        eager.insert(shift.clone()).unwrap();
        eager.calculate_score().unwrap();
        lazy.insert(shift.clone()).unwrap();
    }

    assert_eq!(eager.calculate_score().unwrap(), lazy.calculate_score().unwrap());
}

#[test]
fn test_node_sharing_is_transparent() {
    let (shifts, employees) = random_plan(12, 30, 5);
    let shared_config = NetworkConfig::new().with_justifications(true);
    let unshared_config = shared_config.clone().with_node_sharing(false);
    let shared_template = NetworkTemplate::from_provider(&SchedulingConstraints, &shared_config).unwrap();
    let unshared_template = NetworkTemplate::from_provider(&SchedulingConstraints, &unshared_config).unwrap();
    assert!(shared_template.node_count() < unshared_template.node_count());

    let mut shared = shared_template.new_session().unwrap();
    let mut unshared = unshared_template.new_session().unwrap();
    load(&mut shared, &shifts, &employees);
    load(&mut unshared, &shifts, &employees);

    let left = shared.explain().unwrap();
    let right = unshared.explain().unwrap();
    assert_eq!(left.score, right.score);
    for analysis in &left.constraint_analyses {
        let other = right.constraint(&analysis.constraint_ref.full_name()).unwrap();
        assert_eq!(analysis.score, other.score);
        assert_eq!(analysis.match_count, other.match_count);
    }
}

#[test]
fn test_constraint_scores_sum_to_total() {
    let (shifts, employees) = random_plan(13, 25, 5);
    let mut session = scheduling_session(&NetworkConfig::new());
    load(&mut session, &shifts, &employees);

    let total = session.calculate_score().unwrap();
    let names = session.template().constraint_names();
    let mut sum = HardSoftScore::zero();
    for name in &names {
        sum = sum + session.constraint_score(name).unwrap().unwrap();
    }
    assert_eq!(sum, total);
}

#[test]
fn test_same_value_pairs_follow_random_values() {
    let factory = ConstraintFactory::<HardSoftScore>::new();
    let unique = factory
        .for_each_unique_pair::<Entity>(equal(|e: &Entity| e.value.clone()))
        .penalize(HardSoftScore::of_soft(1))
        .as_constraint("Same value pair");
    let template =
        NetworkTemplate::build(vec![same_value_constraint(&factory), unique], &NetworkConfig::new()).unwrap();
    let mut session = template.new_session().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let mut entities: Vec<Entity> = (0..12).map(|id| Entity::new(id, "X")).collect();
    for entity in &entities {
        session.insert(entity.clone()).unwrap();
    }

    for _ in 0..60 {
        let index = rng.random_range(0..entities.len());
        let value = ["X", "Y", "Z"][rng.random_range(0..3)];
        entities[index] = Entity::new(entities[index].id, value);
        session.update(entities[index].clone()).unwrap();

        let expected = same_value_oracle(&entities)
            + HardSoftScore::of_soft(-same_value_unique_pairs(&entities));
        assert_eq!(session.calculate_score().unwrap(), expected);
    }
}
