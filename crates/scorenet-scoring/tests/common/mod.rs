//! Constraint sets and oracle scores shared by the integration tests.

#![allow(dead_code)]

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use scorenet_core::{Fact, HardSoftScore, Result};
use scorenet_scoring::stream::collector::{max, sum};
use scorenet_scoring::stream::joiner::{equal, equal_bi, greater_than, less_than};
use scorenet_scoring::stream::{Constraint, ConstraintFactory, ConstraintProvider};
use scorenet_scoring::ScoreSession;
use scorenet_test::entity::{same_value_ordered_pairs, Entity};
use scorenet_test::scheduling::{
    busy_employees, longest_shift_hours, missing_skill, overlapping_pairs, overtime_hours,
    unassigned_shifts, unknown_employee, Employee, Shift,
};
use scorenet_test::Op;

pub const OVERTIME_LIMIT: i64 = 10;

/// Shifts at least this long are reviewed.
pub const LONG_SHIFT: i64 = 6;

const SKILLS: [&str; 3] = ["", "nurse", "cook"];

/// Employee scheduling constraints covering every operator kind.
pub struct SchedulingConstraints;

impl ConstraintProvider<HardSoftScore> for SchedulingConstraints {
    fn define_constraints(&self, factory: &ConstraintFactory<HardSoftScore>) -> Vec<Constraint<HardSoftScore>> {
        let assigned = factory
            .for_each::<Shift>()
            .filter(|s: &Shift| s.employee.is_some());

        vec![
            factory
                .for_each::<Shift>()
                .filter(|s: &Shift| s.employee.is_none())
                .penalize(HardSoftScore::of_soft(1))
                .as_constraint("Unassigned shift"),
            factory
                .for_each_unique_pair::<Shift>(
                    equal(|s: &Shift| s.employee)
                        .and(less_than(|a: &Shift| a.start, |b: &Shift| b.end))
                        .and(greater_than(|a: &Shift| a.end, |b: &Shift| b.start)),
                )
                .filter(|a: &Shift, _: &Shift| a.employee.is_some())
                .penalize(HardSoftScore::of_hard(1))
                .as_constraint("Overlapping shifts"),
            assigned
                .clone()
                .group_by(|s: &Shift| s.employee, sum(|s: &Shift| s.hours()))
                .filter(|_: &Option<u32>, hours: &i64| *hours > OVERTIME_LIMIT)
                .penalize_with(HardSoftScore::of_soft(1), |_: &Option<u32>, hours: &i64| {
                    hours - OVERTIME_LIMIT
                })
                .as_constraint("Overtime"),
            assigned
                .clone()
                .map(|s: &Shift| s.employee)
                .distinct()
                .reward(HardSoftScore::of_soft(1))
                .as_constraint("Busy employee"),
            assigned
                .clone()
                .filter(|s: &Shift| !s.required_skill.is_empty())
                .join(
                    factory.for_each::<Employee>(),
                    equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id)),
                )
                .filter(|s: &Shift, e: &Employee| !e.skills.contains(&s.required_skill))
                .penalize(HardSoftScore::of_hard(1))
                .as_constraint("Missing skill"),
            assigned
                .clone()
                .if_not_exists(
                    factory.for_each::<Employee>(),
                    equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id)),
                )
                .penalize(HardSoftScore::of_hard(1))
                .as_constraint("Unknown employee"),
            factory
                .for_each::<Shift>()
                .filter(|s: &Shift| s.employee.is_none())
                .concat(factory.for_each::<Shift>().filter(|s: &Shift| s.hours() >= LONG_SHIFT))
                .penalize(HardSoftScore::of_soft(1))
                .as_constraint("Shift review"),
            factory
                .for_each::<Employee>()
                .if_exists(
                    assigned.clone(),
                    equal_bi(|e: &Employee| Some(e.id), |s: &Shift| s.employee),
                )
                .complement()
                .reward_with(HardSoftScore::of_soft(1), |e: &Employee| e.skills.len() as i64)
                .as_constraint("Roster skills"),
            assigned
                .group_by(|s: &Shift| s.employee, max(|s: &Shift| s.hours()))
                .penalize_with(HardSoftScore::of_soft(1), |_: &Option<u32>, longest: &Option<i64>| {
                    longest.unwrap_or(0)
                })
                .as_constraint("Longest shift"),
        ]
    }
}

/// The score of [`SchedulingConstraints`], recomputed from scratch.
pub fn scheduling_oracle(shifts: &[Shift], employees: &[Employee]) -> HardSoftScore {
    let hard = overlapping_pairs(shifts) + missing_skill(shifts, employees) + unknown_employee(shifts, employees);
    let reviewed = unassigned_shifts(shifts) + shifts.iter().filter(|s| s.hours() >= LONG_SHIFT).count() as i64;
    let roster_skills: i64 = employees.iter().map(|e| e.skills.len() as i64).sum();
    let soft = -unassigned_shifts(shifts) - overtime_hours(shifts, OVERTIME_LIMIT) + busy_employees(shifts)
        - longest_shift_hours(shifts)
        - reviewed
        + roster_skills;
    HardSoftScore::of(-hard, soft)
}

pub fn same_value_constraint(factory: &ConstraintFactory<HardSoftScore>) -> Constraint<HardSoftScore> {
    factory
        .for_each::<Entity>()
        .join(factory.for_each::<Entity>(), equal(|e: &Entity| e.value.clone()))
        .filter(|a: &Entity, b: &Entity| a.id != b.id)
        .penalize(HardSoftScore::of_hard(1))
        .as_constraint("Same value")
}

pub fn same_value_oracle(entities: &[Entity]) -> HardSoftScore {
    HardSoftScore::of_hard(-same_value_ordered_pairs(entities))
}

pub fn random_shift(rng: &mut ChaCha8Rng, id: u32) -> Shift {
    let employee = rng.random_bool(0.8).then(|| rng.random_range(0..5));
    let start = rng.random_range(0..20);
    let end = start + rng.random_range(1..9);
    Shift::new(id, employee, start, end).with_skill(SKILLS[rng.random_range(0..SKILLS.len())])
}

pub fn random_employee(rng: &mut ChaCha8Rng, id: u32) -> Employee {
    let mut employee = Employee::new(id, format!("employee-{}", id));
    for skill in &SKILLS[1..] {
        if rng.random_bool(0.5) {
            employee = employee.with_skill(*skill);
        }
    }
    employee
}

/// Replays one operation into a session.
pub fn apply<T: Fact + Clone>(session: &mut ScoreSession<HardSoftScore>, op: &Op<T>) -> Result<()> {
    match op {
        Op::Insert(fact) => session.insert(fact.clone()),
        Op::Update(fact) => session.update(fact.clone()),
        Op::Retract(fact) => session.retract(fact),
    }
}
