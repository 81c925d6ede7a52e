//! Employee scheduling fixtures.
//!
//! Shifts are the changing facts; employees are mostly fixed. The naive
//! score functions recompute every constraint from scratch.

use std::collections::{BTreeMap, BTreeSet};

use scorenet_core::PlanningId;

/// An employee that shifts can be assigned to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    /// Skills the employee has.
    pub skills: Vec<String>,
}

impl Employee {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            skills: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }
}

impl PlanningId for Employee {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// A shift covering `[start, end)` hours.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shift {
    pub id: u32,
    pub employee: Option<u32>,
    pub start: i64,
    pub end: i64,
    pub required_skill: String,
}

impl Shift {
    pub fn new(id: u32, employee: Option<u32>, start: i64, end: i64) -> Self {
        Self {
            id,
            employee,
            start,
            end,
            required_skill: String::new(),
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.required_skill = skill.into();
        self
    }

    pub fn hours(&self) -> i64 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Shift) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl PlanningId for Shift {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// Shifts without an employee.
pub fn unassigned_shifts(shifts: &[Shift]) -> i64 {
    shifts.iter().filter(|s| s.employee.is_none()).count() as i64
}

/// Unordered pairs of overlapping shifts assigned to the same employee.
pub fn overlapping_pairs(shifts: &[Shift]) -> i64 {
    let mut pairs = 0;
    for (i, a) in shifts.iter().enumerate() {
        for b in &shifts[i + 1..] {
            if a.employee.is_some() && a.employee == b.employee && a.overlaps(b) {
                pairs += 1;
            }
        }
    }
    pairs
}

/// Hours above `limit` summed over employees.
pub fn overtime_hours(shifts: &[Shift], limit: i64) -> i64 {
    let mut hours: BTreeMap<u32, i64> = BTreeMap::new();
    for shift in shifts {
        if let Some(employee) = shift.employee {
            *hours.entry(employee).or_default() += shift.hours();
        }
    }
    hours.values().map(|h| (h - limit).max(0)).sum()
}

/// Assigned shifts whose employee is tracked but lacks the required skill.
pub fn missing_skill(shifts: &[Shift], employees: &[Employee]) -> i64 {
    shifts
        .iter()
        .filter(|s| !s.required_skill.is_empty())
        .filter_map(|s| {
            let employee = employees.iter().find(|e| Some(e.id) == s.employee)?;
            Some(!employee.skills.contains(&s.required_skill))
        })
        .filter(|missing| *missing)
        .count() as i64
}

/// Assigned shifts whose employee is not tracked.
pub fn unknown_employee(shifts: &[Shift], employees: &[Employee]) -> i64 {
    shifts
        .iter()
        .filter(|s| {
            s.employee
                .is_some_and(|id| !employees.iter().any(|e| e.id == id))
        })
        .count() as i64
}

/// Number of distinct employees with at least one shift.
pub fn busy_employees(shifts: &[Shift]) -> i64 {
    shifts
        .iter()
        .filter_map(|s| s.employee)
        .collect::<BTreeSet<_>>()
        .len() as i64
}

/// Longest shift per employee, summed over employees.
pub fn longest_shift_hours(shifts: &[Shift]) -> i64 {
    let mut longest: BTreeMap<u32, i64> = BTreeMap::new();
    for shift in shifts {
        if let Some(employee) = shift.employee {
            let entry = longest.entry(employee).or_insert(i64::MIN);
            *entry = (*entry).max(shift.hours());
        }
    }
    longest.values().sum()
}
