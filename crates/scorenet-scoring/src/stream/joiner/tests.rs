use smallvec::smallvec;

use super::*;
use crate::value::Facts;

#[derive(Debug)]
struct Shift {
    id: u32,
    employee: u32,
    start: i64,
    end: i64,
}

impl scorenet_core::PlanningId for Shift {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

fn shift(id: u32, employee: u32, start: i64, end: i64) -> Facts {
    smallvec![Value::fact(Shift {
        id,
        employee,
        start,
        end
    })]
}

#[test]
fn test_equal_uses_same_key_both_sides() {
    let set = JoinerSet::new(equal(|s: &Shift| s.employee).parts);
    let a = shift(1, 7, 0, 8);
    let b = shift(2, 7, 8, 16);
    assert_eq!(set.left_key(&a), set.right_key(&b));
    assert_ne!(set.left_key(&a), set.right_key(&shift(3, 8, 0, 8)));
    assert!(!set.has_filter());
}

#[test]
fn test_comparison_keys_and_flip() {
    let joiner: Joiner<(Shift,), Shift> =
        less_than(|a: &Shift| a.start, |b: &Shift| b.end);
    let set = JoinerSet::new(joiner.parts);
    assert_eq!(&*set.left_comparisons(), &[Comparison::Less]);
    assert_eq!(&*set.right_comparisons(), &[Comparison::Greater]);

    let key = set.left_key(&shift(1, 1, 5, 9));
    assert!(key.equal.is_empty());
    assert_eq!(key.compare[0], Value::ordered(5i64));
}

#[test]
fn test_filter_sees_concatenated_facts() {
    let joiner: Joiner<(Shift,), Shift> = filtering(|a: &Shift, b: &Shift| a.end > b.start);
    let set = JoinerSet::new(joiner.parts);
    assert!(set.has_filter());

    let mut combined = shift(1, 1, 0, 10);
    combined.extend(shift(2, 1, 5, 12));
    assert!(set.test(&combined));

    let mut disjoint = shift(1, 1, 0, 4);
    disjoint.extend(shift(2, 1, 5, 12));
    assert!(!set.test(&disjoint));
}

#[test]
fn test_and_preserves_order() {
    let joiner = equal(|s: &Shift| s.employee)
        .and(greater_than(|a: &Shift| a.start, |b: &Shift| b.start))
        .and(filtering(|a: &Shift, b: &Shift| a.id != b.id));
    assert_eq!(joiner.len(), 3);

    let set = JoinerSet::new(joiner.parts);
    let key = set.right_key(&shift(4, 2, 3, 6));
    assert_eq!(key.equal.len(), 1);
    assert_eq!(key.compare.len(), 1);
}

#[test]
fn test_cross_has_empty_key() {
    let joiner: Joiner<(Shift,), Shift> = Joiner::cross();
    assert!(joiner.is_empty());
    let set = JoinerSet::new(joiner.parts);
    assert_eq!(set.left_key(&shift(1, 1, 0, 1)), IndexKey::default());
    assert!(set.signature().is_empty());
}

#[test]
fn test_signature_tracks_closure_identity() {
    let joiner = equal(|s: &Shift| s.employee);
    let a = JoinerSet::new(joiner.parts.clone());
    let b = JoinerSet::new(joiner.parts);
    assert_eq!(a.signature(), b.signature());

    let c = JoinerSet::new(equal(|s: &Shift| s.employee).parts);
    assert_ne!(a.signature(), c.signature());
}
