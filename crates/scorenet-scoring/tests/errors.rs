//! Configuration driven builds and the errors they report.

use scorenet_config::{EnvironmentMode, NetworkConfig};
use scorenet_core::{HardSoftScore, ScoreNetError, SimpleScore};
use scorenet_scoring::stream::joiner::equal;
use scorenet_scoring::stream::{Constraint, ConstraintFactory};
use scorenet_scoring::{ConstraintWeightOverrides, NetworkTemplate, SessionState};
use scorenet_test::{Employee, Shift};

fn constraints() -> Vec<Constraint<HardSoftScore>> {
    let factory = ConstraintFactory::<HardSoftScore>::new();
    vec![
        factory
            .for_each::<Shift>()
            .filter(|s: &Shift| s.employee.is_none())
            .penalize(HardSoftScore::of_soft(1))
            .as_constraint("Unassigned shift"),
        factory
            .for_each_unique_pair::<Shift>(equal(|s: &Shift| s.employee))
            .filter(|a: &Shift, b: &Shift| a.employee.is_some() && a.overlaps(b))
            .penalize(HardSoftScore::of_hard(1))
            .as_constraint_in("scheduling", "Overlapping shifts"),
    ]
}

#[test]
fn test_toml_config_drives_weights_and_modes() {
    let config = NetworkConfig::from_toml_str(
        r#"
        environment_mode = "fast_assert"
        node_sharing = false
        justifications = true

        [constraint_weights]
        "Unassigned shift" = "0hard/3soft"
        "scheduling/Overlapping shifts" = "2hard/0soft"
        "#,
    )
    .unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);

    let template = NetworkTemplate::build(constraints(), &config).unwrap();
    let mut session = template.new_session().unwrap();
    session.insert(Shift::new(1, None, 0, 8)).unwrap();
    session.insert(Shift::new(2, Some(1), 0, 8)).unwrap();
    session.insert(Shift::new(3, Some(1), 4, 12)).unwrap();

    let explanation = session.explain().unwrap();
    assert_eq!(explanation.score, HardSoftScore::of(-2, -3));
    let overlap = explanation.constraint("scheduling/Overlapping shifts").unwrap();
    assert_eq!(overlap.match_count, 1);
    assert_eq!(overlap.matches.len(), 1);
}

#[test]
fn test_yaml_config_parses() {
    let config = NetworkConfig::from_yaml_str(
        "environment_mode: full_assert\nconstraint_weights:\n  Unassigned shift: 0hard/2soft\n",
    )
    .unwrap();
    assert!(config.environment_mode.is_fully_asserted());
    assert!(config.node_sharing);

    let template = NetworkTemplate::build(constraints(), &config).unwrap();
    let mut session = template.new_session().unwrap();
    session.insert(Shift::new(1, None, 0, 8)).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_soft(-2));
}

#[test]
fn test_unparsable_weight_fails_build() {
    let config = NetworkConfig::new().with_constraint_weight("Unassigned shift", "lots");

    let err = NetworkTemplate::build(constraints(), &config).unwrap_err();

    match err {
        ScoreNetError::ConstraintDefinition { constraint, .. } => {
            assert_eq!(constraint, "Unassigned shift");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_constraint_fails_build() {
    let mut all = constraints();
    all.extend(constraints());

    let err = NetworkTemplate::build(all, &NetworkConfig::new()).unwrap_err();

    assert!(matches!(err, ScoreNetError::ConstraintDefinition { .. }));
}

#[test]
fn test_overrides_disable_constraints() {
    let mut overrides = ConstraintWeightOverrides::new();
    overrides.put("Unassigned shift", HardSoftScore::ZERO);

    let template = NetworkTemplate::build_with_overrides(constraints(), &NetworkConfig::new(), &overrides).unwrap();

    assert_eq!(template.constraint_count(), 1);
    assert_eq!(template.constraint_names(), vec!["scheduling/Overlapping shifts".to_string()]);
}

#[test]
fn test_session_protocol_errors() {
    let template = NetworkTemplate::build(constraints(), &NetworkConfig::new()).unwrap();
    let mut session = template.new_session().unwrap();
    session.insert(Shift::new(1, None, 0, 8)).unwrap();

    assert!(matches!(
        session.insert(Shift::new(1, Some(2), 0, 8)),
        Err(ScoreNetError::FactAlreadyTracked { .. })
    ));
    assert!(matches!(
        session.update(Shift::new(2, None, 0, 8)),
        Err(ScoreNetError::FactNotTracked { .. })
    ));
    assert!(matches!(
        session.retract(&Employee::new(1, "Ann")),
        Err(ScoreNetError::FactNotTracked { .. })
    ));
    assert_eq!(session.state(), SessionState::Dirty);
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_soft(-1));
}

#[test]
fn test_overflow_corrupts_session() {
    let factory = ConstraintFactory::<SimpleScore>::new();
    let huge = factory
        .for_each::<Shift>()
        .penalize_with(SimpleScore::of(1), |s: &Shift| s.end)
        .as_constraint("Huge");
    let template = NetworkTemplate::build(vec![huge], &NetworkConfig::new()).unwrap();
    let mut session = template.new_session().unwrap();
    session.insert(Shift::new(1, None, 0, i64::MAX)).unwrap();
    session.insert(Shift::new(2, None, 0, i64::MAX)).unwrap();

    assert!(matches!(session.calculate_score(), Err(ScoreNetError::ScoreOverflow { .. })));
    assert_eq!(session.state(), SessionState::Corrupted);
    assert!(matches!(
        session.insert(Shift::new(3, None, 0, 1)),
        Err(ScoreNetError::SessionCorrupted)
    ));
}
