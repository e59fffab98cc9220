mod common;

use common::{sex_trial, ScriptedSource};
use minim_core::{characteristics, BalancingRule, SubjectId};
use minim_engine::{AllocationMethod, RandomizationEngine};

#[test]
fn marginal_scenario_prefers_empty_arm_then_draws_for_new_value() {
    // id 1: first subject, index 0 -> A.
    // id 2: unit 0.5 <= 1.0, totals {A:1, B:0} -> B without any index draw.
    // id 3: unit 0.5, totals {A:0, B:0} -> tie, index 1 -> B.
    let rng = ScriptedSource::new(&[0, 1], &[0.5, 0.5]);
    let config = sex_trial(1.0, false, BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::with_rng(config, rng);

    let male = characteristics([("sex", "male")]);
    let female = characteristics([("sex", "female")]);

    assert_eq!(engine.randomise_subject(1u64, &male).unwrap(), "A");
    assert_eq!(engine.randomise_subject(2u64, &male).unwrap(), "B");

    let third = engine.allocate(3u64, &female).unwrap();
    assert_eq!(third.arm, "B");
    assert_eq!(third.sequence, 2);
    match third.method {
        AllocationMethod::Balanced {
            totals, tie_broken, ..
        } => {
            assert_eq!(totals, vec![0, 0]);
            assert!(tie_broken);
        }
        other => panic!("expected balanced allocation, got {other:?}"),
    }

    let arms: Vec<_> = engine.registry().iter().map(|r| r.arm().to_string()).collect();
    assert_eq!(arms, ["A", "B", "B"]);
}

#[test]
fn draw_above_weight_allocates_uniformly() {
    let rng = ScriptedSource::new(&[0, 0], &[0.9]);
    let config = sex_trial(0.8, false, BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::with_rng(config, rng);
    let male = characteristics([("sex", "male")]);

    engine.randomise_subject(1u64, &male).unwrap();
    let second = engine.allocate(2u64, &male).unwrap();
    // Balancing would have chosen B; the uniform draw picks A.
    assert_eq!(second.arm, "A");
    assert_eq!(second.method, AllocationMethod::Random { draw: 0.9 });
}

#[test]
fn draw_equal_to_weight_still_balances() {
    let rng = ScriptedSource::new(&[0], &[0.8]);
    let config = sex_trial(0.8, false, BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::with_rng(config, rng);
    let male = characteristics([("sex", "male")]);

    engine.randomise_subject(1u64, &male).unwrap();
    assert_eq!(engine.randomise_subject(2u64, &male).unwrap(), "B");
}

#[test]
fn first_subject_reseeds_only_when_enabled() {
    let config = sex_trial(1.0, true, BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::with_rng(config, ScriptedSource::new(&[1], &[0.1]));
    let male = characteristics([("sex", "male")]);

    let first = engine.allocate("screen-001", &male).unwrap();
    assert_eq!(first.method, AllocationMethod::FirstSubject { seeded: true });
    engine.randomise_subject("screen-002", &male).unwrap();

    let disabled = sex_trial(1.0, false, BalancingRule::MarginalImbalance);
    let mut plain = RandomizationEngine::with_rng(disabled, ScriptedSource::new(&[1], &[]));
    let first = plain.allocate("screen-001", &male).unwrap();
    assert_eq!(first.method, AllocationMethod::FirstSubject { seeded: false });
    assert_eq!(
        engine.registry().get(&SubjectId::from("screen-001")).unwrap().arm(),
        plain.registry().get(&SubjectId::from("screen-001")).unwrap().arm()
    );
}

#[test]
fn reseed_happens_once_for_the_first_subject_only() {
    let rng = ScriptedSource::new(&[0, 1, 0], &[0.3, 0.3, 0.3, 0.3]);
    let log = rng.reseed_log();
    let config = sex_trial(1.0, true, BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::with_rng(config, rng);
    let male = characteristics([("sex", "male")]);
    let female = characteristics([("sex", "female")]);

    for (id, subject) in [(5u64, &male), (6, &male), (7, &female), (8, &female), (9, &male)] {
        engine.randomise_subject(id, subject).unwrap();
    }
    assert_eq!(engine.subject_count(), 5);
    assert_eq!(
        *log.lock().unwrap(),
        vec![SubjectId::from(5u64).seed_material()]
    );

    let rng = ScriptedSource::new(&[1, 0], &[0.3, 0.3]);
    let log = rng.reseed_log();
    let config = sex_trial(1.0, false, BalancingRule::MarginalImbalance);
    let mut plain = RandomizationEngine::with_rng(config, rng);
    for (id, subject) in [(5u64, &male), (6, &male), (7, &female)] {
        plain.randomise_subject(id, subject).unwrap();
    }
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn joint_scenario_moves_repeat_profile_to_other_arm() {
    let rng = ScriptedSource::new(&[1, 0], &[0.2, 0.2, 0.2]);
    let config = sex_trial(1.0, false, BalancingRule::JointMatch);
    let mut engine = RandomizationEngine::with_rng(config, rng);
    let male = characteristics([("sex", "male")]);
    let female = characteristics([("sex", "female")]);

    assert_eq!(engine.randomise_subject(1u64, &male).unwrap(), "B");
    // Matches only in B -> A, no draw.
    assert_eq!(engine.randomise_subject(2u64, &male).unwrap(), "A");
    // Unseen profile -> uniform over arms, index 0.
    assert_eq!(engine.randomise_subject(3u64, &female).unwrap(), "A");
    // Matches only in A -> B.
    assert_eq!(engine.randomise_subject(4u64, &female).unwrap(), "B");
    assert_eq!(engine.strategy_name(), "joint-match");
}

#[test]
fn summary_line_names_variables_and_count() {
    let config = common::bmj_trial(BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::seeded(config, 3);
    let subject = characteristics([
        ("sex", "female"),
        ("age", ">50"),
        ("ethnicity", "asian"),
        ("smoker", "no"),
    ]);
    engine.randomise_subject(0u64, &subject).unwrap();
    assert_eq!(
        engine.to_string(),
        "Minimiser of 4 variables (sex, age, ethnicity, smoker) - 1 subjects"
    );
}

#[test]
fn registry_outlives_engine_and_config_is_shared() {
    let config = sex_trial(0.8, true, BalancingRule::MarginalImbalance);
    let mut engine = RandomizationEngine::new(std::sync::Arc::clone(&config));
    assert!(std::sync::Arc::ptr_eq(&engine.config_handle(), &config));

    let male = characteristics([("sex", "male")]);
    let first = engine.randomise_subject("S-1", &male).unwrap();
    let registry = engine.into_registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.first().map(|r| r.arm()), Some(first.as_str()));
    assert!(registry.contains(&SubjectId::from("S-1")));
}
