mod common;

use common::sex_trial;
use minim_core::{characteristics, BalancingRule, RandomSource, RngHandle};
use minim_engine::RandomizationEngine;

const SUBJECTS: u64 = 10_000;

fn assert_strict_alternation(rule: BalancingRule) {
    let mut engine = RandomizationEngine::seeded(sex_trial(1.0, true, rule), 0);
    let mut covariates = RngHandle::from_seed(2024);
    // counts[value][arm]
    let mut counts = [[0i64; 2]; 2];
    let values = ["male", "female"];

    for id in 0..SUBJECTS {
        let value = covariates.next_index(2);
        let subject = characteristics([("sex", values[value])]);
        let arm = engine.randomise_subject(id, &subject).unwrap();
        let arm_index = engine.config().arm_index(&arm).unwrap();
        counts[value][arm_index] += 1;

        for per_value in &counts {
            assert!(
                (per_value[0] - per_value[1]).abs() <= 1,
                "imbalance after subject {id}: {counts:?}"
            );
        }
    }
    assert_eq!(engine.subject_count() as u64, SUBJECTS);
}

#[test]
fn marginal_rule_keeps_each_stratum_within_one() {
    assert_strict_alternation(BalancingRule::MarginalImbalance);
}

#[test]
fn joint_rule_keeps_each_stratum_within_one() {
    assert_strict_alternation(BalancingRule::JointMatch);
}

#[test]
fn zero_weight_is_effectively_simple_randomisation() {
    let mut engine =
        RandomizationEngine::seeded(sex_trial(0.0, false, BalancingRule::MarginalImbalance), 8);
    let male = characteristics([("sex", "male")]);
    for id in 0..2_000u64 {
        engine.randomise_subject(id, &male).unwrap();
    }
    let counts = engine.registry().arm_counts(2);
    // Strict alternation would give exactly 1000/1000; simple randomisation drifts.
    assert!(counts[0] > 850 && counts[1] > 850, "{counts:?}");
    let longest_run = engine
        .registry()
        .records()
        .windows(2)
        .fold((1usize, 1usize), |(best, current), pair| {
            if pair[0].arm() == pair[1].arm() {
                (best.max(current + 1), current + 1)
            } else {
                (best, 1)
            }
        })
        .0;
    assert!(longest_run > 2, "uniform allocation should produce runs");
}
