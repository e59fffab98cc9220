#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use minim_core::{
    BalancingRule, RandomSource, TrialConfiguration, TrialDefinition, VariableDefinition,
};

/// Random source replaying scripted draws in order.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    indices: VecDeque<usize>,
    units: VecDeque<f64>,
    reseeds: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedSource {
    pub fn new(indices: &[usize], units: &[f64]) -> Self {
        Self {
            indices: indices.iter().copied().collect(),
            units: units.iter().copied().collect(),
            reseeds: Arc::default(),
        }
    }

    /// Handle to the seeds passed to `reseed`; stays readable after the source moves into an engine.
    pub fn reseed_log(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.reseeds)
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        self.units.pop_front().expect("scripted unit draw exhausted")
    }

    fn next_index(&mut self, len: usize) -> usize {
        let index = self.indices.pop_front().expect("scripted index draw exhausted");
        assert!(index < len);
        index
    }

    fn reseed(&mut self, seed: u64) {
        self.reseeds.lock().unwrap().push(seed);
    }
}

pub fn sex_trial(weight: f64, seeded: bool, rule: BalancingRule) -> Arc<TrialConfiguration> {
    let definition = TrialDefinition {
        variables: vec![VariableDefinition::new("sex", ["male", "female"])],
        arms: vec!["A".into(), "B".into()],
        minimisation_weight: weight,
        seed_from_first_subject_id: seeded,
        balancing: rule,
    };
    Arc::new(TrialConfiguration::new(definition).expect("valid trial"))
}

pub fn bmj_trial(rule: BalancingRule) -> Arc<TrialConfiguration> {
    let definition = TrialDefinition {
        variables: vec![
            VariableDefinition::new("sex", ["male", "female"]),
            VariableDefinition::new("age", ["<=50", ">50"]),
            VariableDefinition::new("ethnicity", ["white", "black", "asian"]),
            VariableDefinition::new("smoker", ["no", "yes"]),
        ],
        balancing: rule,
        ..TrialDefinition::default()
    };
    Arc::new(TrialConfiguration::new(definition).expect("valid trial"))
}
