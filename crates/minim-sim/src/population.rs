//! Synthetic subject populations for the demo command.

use minim_core::{
    derive_substream_seed, BalancingRule, Characteristics, RngHandle, TrialDefinition,
    VariableDefinition,
};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};

/// One covariate with the relative frequency of each of its values.
#[derive(Debug, Clone, Copy)]
pub struct CovariateProfile {
    pub name: &'static str,
    pub levels: &'static [(&'static str, u32)],
}

/// The four-factor worked example: 60% male, equal age groups, 70/20/10 ethnicity,
/// 75% non-smokers.
pub const WORKED_EXAMPLE: &[CovariateProfile] = &[
    CovariateProfile {
        name: "sex",
        levels: &[("male", 3), ("female", 2)],
    },
    CovariateProfile {
        name: "age",
        levels: &[("<=50", 1), (">50", 1)],
    },
    CovariateProfile {
        name: "ethnicity",
        levels: &[("white", 7), ("black", 1), ("asian", 2)],
    },
    CovariateProfile {
        name: "smoker",
        levels: &[("no", 3), ("yes", 1)],
    },
];

/// Trial definition matching a set of profiles, with default arms and weight.
pub fn trial_definition(profiles: &[CovariateProfile], rule: BalancingRule) -> TrialDefinition {
    TrialDefinition {
        variables: profiles
            .iter()
            .map(|profile| {
                VariableDefinition::new(profile.name, profile.levels.iter().map(|(value, _)| *value))
            })
            .collect(),
        balancing: rule,
        ..TrialDefinition::default()
    }
}

struct Sampler {
    name: &'static str,
    values: Vec<&'static str>,
    weights: WeightedIndex<u32>,
}

/// Deterministic generator of subject characteristics.
///
/// Draws come from substream 0 of the master seed so the population does not
/// share a stream with any engine seeded from the same master.
pub struct Population {
    rng: RngHandle,
    samplers: Vec<Sampler>,
}

impl Population {
    pub fn new(profiles: &[CovariateProfile], master_seed: u64) -> Result<Self, WeightedError> {
        let samplers = profiles
            .iter()
            .map(|profile| {
                Ok(Sampler {
                    name: profile.name,
                    values: profile.levels.iter().map(|(value, _)| *value).collect(),
                    weights: WeightedIndex::new(profile.levels.iter().map(|(_, weight)| *weight))?,
                })
            })
            .collect::<Result<Vec<_>, WeightedError>>()?;
        Ok(Self {
            rng: RngHandle::from_seed(derive_substream_seed(master_seed, 0)),
            samplers,
        })
    }

    pub fn next_subject(&mut self) -> Characteristics {
        self.samplers
            .iter()
            .map(|sampler| {
                let index = sampler.weights.sample(&mut self.rng);
                (sampler.name.to_string(), sampler.values[index].to_string())
            })
            .collect()
    }
}
