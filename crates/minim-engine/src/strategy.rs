use std::fmt::Debug;

use minim_core::{BalancingRule, Characteristics, RandomSource};

use crate::joint::JointMatch;
use crate::marginal::MarginalImbalance;
use crate::registry::SubjectRegistry;

/// Inputs available to a balancing strategy for one allocation.
///
/// The subject being randomised is never part of `registry`.
#[derive(Debug, Clone, Copy)]
pub struct BalanceContext<'a> {
    /// Ordered arm labels.
    pub arms: &'a [String],
    /// Subjects randomised so far.
    pub registry: &'a SubjectRegistry,
    /// Validated covariates of the incoming subject.
    pub characteristics: &'a Characteristics,
}

/// Outcome of a balancing strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDecision {
    /// Index of the chosen arm.
    pub arm_index: usize,
    /// Per-arm tallies the decision was based on.
    pub totals: Vec<usize>,
    /// Whether the choice was drawn at random among several candidate arms.
    pub tie_broken: bool,
}

/// Rule comparing arms' covariate histories to place a new subject.
///
/// Implementations must be deterministic for a fixed registry and a fixed
/// random source state: every random choice goes through `rng`.
pub trait BalancingStrategy: Debug + Send + Sync {
    /// Stable label used in logs and allocation records.
    fn name(&self) -> &str;

    /// Chooses an arm for the incoming subject.
    fn decide(&self, context: &BalanceContext<'_>, rng: &mut dyn RandomSource) -> BalanceDecision;
}

/// Returns the built-in strategy implementing `rule`.
pub fn strategy_for(rule: BalancingRule) -> Box<dyn BalancingStrategy> {
    match rule {
        BalancingRule::MarginalImbalance => Box::new(MarginalImbalance),
        BalancingRule::JointMatch => Box::new(JointMatch),
    }
}

/// Picks uniformly among `candidates`. A single candidate consumes no randomness.
pub(crate) fn pick_among(candidates: &[usize], rng: &mut dyn RandomSource) -> usize {
    match candidates {
        [only] => *only,
        _ => candidates[rng.next_index(candidates.len())],
    }
}

/// Chooses the arm with the smallest tally, breaking ties uniformly.
pub(crate) fn least_loaded(totals: Vec<usize>, rng: &mut dyn RandomSource) -> BalanceDecision {
    let minimum = totals.iter().copied().min().unwrap_or(0);
    let candidates: Vec<usize> = totals
        .iter()
        .enumerate()
        .filter(|&(_, &total)| total == minimum)
        .map(|(index, _)| index)
        .collect();
    BalanceDecision {
        arm_index: pick_among(&candidates, rng),
        tie_broken: candidates.len() > 1,
        totals,
    }
}
