use minim_core::RandomSource;

use crate::strategy::{least_loaded, BalanceContext, BalanceDecision, BalancingStrategy};

/// Marginal-imbalance minimisation.
///
/// For each arm, sums over the incoming subject's covariates the number of
/// prior subjects in that arm sharing that single covariate value. The arm
/// with the smallest sum wins; tied minima (including all-zero sums) are
/// broken uniformly among the tied arms.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarginalImbalance;

impl MarginalImbalance {
    /// Per-arm marginal tallies for the context's subject.
    pub fn totals(context: &BalanceContext<'_>) -> Vec<usize> {
        let mut totals = vec![0usize; context.arms.len()];
        for record in context.registry {
            let shared = context
                .characteristics
                .iter()
                .filter(|(variable, value)| record.characteristic(variable) == Some(value.as_str()))
                .count();
            if let Some(slot) = totals.get_mut(record.arm_index()) {
                *slot += shared;
            }
        }
        totals
    }
}

impl BalancingStrategy for MarginalImbalance {
    fn name(&self) -> &str {
        "marginal-imbalance"
    }

    fn decide(&self, context: &BalanceContext<'_>, rng: &mut dyn RandomSource) -> BalanceDecision {
        least_loaded(Self::totals(context), rng)
    }
}
