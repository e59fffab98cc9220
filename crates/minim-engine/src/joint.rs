use minim_core::RandomSource;

use crate::strategy::{least_loaded, pick_among, BalanceContext, BalanceDecision, BalancingStrategy};

/// Joint exact-match minimisation.
///
/// Only prior subjects whose covariates equal the incoming subject's on every
/// variable are counted. With no such subject the arm is drawn uniformly; when
/// all matches sit in one arm the subject goes to one of the other arms;
/// otherwise the arm with the fewest matches wins, ties drawn uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct JointMatch;

impl JointMatch {
    /// Per-arm counts of prior subjects matching on every covariate.
    pub fn totals(context: &BalanceContext<'_>) -> Vec<usize> {
        let mut totals = vec![0usize; context.arms.len()];
        for record in context.registry {
            let matches = context
                .characteristics
                .iter()
                .all(|(variable, value)| record.characteristic(variable) == Some(value.as_str()));
            if matches {
                if let Some(slot) = totals.get_mut(record.arm_index()) {
                    *slot += 1;
                }
            }
        }
        totals
    }
}

impl BalancingStrategy for JointMatch {
    fn name(&self) -> &str {
        "joint-match"
    }

    fn decide(&self, context: &BalanceContext<'_>, rng: &mut dyn RandomSource) -> BalanceDecision {
        let totals = Self::totals(context);
        let occupied: Vec<usize> = (0..totals.len()).filter(|&arm| totals[arm] > 0).collect();
        match occupied.as_slice() {
            [] => {
                let all: Vec<usize> = (0..totals.len()).collect();
                BalanceDecision {
                    arm_index: pick_among(&all, rng),
                    tie_broken: all.len() > 1,
                    totals,
                }
            }
            [single] => {
                let others: Vec<usize> = (0..totals.len()).filter(|arm| arm != single).collect();
                BalanceDecision {
                    arm_index: pick_among(&others, rng),
                    tie_broken: others.len() > 1,
                    totals,
                }
            }
            _ => least_loaded(totals, rng),
        }
    }
}
