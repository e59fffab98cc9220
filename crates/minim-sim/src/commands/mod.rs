pub mod demo;
pub mod run;
pub mod version;

use clap::ValueEnum;
use minim_core::BalancingRule;

/// Balancing rule selectable from the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleArg {
    /// Per-arm sum of single-covariate matches.
    MarginalImbalance,
    /// Per-arm count of subjects matching every covariate.
    JointMatch,
}

impl From<RuleArg> for BalancingRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::MarginalImbalance => BalancingRule::MarginalImbalance,
            RuleArg::JointMatch => BalancingRule::JointMatch,
        }
    }
}
