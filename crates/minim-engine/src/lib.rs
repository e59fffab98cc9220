#![deny(missing_docs)]
#![doc = "Covariate-adaptive minimisation engine: subject registry, balancing strategies and the sequential randomisation procedure."]

mod allocation;
mod engine;
mod joint;
mod marginal;
mod registry;
mod shared;
mod strategy;

pub use allocation::{Allocation, AllocationMethod};
pub use engine::RandomizationEngine;
pub use joint::JointMatch;
pub use marginal::MarginalImbalance;
pub use registry::{SubjectRecord, SubjectRegistry};
pub use shared::SharedEngine;
pub use strategy::{strategy_for, BalanceContext, BalanceDecision, BalancingStrategy};
