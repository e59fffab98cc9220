use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use minim_core::{
    Characteristics, ErrorInfo, MinimError, RandomSource, RngHandle, SubjectId,
    TrialConfiguration,
};
use tracing::{debug, error, warn};

use crate::allocation::{Allocation, AllocationMethod};
use crate::registry::{SubjectRecord, SubjectRegistry};
use crate::strategy::{strategy_for, BalanceContext, BalancingStrategy};

/// Sequential covariate-adaptive randomisation engine.
///
/// Owns the subject registry and the random source. Calls must be serialised
/// by the caller; wrap the engine in [`SharedEngine`](crate::SharedEngine)
/// when submissions come from several threads. Each allocation scans the
/// registry once, so a call costs O(n) in the number of prior subjects.
pub struct RandomizationEngine<R: RandomSource = RngHandle> {
    config: Arc<TrialConfiguration>,
    registry: SubjectRegistry,
    rng: R,
    strategy: Box<dyn BalancingStrategy>,
}

impl RandomizationEngine<RngHandle> {
    /// Creates an engine whose random source is seeded from OS entropy.
    ///
    /// With `seed_from_first_subject_id` enabled the source is re-seeded from
    /// the first subject's id, which makes the run reproducible regardless.
    pub fn new(config: impl Into<Arc<TrialConfiguration>>) -> Self {
        Self::with_rng(config, RngHandle::from_entropy())
    }

    /// Creates an engine with an explicitly seeded random source.
    pub fn seeded(config: impl Into<Arc<TrialConfiguration>>, seed: u64) -> Self {
        Self::with_rng(config, RngHandle::from_seed(seed))
    }
}

impl<R: RandomSource> RandomizationEngine<R> {
    /// Creates an engine drawing randomness from `rng`, using the configured balancing rule.
    pub fn with_rng(config: impl Into<Arc<TrialConfiguration>>, rng: R) -> Self {
        let config = config.into();
        let strategy = strategy_for(config.balancing());
        Self {
            config,
            registry: SubjectRegistry::new(),
            rng,
            strategy,
        }
    }

    /// Replaces the balancing strategy. Intended for use before the first allocation.
    pub fn with_strategy(mut self, strategy: Box<dyn BalancingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Randomises one subject and returns the allocated arm label.
    pub fn randomise_subject(
        &mut self,
        id: impl Into<SubjectId>,
        characteristics: &Characteristics,
    ) -> Result<String, MinimError> {
        self.allocate(id, characteristics)
            .map(|allocation| allocation.arm)
    }

    /// Randomises one subject and returns the full allocation record.
    ///
    /// Validation runs before any state changes: on error neither the registry
    /// nor the random source is touched.
    pub fn allocate(
        &mut self,
        id: impl Into<SubjectId>,
        characteristics: &Characteristics,
    ) -> Result<Allocation, MinimError> {
        let id = id.into();
        if let Err(err) = self.validate(&id, characteristics) {
            warn!(subject = %id, code = err.code(), "randomisation rejected");
            return Err(err);
        }

        let arm_count = self.config.arms().len();
        let (arm_index, method) = if self.registry.is_empty() {
            let seeded = self.config.seed_from_first_subject_id();
            if seeded {
                self.rng.reseed(id.seed_material());
            }
            (
                self.rng.next_index(arm_count),
                AllocationMethod::FirstSubject { seeded },
            )
        } else {
            let draw = self.rng.next_unit();
            if draw <= self.config.minimisation_weight() {
                let context = BalanceContext {
                    arms: self.config.arms(),
                    registry: &self.registry,
                    characteristics,
                };
                let decision = self.strategy.decide(&context, &mut self.rng);
                let arm_index = if decision.arm_index < arm_count {
                    decision.arm_index
                } else {
                    error!(
                        strategy = self.strategy.name(),
                        arm_index = decision.arm_index,
                        "strategy chose an unknown arm; drawing uniformly instead"
                    );
                    self.rng.next_index(arm_count)
                };
                (
                    arm_index,
                    AllocationMethod::Balanced {
                        draw,
                        rule: self.strategy.name().to_string(),
                        totals: decision.totals,
                        tie_broken: decision.tie_broken,
                    },
                )
            } else {
                (
                    self.rng.next_index(arm_count),
                    AllocationMethod::Random { draw },
                )
            }
        };

        let arm = self.config.arms()[arm_index].clone();
        let sequence = self.registry.len();
        self.registry.append(SubjectRecord::new(
            id.clone(),
            characteristics.clone(),
            arm.clone(),
            arm_index,
        ));
        debug!(
            subject = %id,
            arm = %arm,
            sequence,
            method = method.label(),
            "randomised subject"
        );

        Ok(Allocation {
            subject: id,
            arm,
            arm_index,
            sequence,
            method,
        })
    }

    /// Checks that a submission would be accepted, without randomising it.
    ///
    /// Checks run in order: covariate key set, covariate values, duplicate id.
    pub fn validate(
        &self,
        id: &SubjectId,
        characteristics: &Characteristics,
    ) -> Result<(), MinimError> {
        let missing: Vec<&str> = self
            .config
            .variable_names()
            .filter(|name| !characteristics.contains_key(*name))
            .collect();
        let unexpected: Vec<&str> = characteristics
            .keys()
            .map(String::as_str)
            .filter(|name| self.config.variable(name).is_none())
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            let expected: Vec<&str> = self.config.variable_names().collect();
            return Err(MinimError::CovariateMismatch(
                ErrorInfo::new(
                    "covariate-keys",
                    "characteristics do not match the configured variables",
                )
                .with_context("subject", id)
                .with_context("missing", missing.join(","))
                .with_context("unexpected", unexpected.join(","))
                .with_hint(format!("expected exactly: {}", expected.join(", "))),
            ));
        }

        for variable in self.config.variables() {
            let Some(value) = characteristics.get(variable.name()) else {
                continue;
            };
            if !variable.permits(value) {
                return Err(MinimError::InvalidCovariateValue(
                    ErrorInfo::new("covariate-value", "value not permitted for variable")
                        .with_context("subject", id)
                        .with_context("variable", variable.name())
                        .with_context("value", value)
                        .with_hint(format!("use one of: {}", variable.values().join(", "))),
                ));
            }
        }

        if let Some(position) = self.registry.position(id) {
            return Err(MinimError::DuplicateSubject(
                ErrorInfo::new("subject-duplicate", "subject has already been randomised")
                    .with_context("subject", id)
                    .with_context("sequence", position),
            ));
        }

        Ok(())
    }

    /// Trial configuration shared by this engine.
    pub fn config(&self) -> &TrialConfiguration {
        &self.config
    }

    /// Shared handle to the trial configuration.
    pub fn config_handle(&self) -> Arc<TrialConfiguration> {
        Arc::clone(&self.config)
    }

    /// Read-only view of the subject registry.
    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }

    /// Number of randomised subjects.
    pub fn subject_count(&self) -> usize {
        self.registry.len()
    }

    /// Name of the active balancing strategy.
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Consumes the engine, returning its registry.
    pub fn into_registry(self) -> SubjectRegistry {
        self.registry
    }
}

impl<R: RandomSource> Display for RandomizationEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.config.variable_names().collect();
        write!(
            f,
            "Minimiser of {} variables ({}) - {} subjects",
            names.len(),
            names.join(", "),
            self.registry.len()
        )
    }
}

impl<R: RandomSource> Debug for RandomizationEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomizationEngine")
            .field("config", &self.config)
            .field("subjects", &self.registry.len())
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
