//! Trial definitions and their validated configuration.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, MinimError};

/// Variable name reserved for the allocated arm in tabular exports.
pub const RESERVED_VARIABLE: &str = "arm";

/// Serialisable description of a trial, validated into a [`TrialConfiguration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialDefinition {
    /// Minimisation variables in declaration order.
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    /// Ordered arm labels.
    #[serde(default = "default_arms")]
    pub arms: Vec<String>,
    /// Probability that a non-first subject is allocated by the balancing rule.
    #[serde(default = "default_minimisation_weight")]
    pub minimisation_weight: f64,
    /// Re-seed the random source from the first subject's identifier.
    #[serde(default = "default_seed_from_first_subject_id")]
    pub seed_from_first_subject_id: bool,
    /// Balancing rule applied when the minimisation draw succeeds.
    #[serde(default)]
    pub balancing: BalancingRule,
}

fn default_arms() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

fn default_minimisation_weight() -> f64 {
    0.8
}

fn default_seed_from_first_subject_id() -> bool {
    true
}

impl Default for TrialDefinition {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            arms: default_arms(),
            minimisation_weight: default_minimisation_weight(),
            seed_from_first_subject_id: default_seed_from_first_subject_id(),
            balancing: BalancingRule::default(),
        }
    }
}

/// Name and permitted categories of one minimisation variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Variable name (e.g. `sex`).
    pub name: String,
    /// Permitted categorical values, in display order.
    pub values: Vec<String>,
}

impl VariableDefinition {
    /// Convenience constructor accepting any string-like values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Balancing rule used by the engine for minimised allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalancingRule {
    /// Sum, per arm, of prior subjects sharing each single covariate value.
    #[default]
    MarginalImbalance,
    /// Count, per arm, of prior subjects matching every covariate at once.
    JointMatch,
}

impl BalancingRule {
    /// Stable kebab-case label used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            BalancingRule::MarginalImbalance => "marginal-imbalance",
            BalancingRule::JointMatch => "joint-match",
        }
    }
}

/// Validated minimisation variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimisationVariable {
    name: String,
    values: Vec<String>,
}

impl MinimisationVariable {
    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permitted values in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether `value` is one of the permitted categories.
    pub fn permits(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }
}

/// Immutable, validated description of a minimisation trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrialDefinition", into = "TrialDefinition")]
pub struct TrialConfiguration {
    variables: IndexMap<String, MinimisationVariable>,
    arms: Vec<String>,
    minimisation_weight: f64,
    seed_from_first_subject_id: bool,
    balancing: BalancingRule,
}

impl TrialConfiguration {
    /// Validates a definition and freezes it into a configuration.
    pub fn new(definition: TrialDefinition) -> Result<Self, MinimError> {
        let mut variables = IndexMap::with_capacity(definition.variables.len());
        for variable in definition.variables {
            let variable = validate_variable(variable)?;
            if variables.contains_key(&variable.name) {
                return Err(MinimError::Configuration(
                    ErrorInfo::new(
                        "config-duplicate-variable",
                        "minimisation variable declared twice",
                    )
                    .with_context("variable", &variable.name),
                ));
            }
            variables.insert(variable.name.clone(), variable);
        }

        validate_arms(&definition.arms)?;
        validate_weight(definition.minimisation_weight)?;

        Ok(Self {
            variables,
            arms: definition.arms,
            minimisation_weight: definition.minimisation_weight,
            seed_from_first_subject_id: definition.seed_from_first_subject_id,
            balancing: definition.balancing,
        })
    }

    /// Parses and validates a YAML trial definition.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MinimError> {
        let definition: TrialDefinition = serde_yaml::from_str(yaml).map_err(|err| {
            MinimError::Serde(ErrorInfo::new("config-yaml-parse", err.to_string()))
        })?;
        Self::new(definition)
    }

    /// Parses and validates a JSON trial definition.
    pub fn from_json_str(json: &str) -> Result<Self, MinimError> {
        let definition: TrialDefinition = serde_json::from_str(json).map_err(|err| {
            MinimError::Serde(ErrorInfo::new("config-json-parse", err.to_string()))
        })?;
        Self::new(definition)
    }

    /// Serialises the configuration back to its YAML definition.
    pub fn to_yaml_string(&self) -> Result<String, MinimError> {
        serde_yaml::to_string(&self.definition()).map_err(|err| {
            MinimError::Serde(ErrorInfo::new("config-yaml-serialize", err.to_string()))
        })
    }

    /// Returns the definition this configuration was built from.
    pub fn definition(&self) -> TrialDefinition {
        TrialDefinition {
            variables: self
                .variables
                .values()
                .map(|variable| VariableDefinition {
                    name: variable.name.clone(),
                    values: variable.values.clone(),
                })
                .collect(),
            arms: self.arms.clone(),
            minimisation_weight: self.minimisation_weight,
            seed_from_first_subject_id: self.seed_from_first_subject_id,
            balancing: self.balancing,
        }
    }

    /// Minimisation variables in declaration order.
    pub fn variables(&self) -> impl ExactSizeIterator<Item = &MinimisationVariable> + '_ {
        self.variables.values()
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&MinimisationVariable> {
        self.variables.get(name)
    }

    /// Variable names in declaration order.
    pub fn variable_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.variables.keys().map(String::as_str)
    }

    /// Number of minimisation variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Ordered arm labels.
    pub fn arms(&self) -> &[String] {
        &self.arms
    }

    /// Position of `label` within [`arms`](Self::arms).
    pub fn arm_index(&self, label: &str) -> Option<usize> {
        self.arms.iter().position(|arm| arm == label)
    }

    /// Probability of a balanced (rather than uniform) allocation.
    pub fn minimisation_weight(&self) -> f64 {
        self.minimisation_weight
    }

    /// Whether the first subject's id seeds the random source.
    pub fn seed_from_first_subject_id(&self) -> bool {
        self.seed_from_first_subject_id
    }

    /// Configured balancing rule.
    pub fn balancing(&self) -> BalancingRule {
        self.balancing
    }
}

impl TryFrom<TrialDefinition> for TrialConfiguration {
    type Error = MinimError;

    fn try_from(definition: TrialDefinition) -> Result<Self, Self::Error> {
        Self::new(definition)
    }
}

impl From<TrialConfiguration> for TrialDefinition {
    fn from(config: TrialConfiguration) -> Self {
        config.definition()
    }
}

fn validate_variable(variable: VariableDefinition) -> Result<MinimisationVariable, MinimError> {
    if variable.name == RESERVED_VARIABLE {
        return Err(MinimError::Configuration(
            ErrorInfo::new(
                "config-reserved-variable",
                "variable name is reserved for the allocated arm",
            )
            .with_context("variable", RESERVED_VARIABLE)
            .with_hint("rename the covariate"),
        ));
    }
    if variable.values.is_empty() {
        return Err(MinimError::Configuration(
            ErrorInfo::new(
                "config-empty-values",
                "minimisation variable has no permitted values",
            )
            .with_context("variable", variable.name),
        ));
    }
    let mut seen = BTreeSet::new();
    for value in &variable.values {
        if !seen.insert(value.as_str()) {
            return Err(MinimError::Configuration(
                ErrorInfo::new(
                    "config-duplicate-value",
                    "permitted value listed twice for variable",
                )
                .with_context("variable", &variable.name)
                .with_context("value", value),
            ));
        }
    }
    Ok(MinimisationVariable {
        name: variable.name,
        values: variable.values,
    })
}

fn validate_arms(arms: &[String]) -> Result<(), MinimError> {
    if arms.len() < 2 {
        return Err(MinimError::Configuration(
            ErrorInfo::new("config-too-few-arms", "at least two arms are required")
                .with_context("arms", arms.len()),
        ));
    }
    let mut seen = BTreeSet::new();
    for arm in arms {
        if arm.is_empty() {
            return Err(MinimError::Configuration(ErrorInfo::new(
                "config-empty-arm",
                "arm labels must be non-empty",
            )));
        }
        if !seen.insert(arm.as_str()) {
            return Err(MinimError::Configuration(
                ErrorInfo::new("config-duplicate-arm", "arm labels must be distinct")
                    .with_context("arm", arm),
            ));
        }
    }
    Ok(())
}

fn validate_weight(weight: f64) -> Result<(), MinimError> {
    // NaN fails the range check.
    if !(0.0..=1.0).contains(&weight) {
        return Err(MinimError::Configuration(
            ErrorInfo::new(
                "config-weight-range",
                "minimisation weight must lie within [0, 1]",
            )
            .with_context("minimisation_weight", weight),
        ));
    }
    Ok(())
}
