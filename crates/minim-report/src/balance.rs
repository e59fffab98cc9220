use std::fmt::{self, Display};

use minim_core::{ErrorInfo, MinimError, TrialConfiguration};
use minim_engine::SubjectRegistry;
use serde::{Deserialize, Serialize};

/// Per-arm subject counts for one value of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    /// Covariate value.
    pub value: String,
    /// Subjects with this value, indexed like the configured arms.
    pub counts: Vec<usize>,
}

impl BalanceRow {
    /// Difference between the most and least populated arm.
    pub fn spread(&self) -> usize {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        let min = self.counts.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Subjects with this value across all arms.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Balance rows for every permitted value of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBalance {
    /// Variable name.
    pub variable: String,
    /// One row per permitted value, in declaration order.
    pub rows: Vec<BalanceRow>,
}

/// Covariate distribution by arm, computed from a registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceTable {
    arms: Vec<String>,
    arm_totals: Vec<usize>,
    variables: Vec<VariableBalance>,
}

impl BalanceTable {
    /// Tallies every configured variable value per arm. Never mutates the registry.
    pub fn from_registry(config: &TrialConfiguration, registry: &SubjectRegistry) -> Self {
        let arm_count = config.arms().len();
        let mut variables: Vec<VariableBalance> = config
            .variables()
            .map(|variable| VariableBalance {
                variable: variable.name().to_string(),
                rows: variable
                    .values()
                    .iter()
                    .map(|value| BalanceRow {
                        value: value.clone(),
                        counts: vec![0; arm_count],
                    })
                    .collect(),
            })
            .collect();

        for record in registry {
            let arm = record.arm_index();
            if arm >= arm_count {
                continue;
            }
            for balance in &mut variables {
                let Some(value) = record.characteristic(&balance.variable) else {
                    continue;
                };
                if let Some(row) = balance.rows.iter_mut().find(|row| row.value == value) {
                    row.counts[arm] += 1;
                }
            }
        }

        Self {
            arms: config.arms().to_vec(),
            arm_totals: registry.arm_counts(arm_count),
            variables,
        }
    }

    /// Arm labels, in configured order.
    pub fn arms(&self) -> &[String] {
        &self.arms
    }

    /// Subjects allocated to each arm.
    pub fn arm_totals(&self) -> &[usize] {
        &self.arm_totals
    }

    /// Per-variable balance, in declaration order.
    pub fn variables(&self) -> &[VariableBalance] {
        &self.variables
    }

    /// Balance for a single variable.
    pub fn variable(&self, name: &str) -> Option<&VariableBalance> {
        self.variables.iter().find(|balance| balance.variable == name)
    }

    /// Count of subjects in `arm` with `variable == value`.
    pub fn count(&self, variable: &str, value: &str, arm: &str) -> Option<usize> {
        let arm_index = self.arms.iter().position(|label| label == arm)?;
        let row = self
            .variable(variable)?
            .rows
            .iter()
            .find(|row| row.value == value)?;
        row.counts.get(arm_index).copied()
    }

    /// Largest between-arm spread over every variable value.
    pub fn max_imbalance(&self) -> usize {
        self.variables
            .iter()
            .flat_map(|balance| balance.rows.iter())
            .map(BalanceRow::spread)
            .max()
            .unwrap_or(0)
    }

    /// Pretty JSON rendering of the table.
    pub fn to_json(&self) -> Result<String, MinimError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| MinimError::Serde(ErrorInfo::new("balance-serialize", err.to_string())))
    }
}

impl Display for BalanceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .variables
            .iter()
            .flat_map(|balance| {
                std::iter::once(balance.variable.len())
                    .chain(balance.rows.iter().map(|row| row.value.len() + 2))
            })
            .chain(std::iter::once(3))
            .max()
            .unwrap_or(3);
        let column_width = self
            .arms
            .iter()
            .map(String::len)
            .chain(self.arm_totals.iter().map(|total| total.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(4);

        write!(f, "{:<label_width$}", "arm")?;
        for arm in &self.arms {
            write!(f, " {:>column_width$}", arm)?;
        }
        writeln!(f)?;
        write!(f, "{:<label_width$}", "n")?;
        for total in &self.arm_totals {
            write!(f, " {:>column_width$}", total)?;
        }
        writeln!(f)?;

        for balance in &self.variables {
            writeln!(f, "{}", balance.variable)?;
            for row in &balance.rows {
                write!(f, "{:<label_width$}", format!("  {}", row.value))?;
                for count in &row.counts {
                    write!(f, " {:>column_width$}", count)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
