use minim_core::SubjectId;
use serde::Serialize;

/// Audit record describing how one subject was allocated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    /// Randomised subject.
    pub subject: SubjectId,
    /// Allocated arm label.
    pub arm: String,
    /// Position of the arm in the configured arm list.
    pub arm_index: usize,
    /// Zero-based randomisation order of the subject.
    pub sequence: usize,
    /// Path through the decision procedure.
    pub method: AllocationMethod,
}

/// Decision path taken for an allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AllocationMethod {
    /// First subject of the trial, allocated uniformly at random.
    FirstSubject {
        /// Whether the random source was re-seeded from the subject id.
        seeded: bool,
    },
    /// Uniform allocation because the minimisation draw exceeded the weight.
    Random {
        /// Uniform draw compared against the minimisation weight.
        draw: f64,
    },
    /// Allocation chosen by the balancing strategy.
    Balanced {
        /// Uniform draw compared against the minimisation weight.
        draw: f64,
        /// Name of the strategy that decided.
        rule: String,
        /// Per-arm tallies seen by the strategy.
        totals: Vec<usize>,
        /// Whether a random tie-break picked among several arms.
        tie_broken: bool,
    },
}

impl AllocationMethod {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            AllocationMethod::FirstSubject { .. } => "first-subject",
            AllocationMethod::Random { .. } => "random",
            AllocationMethod::Balanced { .. } => "balanced",
        }
    }
}
