#![deny(missing_docs)]
#![doc = "Core types for covariate-adaptive minimisation: trial configuration, subject identity, error taxonomy and the deterministic randomness seam."]

pub mod config;
pub mod errors;
pub mod rng;
pub mod subject;

pub use config::{
    BalancingRule, MinimisationVariable, TrialConfiguration, TrialDefinition, VariableDefinition,
    RESERVED_VARIABLE,
};
pub use errors::{ErrorInfo, ErrorKind, MinimError};
pub use rng::{derive_substream_seed, RandomSource, RngHandle};
pub use subject::{characteristics, Characteristics, SubjectId};
