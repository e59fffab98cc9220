//! Subject identifiers and covariate maps.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::rng::seed_from_bytes;

const NUMERIC_TAG: u8 = 0x01;
const TEXT_TAG: u8 = 0x02;

/// Caller supplied identifier of a randomised subject.
///
/// Numeric and textual identifiers are distinct: `SubjectId::from(7)` and
/// `SubjectId::from("7")` never compare equal and seed differently.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    /// Integer identifier (enrolment number, screening number).
    Numeric(u64),
    /// Free-form identifier.
    Text(String),
}

impl SubjectId {
    /// Stable seed material derived from the identifier.
    ///
    /// The mapping is SipHash-1-3 with zero keys over a variant tag and the
    /// identifier bytes (little-endian for numeric ids, UTF-8 for text ids), so
    /// it does not depend on platform, process or the std hasher.
    pub fn seed_material(&self) -> u64 {
        match self {
            SubjectId::Numeric(raw) => seed_from_bytes(NUMERIC_TAG, &raw.to_le_bytes()),
            SubjectId::Text(text) => seed_from_bytes(TEXT_TAG, text.as_bytes()),
        }
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Numeric(raw) => write!(f, "{raw}"),
            SubjectId::Text(text) => f.write_str(text),
        }
    }
}

impl From<u64> for SubjectId {
    fn from(raw: u64) -> Self {
        SubjectId::Numeric(raw)
    }
}

impl From<u32> for SubjectId {
    fn from(raw: u32) -> Self {
        SubjectId::Numeric(u64::from(raw))
    }
}

impl From<usize> for SubjectId {
    fn from(raw: usize) -> Self {
        SubjectId::Numeric(raw as u64)
    }
}

impl From<&str> for SubjectId {
    fn from(text: &str) -> Self {
        SubjectId::Text(text.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(text: String) -> Self {
        SubjectId::Text(text)
    }
}

/// Covariate values of one subject, keyed by variable name.
pub type Characteristics = BTreeMap<String, String>;

/// Builds a [`Characteristics`] map from name/value pairs.
pub fn characteristics<I, K, V>(pairs: I) -> Characteristics
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
