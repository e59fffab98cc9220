//! Structured error types shared across minimisation crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`MinimError`] variant.
///
/// `code` is stable across releases and safe to match on; `message` and
/// `hint` are for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Machine readable code, e.g. `covariate-value`.
    pub code: String,
    /// Diagnostic message.
    pub message: String,
    /// Offending subject, variable, value and similar details, sorted by key.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested fix, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with a code and message and no context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key = value`, rendering the value with its `Display` impl.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Looks up a context entry.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.code)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            f.write_str(")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Canonical error type for trial configuration and randomisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MinimError {
    /// The trial configuration is invalid and cannot be used.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// Supplied characteristics do not cover exactly the configured variables.
    #[error("covariate mismatch: {0}")]
    CovariateMismatch(ErrorInfo),
    /// A supplied characteristic value is not permitted for its variable.
    #[error("invalid covariate value: {0}")]
    InvalidCovariateValue(ErrorInfo),
    /// The subject identifier has already been randomised.
    #[error("duplicate subject: {0}")]
    DuplicateSubject(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

/// Payload-free discriminant of [`MinimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// See [`MinimError::Configuration`].
    Configuration,
    /// See [`MinimError::CovariateMismatch`].
    CovariateMismatch,
    /// See [`MinimError::InvalidCovariateValue`].
    InvalidCovariateValue,
    /// See [`MinimError::DuplicateSubject`].
    DuplicateSubject,
    /// See [`MinimError::Serde`].
    Serde,
}

impl MinimError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MinimError::Configuration(info)
            | MinimError::CovariateMismatch(info)
            | MinimError::InvalidCovariateValue(info)
            | MinimError::DuplicateSubject(info)
            | MinimError::Serde(info) => info,
        }
    }

    /// Returns the error family without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MinimError::Configuration(_) => ErrorKind::Configuration,
            MinimError::CovariateMismatch(_) => ErrorKind::CovariateMismatch,
            MinimError::InvalidCovariateValue(_) => ErrorKind::InvalidCovariateValue,
            MinimError::DuplicateSubject(_) => ErrorKind::DuplicateSubject,
            MinimError::Serde(_) => ErrorKind::Serde,
        }
    }

    /// Shorthand for the machine readable code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
