//! Strongly-typed correlation identifier.

use crate::error::{CorrelateError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation identifier shared by every log and trace event of one
/// logical operation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Validate a caller-supplied identifier.
    ///
    /// Empty and whitespace-only input is rejected rather than replaced with
    /// a generated id.
    pub fn parse(id: &str) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(CorrelateError::InvalidArgument(
                "correlation id must not be empty".to_string(),
            ));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
