//! Academic session labels
//!
//! A session label identifies one school year, e.g. "2025-26". It doubles as
//! the enrollment key and the ledger bucket key for pending fees.
//!
//! # Ordering contract
//!
//! Labels are free text; the engine never parses them as dates. Ordering is
//! plain lexical string comparison, which coincides with chronological order
//! for the zero-padded, monotonic "YYYY-YY" labels the school issues. That
//! assumption is deliberate and local to this type; it must not be
//! generalized into date parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to session labels
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcademicError {
    #[error("Session label cannot be empty")]
    EmptyLabel,
}

/// A school-year label such as "2025-26"
///
/// Derived `Ord` is lexical; see the module docs for why that is sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLabel(String);

impl SessionLabel {
    /// Creates a session label from free text
    ///
    /// # Errors
    ///
    /// Returns `AcademicError::EmptyLabel` if the trimmed input is empty.
    pub fn new(label: impl Into<String>) -> Result<Self, AcademicError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(AcademicError::EmptyLabel);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the label text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionLabel {
    type Err = AcademicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
