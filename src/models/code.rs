//! Seller code classification results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix rendered by [`CodeAnalysis::formatted`] when a code has none.
pub const PLACEHOLDER_PREFIX: &str = "XX";

/// Tally bucket for codes without a prefix.
pub const UNKNOWN_PREFIX: &str = "UNKNOWN";

/// Whether a seller code is usable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CodeClass {
    /// A numeric id could be recovered
    Valid,
    /// Well-formed but carries no numeric id
    Empty,
    /// Does not fit any recognized shape
    Malformed,
}

impl fmt::Display for CodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CodeClass::Valid => "valid",
            CodeClass::Empty => "empty",
            CodeClass::Malformed => "malformed",
        };
        f.write_str(label)
    }
}

/// Full result of analysing a seller code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeAnalysis {
    pub class: CodeClass,

    /// Informational letter prefix (e.g. `SF`), if present
    pub prefix: Option<String>,

    /// Canonical numeric id, present iff `class` is `Valid`
    pub number: Option<String>,
}

impl CodeAnalysis {
    pub fn valid(prefix: Option<String>, number: impl Into<String>) -> Self {
        Self {
            class: CodeClass::Valid,
            prefix,
            number: Some(number.into()),
        }
    }

    pub fn empty(prefix: Option<String>) -> Self {
        Self {
            class: CodeClass::Empty,
            prefix,
            number: None,
        }
    }

    pub fn malformed(prefix: Option<String>) -> Self {
        Self {
            class: CodeClass::Malformed,
            prefix,
            number: None,
        }
    }

    /// The numeric id when it is a 3–6 digit fragment usable for grouping.
    pub fn digit_fragment(&self) -> Option<&str> {
        self.number
            .as_deref()
            .filter(|n| (3..=6).contains(&n.len()) && n.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Numeric id parsed as an integer.
    pub fn number_value(&self) -> Option<u64> {
        self.number.as_deref().and_then(|n| n.parse().ok())
    }

    /// Prefix used for issue tallies.
    pub fn prefix_or_unknown(&self) -> &str {
        self.prefix.as_deref().unwrap_or(UNKNOWN_PREFIX)
    }

    /// Standardized `"<PREFIX> <number>"` rendering, if a number exists.
    pub fn formatted(&self) -> Option<String> {
        let number = self.number.as_deref()?;
        let prefix = self.prefix.as_deref().unwrap_or(PLACEHOLDER_PREFIX);
        Some(format!("{prefix} {number}"))
    }
}
