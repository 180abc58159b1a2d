//! Outcome of comparing a result against a reference expansion.

use std::fmt;

use serde::Serialize;

/// Result of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// Both digit windows were compared character by character.
    Checked {
        matched: bool,
        /// 0-based index into the digit string (the `.` counts as a position)
        first_mismatch_index: Option<usize>,
    },
    /// No comparison was made. Not an error.
    Unavailable { reason: UnavailableReason },
}

impl Verification {
    pub const fn matched() -> Self {
        Self::Checked {
            matched: true,
            first_mismatch_index: None,
        }
    }

    pub const fn mismatch_at(index: usize) -> Self {
        Self::Checked {
            matched: false,
            first_mismatch_index: Some(index),
        }
    }

    pub const fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }
}

/// Why verification was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    AboveCeiling { digits: u64, ceiling: u64 },
    NoReference,
    ReferenceTooShort { available: usize, required: usize },
    Disabled,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveCeiling { digits, ceiling } => {
                write!(f, "{digits} digits exceeds the verification ceiling of {ceiling}")
            }
            Self::NoReference => f.write_str("reference file not found"),
            Self::ReferenceTooShort {
                available,
                required,
            } => write!(
                f,
                "reference holds {available} characters, {required} required"
            ),
            Self::Disabled => f.write_str("verification disabled"),
        }
    }
}
