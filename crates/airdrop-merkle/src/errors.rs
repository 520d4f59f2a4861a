use thiserror::Error;

use crate::Address;

pub type MerkleResult<T> = Result<T, MerkleError>;

/// A single structural problem found in a recipient set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordViolation {
    DuplicateIndex { index: u64, occurrences: usize },
    DuplicateRecipient { recipient: Address, indices: Vec<u64> },
    ZeroAmount { index: u64, recipient: Address },
}

impl std::fmt::Display for RecordViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordViolation::DuplicateIndex { index, occurrences } => {
                write!(f, "index {} appears {} times", index, occurrences)
            }
            RecordViolation::DuplicateRecipient { recipient, indices } => {
                write!(f, "recipient {} appears at indices {:?}", recipient, indices)
            }
            RecordViolation::ZeroAmount { index, recipient } => {
                write!(f, "zero amount for index {} ({})", index, recipient)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid index '{value}': {reason}")]
    InvalidIndex { value: String, reason: String },

    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Recipient set cannot be empty")]
    EmptyRecipientSet,

    #[error("Invalid recipient set ({} violations): {}", .0.len(), format_violations(.0))]
    InvalidRecords(Vec<RecordViolation>),

    #[error("Total allocation overflows uint128")]
    TotalOverflow,

    #[error("Unknown leaf encoding: {0}")]
    UnknownEncoding(String),

    #[error("Invalid campaign configuration: {0}")]
    InvalidCampaign(String),

    #[error("Claim status lookup failed: {0}")]
    ClaimStatus(String),
}

fn format_violations(violations: &[RecordViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
