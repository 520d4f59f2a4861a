use serde::{Deserialize, Serialize};

use crate::errors::{MerkleError, MerkleResult};
use crate::hasher::{Hash32, LeafEncoding};
use crate::Address;

/// One recipient's allocation: the data hashed into a leaf.
///
/// Records are immutable once a tree is built over them. `index` is the claim
/// index the distributor uses for its claimed bitmap, not the leaf position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub index: u64,
    pub recipient: Address,
    pub amount: u128,
}

impl AllocationRecord {
    pub fn new(index: u64, recipient: Address, amount: u128) -> Self {
        Self {
            index,
            recipient,
            amount,
        }
    }

    /// Builds a record from untrusted decimal/hex strings.
    pub fn parse(index: &str, recipient: &str, amount: &str) -> MerkleResult<Self> {
        Ok(Self {
            index: parse_index(index)?,
            recipient: Address::parse(recipient)?,
            amount: parse_amount(amount)?,
        })
    }

    pub fn leaf_hash(&self, encoding: LeafEncoding) -> Hash32 {
        encoding.hash_leaf(self.index, &self.recipient, self.amount)
    }
}

/// Parses a claim index from a base-10 string.
pub fn parse_index(value: &str) -> MerkleResult<u64> {
    let digits = decimal_digits(value).map_err(|reason| MerkleError::InvalidIndex {
        value: value.to_string(),
        reason,
    })?;
    digits.parse::<u64>().map_err(|_| MerkleError::InvalidIndex {
        value: value.to_string(),
        reason: "exceeds u64".to_string(),
    })
}

/// Parses a token amount from a base-10 string, up to `u128::MAX`.
pub fn parse_amount(value: &str) -> MerkleResult<u128> {
    let digits = decimal_digits(value).map_err(|reason| MerkleError::InvalidAmount {
        value: value.to_string(),
        reason,
    })?;
    digits.parse::<u128>().map_err(|_| MerkleError::InvalidAmount {
        value: value.to_string(),
        reason: "exceeds uint128".to_string(),
    })
}

fn decimal_digits(value: &str) -> Result<&str, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }
    if trimmed.starts_with('-') {
        return Err("negative values are not allowed".to_string());
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err("not a base-10 integer".to_string());
    }
    Ok(trimmed)
}
