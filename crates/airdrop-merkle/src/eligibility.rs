use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{MerkleResult, RecordViolation};
use crate::hasher::{hash_to_hex, Hash32};
use crate::proof::{MerkleProof, Verification};
use crate::tree::{build_levels, find_violations};
use crate::{Address, AllocationRecord, AllocationTree};

/// Result of looking up one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub address: Address,
    pub eligible: bool,
    pub leaf: Option<AllocationRecord>,
    pub proof: Option<MerkleProof>,
}

/// Aggregated lookups: a miss or a malformed address never aborts the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchEligibility {
    pub eligible: Vec<Eligibility>,
    pub ineligible: Vec<Address>,
    /// (raw input, error message)
    pub errors: Vec<(String, String)>,
}

/// Aggregate figures over the leaf set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationStats {
    pub recipient_count: usize,
    pub total_allocation: u128,
    pub average_allocation: u128,
    pub max_allocation: u128,
    pub min_allocation: u128,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    Structural(RecordViolation),
    /// Stored leaf level disagrees with the record. Trees built by this crate
    /// always agree; the check guards any future path that restores levels
    /// from outside rather than hashing records.
    LeafHashMismatch { index: u64 },
    ProofMismatch { index: u64, reason: String },
    /// Same guard as `LeafHashMismatch`, one level up.
    RootMismatch { computed: Hash32, stored: Hash32 },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::Structural(violation) => write!(f, "{}", violation),
            IntegrityIssue::LeafHashMismatch { index } => {
                write!(f, "leaf hash for index {} does not match its record", index)
            }
            IntegrityIssue::ProofMismatch { index, reason } => {
                write!(f, "proof for index {} does not verify: {}", index, reason)
            }
            IntegrityIssue::RootMismatch { computed, stored } => write!(
                f,
                "recomputed root {} differs from stored root {}",
                hash_to_hex(computed),
                hash_to_hex(stored)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityReport {
    pub valid: bool,
    pub errors: Vec<IntegrityIssue>,
}

impl AllocationTree {
    /// Single-address lookup. An address outside the set is an ordinary
    /// negative result; only a malformed address is an error.
    pub fn check_eligibility(&self, address: &str) -> MerkleResult<Eligibility> {
        let address = Address::parse(address)?;
        Ok(self.eligibility_for(&address))
    }

    pub fn eligibility_for(&self, address: &Address) -> Eligibility {
        match self.proof_for_recipient(address) {
            Some(proof) => Eligibility {
                address: *address,
                eligible: true,
                leaf: Some(proof.leaf),
                proof: Some(proof),
            },
            None => Eligibility {
                address: *address,
                eligible: false,
                leaf: None,
                proof: None,
            },
        }
    }

    pub fn batch_check_eligibility<S: AsRef<str>>(&self, addresses: &[S]) -> BatchEligibility {
        let mut batch = BatchEligibility::default();

        for raw in addresses {
            let raw = raw.as_ref();
            match self.check_eligibility(raw) {
                Ok(result) if result.eligible => batch.eligible.push(result),
                Ok(result) => batch.ineligible.push(result.address),
                Err(e) => batch.errors.push((raw.to_string(), e.to_string())),
            }
        }

        debug!(
            "Batch eligibility: {} eligible, {} ineligible, {} errors",
            batch.eligible.len(),
            batch.ineligible.len(),
            batch.errors.len()
        );

        batch
    }

    /// Sum of all amounts. Saturates at `u128::MAX`, which only an
    /// unvalidated tree can reach.
    pub fn total_allocation(&self) -> u128 {
        self.records()
            .iter()
            .fold(0u128, |acc, r| acc.saturating_add(r.amount))
    }

    /// Floor of the mean amount.
    pub fn average_allocation(&self) -> u128 {
        self.total_allocation() / self.leaf_count() as u128
    }

    pub fn max_allocation(&self) -> u128 {
        self.records().iter().map(|r| r.amount).max().unwrap_or(0)
    }

    pub fn min_allocation(&self) -> u128 {
        self.records().iter().map(|r| r.amount).min().unwrap_or(0)
    }

    pub fn stats(&self) -> AllocationStats {
        AllocationStats {
            recipient_count: self.leaf_count(),
            total_allocation: self.total_allocation(),
            average_allocation: self.average_allocation(),
            max_allocation: self.max_allocation(),
            min_allocation: self.min_allocation(),
            depth: self.depth(),
        }
    }

    /// Full self-test: structural checks, every leaf re-hashed, every proof
    /// re-derived and verified, and the root recomputed from the leaves.
    pub fn validate_integrity(&self) -> IntegrityReport {
        let encoding = self.encoding();
        let root = self.root();
        let leaves = &self.levels()[0];

        let mut errors: Vec<IntegrityIssue> = find_violations(self.records())
            .into_iter()
            .map(IntegrityIssue::Structural)
            .collect();

        for (position, record) in self.records().iter().enumerate() {
            if record.leaf_hash(encoding) != leaves[position] {
                errors.push(IntegrityIssue::LeafHashMismatch {
                    index: record.index,
                });
            }

            let proof = self.proof_at(position);
            if let Verification::Rejected(reason) = proof.verify(encoding) {
                errors.push(IntegrityIssue::ProofMismatch {
                    index: record.index,
                    reason: reason.to_string(),
                });
            }
        }

        let recomputed: Vec<Hash32> = self
            .records()
            .iter()
            .map(|r| r.leaf_hash(encoding))
            .collect();
        let levels = build_levels(recomputed);
        let computed = levels[levels.len() - 1][0];
        if computed != root {
            errors.push(IntegrityIssue::RootMismatch {
                computed,
                stored: root,
            });
        }

        for issue in &errors {
            warn!("Integrity check: {}", issue);
        }

        IntegrityReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}
