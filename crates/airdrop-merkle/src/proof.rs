use serde::{Deserialize, Serialize};

use crate::hasher::{hash_from_hex, hash_pair, hash_to_hex, Hash32, LeafEncoding};
use crate::AllocationRecord;

/// Inclusion proof for one allocation, bound to the root it was generated
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf: AllocationRecord,
    /// Sibling hashes from the leaf level up to (not including) the root
    pub siblings: Vec<Hash32>,
    pub root: Hash32,
}

impl MerkleProof {
    /// Recomputes the root from the leaf and siblings and compares it to the
    /// embedded root.
    pub fn verify(&self, encoding: LeafEncoding) -> Verification {
        verify(&self.leaf, &self.siblings, &self.root, encoding)
    }

    /// Verify against an externally supplied root (e.g. the one deployed
    /// on-chain) instead of the embedded one.
    pub fn verify_against(&self, root: &Hash32, encoding: LeafEncoding) -> Verification {
        verify(&self.leaf, &self.siblings, root, encoding)
    }

    pub fn sibling_hexes(&self) -> Vec<String> {
        self.siblings.iter().map(hash_to_hex).collect()
    }

    pub fn root_hex(&self) -> String {
        hash_to_hex(&self.root)
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}

/// Why a proof was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    RootMismatch { computed: Hash32, expected: Hash32 },
    MalformedSibling { position: usize, detail: String },
    MalformedRoot(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::RootMismatch { computed, expected } => write!(
                f,
                "computed root {} does not match expected root {}",
                hash_to_hex(computed),
                hash_to_hex(expected)
            ),
            RejectReason::MalformedSibling { position, detail } => {
                write!(f, "sibling {} is malformed: {}", position, detail)
            }
            RejectReason::MalformedRoot(detail) => write!(f, "root is malformed: {}", detail),
        }
    }
}

/// Result of a local proof check. Never an error: callers branch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Rejected(RejectReason),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Verification::Valid => None,
            Verification::Rejected(reason) => Some(reason),
        }
    }
}

/// Fold `siblings` over the leaf hash with the commutative pair hash.
pub fn compute_root(leaf: &AllocationRecord, siblings: &[Hash32], encoding: LeafEncoding) -> Hash32 {
    siblings
        .iter()
        .fold(leaf.leaf_hash(encoding), |current, sibling| {
            hash_pair(&current, sibling)
        })
}

/// Checks a proof without any tree: recompute the leaf, fold the siblings and
/// compare the result to `root` byte for byte.
///
/// This is a fail-fast check before submitting a claim; the distributor
/// contract still performs the authoritative verification.
pub fn verify(
    leaf: &AllocationRecord,
    siblings: &[Hash32],
    root: &Hash32,
    encoding: LeafEncoding,
) -> Verification {
    let computed = compute_root(leaf, siblings, encoding);
    if computed == *root {
        Verification::Valid
    } else {
        Verification::Rejected(RejectReason::RootMismatch {
            computed,
            expected: *root,
        })
    }
}

/// Like [`verify`], for siblings and root given as untrusted hex strings.
pub fn verify_hex<S: AsRef<str>>(
    leaf: &AllocationRecord,
    siblings: &[S],
    root: &str,
    encoding: LeafEncoding,
) -> Verification {
    let root = match hash_from_hex(root) {
        Ok(root) => root,
        Err(e) => return Verification::Rejected(RejectReason::MalformedRoot(e.to_string())),
    };

    let mut parsed = Vec::with_capacity(siblings.len());
    for (position, sibling) in siblings.iter().enumerate() {
        match hash_from_hex(sibling.as_ref()) {
            Ok(hash) => parsed.push(hash),
            Err(e) => {
                return Verification::Rejected(RejectReason::MalformedSibling {
                    position,
                    detail: e.to_string(),
                })
            }
        }
    }

    verify(leaf, &parsed, &root, encoding)
}

/// Verify many proofs against the same root.
pub fn batch_verify(proofs: &[MerkleProof], root: &Hash32, encoding: LeafEncoding) -> Vec<bool> {
    proofs
        .iter()
        .map(|proof| proof.verify_against(root, encoding).is_valid())
        .collect()
}
