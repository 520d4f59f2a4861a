use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::errors::MerkleError;
use crate::Address;

/// A 32-byte Keccak-256 digest.
pub type Hash32 = [u8; 32];

/// How an allocation record is turned into a leaf hash.
///
/// ## ⚠️ Must match the deployed distributor
///
/// The leaf encoding is part of the on-chain verifier. It is chosen once per
/// campaign and every tree, proof and verification for that campaign must use
/// the same value:
///
/// - `Packed`: `keccak256(abi.encodePacked(uint256 index, address recipient, uint128 amount))`
///   (32 + 20 + 16 = 68 bytes)
/// - `DoubleHashed`: `keccak256(bytes.concat(keccak256(abi.encode(uint256 index, address recipient, uint128 amount))))`
///   (3 × 32 = 96 bytes, hashed twice)
///
/// Internal nodes are always `keccak256(min(a, b) || max(a, b))` with the last
/// node of an odd level paired with itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeafEncoding {
    #[default]
    Packed,
    DoubleHashed,
}

impl LeafEncoding {
    /// Serialize the leaf fields exactly as the verifier does before hashing.
    pub fn encode(&self, index: u64, recipient: &Address, amount: u128) -> Vec<u8> {
        match self {
            LeafEncoding::Packed => {
                let mut out = Vec::with_capacity(68);
                out.extend_from_slice(&uint256_be(index as u128));
                out.extend_from_slice(recipient.as_bytes());
                out.extend_from_slice(&amount.to_be_bytes());
                out
            }
            LeafEncoding::DoubleHashed => {
                let mut out = Vec::with_capacity(96);
                out.extend_from_slice(&uint256_be(index as u128));
                out.extend_from_slice(&address_word(recipient));
                out.extend_from_slice(&uint256_be(amount));
                out
            }
        }
    }

    /// Hash one allocation into its leaf.
    pub fn hash_leaf(&self, index: u64, recipient: &Address, amount: u128) -> Hash32 {
        let encoded = self.encode(index, recipient, amount);
        match self {
            LeafEncoding::Packed => keccak256(&encoded),
            LeafEncoding::DoubleHashed => keccak256(&keccak256(&encoded)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeafEncoding::Packed => "packed",
            LeafEncoding::DoubleHashed => "double-hashed",
        }
    }
}

impl std::fmt::Display for LeafEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LeafEncoding {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "packed" => Ok(LeafEncoding::Packed),
            "double-hashed" => Ok(LeafEncoding::DoubleHashed),
            _ => Err(MerkleError::UnknownEncoding(s.to_string())),
        }
    }
}

pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256::digest(data).into()
}

/// Commutative parent hash: the two children are ordered byte-wise before
/// concatenation, so `hash_pair(a, b) == hash_pair(b, a)`.
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(lo)
        .chain_update(hi)
        .finalize()
        .into()
}

/// `0x`-prefixed lowercase hex.
pub fn hash_to_hex(hash: &Hash32) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a 32-byte hash, `0x` or `0X` prefix optional.
pub fn hash_from_hex(input: &str) -> Result<Hash32, MerkleError> {
    let trimmed = input.trim();
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if cleaned.len() != 64 {
        return Err(MerkleError::InvalidHash(format!(
            "expected 64 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut out)
        .map_err(|e| MerkleError::InvalidHash(e.to_string()))?;
    Ok(out)
}

fn uint256_be(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}
