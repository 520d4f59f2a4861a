use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::errors::MerkleResult;
use crate::hasher::{hash_to_hex, keccak256, Hash32};
use crate::proof::MerkleProof;
use crate::{Address, AllocationTree, CampaignKind};

/// Solidity signature of the distributor's claim entrypoint.
pub const CLAIM_SIGNATURE: &str = "claim(uint256,address,uint128,bytes32[])";

/// Arguments for one on-chain claim, in the order the distributor takes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCall {
    pub index: u64,
    pub recipient: Address,
    pub amount: u128,
    pub merkle_proof: Vec<Hash32>,
}

impl ClaimCall {
    pub fn from_proof(proof: &MerkleProof) -> Self {
        Self {
            index: proof.leaf.index,
            recipient: proof.leaf.recipient,
            amount: proof.leaf.amount,
            merkle_proof: proof.siblings.clone(),
        }
    }

    pub fn selector() -> [u8; 4] {
        let digest = keccak256(CLAIM_SIGNATURE.as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// ABI-encoded call data: selector, three static words, the offset of the
    /// dynamic `bytes32[]`, then its length and elements.
    pub fn calldata(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 32 * (5 + self.merkle_proof.len()));
        out.extend_from_slice(&Self::selector());
        out.extend_from_slice(&word(self.index as u128));

        let mut recipient = [0u8; 32];
        recipient[12..].copy_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&recipient);

        out.extend_from_slice(&word(self.amount));
        // four head words precede the array
        out.extend_from_slice(&word(4 * 32));
        out.extend_from_slice(&word(self.merkle_proof.len() as u128));
        for sibling in &self.merkle_proof {
            out.extend_from_slice(sibling);
        }
        out
    }

    pub fn to_hex_calldata(&self) -> String {
        format!("0x{}", hex::encode(self.calldata()))
    }
}

fn word(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Everything a wallet needs to submit a claim. Amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimPayload {
    pub campaign: CampaignKind,
    pub index: u64,
    pub recipient: Address,
    pub amount: String,
    pub merkle_proof: Vec<String>,
    pub root: String,
    pub calldata: String,
}

impl ClaimPayload {
    pub fn new(campaign: &CampaignKind, proof: &MerkleProof) -> Self {
        let call = ClaimCall::from_proof(proof);
        Self {
            campaign: campaign.clone(),
            index: call.index,
            recipient: call.recipient,
            amount: call.amount.to_string(),
            merkle_proof: proof.sibling_hexes(),
            root: hash_to_hex(&proof.root),
            calldata: call.to_hex_calldata(),
        }
    }
}

/// Read access to the distributor's claimed bitmap.
///
/// Implementations wrap a chain read; the engine only asks whether an index
/// has been claimed.
pub trait ClaimStatusSource {
    fn is_claimed(&self, index: u64) -> MerkleResult<bool>;
}

/// Claim status held in memory, for offline checks and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimStatus {
    claimed: HashSet<u64>,
}

impl InMemoryClaimStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_claimed(&mut self, index: u64) {
        self.claimed.insert(index);
    }
}

impl FromIterator<u64> for InMemoryClaimStatus {
    fn from_iter<T: IntoIterator<Item = u64>>(iter: T) -> Self {
        Self {
            claimed: iter.into_iter().collect(),
        }
    }
}

impl ClaimStatusSource for InMemoryClaimStatus {
    fn is_claimed(&self, index: u64) -> MerkleResult<bool> {
        Ok(self.claimed.contains(&index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ClaimLookup {
    Eligible(ClaimPayload),
    NotEligible { address: Address },
    AlreadyClaimed { address: Address, index: u64 },
}

/// Resolve what the UI should show for an address: a ready-to-submit payload,
/// not eligible, or already claimed according to `status`.
pub fn lookup_claim(
    tree: &AllocationTree,
    address: &str,
    status: &dyn ClaimStatusSource,
    campaign: &CampaignKind,
) -> MerkleResult<ClaimLookup> {
    let eligibility = tree.check_eligibility(address)?;
    let address = eligibility.address;

    let Some(proof) = eligibility.proof else {
        debug!("{} is not a recipient", address);
        return Ok(ClaimLookup::NotEligible { address });
    };

    if status.is_claimed(proof.leaf.index)? {
        return Ok(ClaimLookup::AlreadyClaimed {
            address,
            index: proof.leaf.index,
        });
    }

    Ok(ClaimLookup::Eligible(ClaimPayload::new(campaign, &proof)))
}
