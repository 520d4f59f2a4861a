/*!
# Airdrop Merkle Allocation Engine

Builds the Merkle tree that an on-chain distributor verifies claims against,
and derives and checks inclusion proofs for it.

## Hashing scheme

The scheme is fixed by the deployed distributor and must be reproduced byte
for byte:

- **Leaf**: [`LeafEncoding`] of `(uint256 index, address recipient, uint128 amount)`,
  Keccak-256 (`packed`) or Keccak-256 twice over the ABI-encoded words (`double-hashed`)
- **Parent**: `keccak256(min(a, b) || max(a, b))`, so proofs carry no left/right flags
- **Odd level**: the last node is paired with itself
- **Leaf order**: ascending `index`, so the root is a function of the record set only

## Usage

```rust
use airdrop_merkle::{AllocationRecord, AllocationTree, LeafEncoding, MerkleResult};

fn example() -> MerkleResult<()> {
    let records = vec![
        AllocationRecord::parse("0", "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1", "1000")?,
        AllocationRecord::parse("1", "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2", "2000")?,
    ];
    let tree = AllocationTree::build(records, LeafEncoding::Packed)?;

    let eligibility = tree.check_eligibility("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA1")?;
    if let Some(proof) = eligibility.proof {
        assert!(proof.verify(tree.encoding()).is_valid());
    }
    Ok(())
}
```
*/

pub mod address;
pub mod campaign;
pub mod claim;
pub mod eligibility;
pub mod errors;
pub mod hasher;
pub mod proof;
pub mod record;
pub mod tree;

pub use address::Address;
pub use campaign::{CampaignKind, Tranche};
pub use claim::{
    lookup_claim, ClaimCall, ClaimLookup, ClaimPayload, ClaimStatusSource, InMemoryClaimStatus,
};
pub use eligibility::{AllocationStats, BatchEligibility, Eligibility, IntegrityIssue, IntegrityReport};
pub use errors::{MerkleError, MerkleResult, RecordViolation};
pub use hasher::{hash_from_hex, hash_pair, hash_to_hex, keccak256, Hash32, LeafEncoding};
pub use proof::{batch_verify, compute_root, verify, verify_hex, MerkleProof, RejectReason, Verification};
pub use record::{parse_amount, parse_index, AllocationRecord};
pub use tree::{AllocationTree, LeafQuery, TreeNode};
