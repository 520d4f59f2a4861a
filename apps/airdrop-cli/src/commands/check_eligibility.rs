use crate::config::{load_optional, resolve_encoding};
use crate::error::CliResult;
use airdrop_merkle::{lookup_claim, parse_amount, ClaimLookup, InMemoryClaimStatus, LeafEncoding};
use airdrop_tree_data::read_tree_file;
use std::path::PathBuf;

pub fn execute(
    tree: PathBuf,
    address: String,
    claimed: Vec<u64>,
    config: Option<PathBuf>,
    encoding: Option<LeafEncoding>,
    elapsed: Option<u64>,
) -> CliResult<()> {
    let result = lookup(tree, &address, claimed, config, encoding)?;

    match &result {
        ClaimLookup::Eligible(payload) => {
            println!("✅ {} is eligible", payload.recipient.to_checksum());
            println!("   Index: {}", payload.index);
            println!("   Amount: {}", payload.amount);
            println!("   Campaign: {}", payload.campaign.name());

            if let Some(elapsed) = elapsed {
                let amount = parse_amount(&payload.amount)?;
                println!(
                    "   Unlocked after {}s: {}",
                    elapsed,
                    payload.campaign.unlocked_amount(amount, elapsed)
                );
            }
        }
        ClaimLookup::NotEligible { address } => {
            println!("❌ {} is not a recipient in this tree", address.to_checksum());
        }
        ClaimLookup::AlreadyClaimed { address, index } => {
            println!(
                "⏳ {} already claimed index {}",
                address.to_checksum(),
                index
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn lookup(
    tree: PathBuf,
    address: &str,
    claimed: Vec<u64>,
    config: Option<PathBuf>,
    encoding: Option<LeafEncoding>,
) -> CliResult<ClaimLookup> {
    let config = load_optional(config)?;
    let encoding = resolve_encoding(config.as_ref(), encoding)?;
    let campaign = config.map(|c| c.campaign).unwrap_or_default();

    println!("🔍 Loading tree from {}...", tree.display());
    let tree = read_tree_file(&tree, encoding)?;

    let status: InMemoryClaimStatus = claimed.into_iter().collect();
    Ok(lookup_claim(&tree, address, &status, &campaign)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use airdrop_merkle::{AllocationRecord, AllocationTree, CampaignKind, MerkleError};
    use airdrop_tree_data::{write_tree_file, DumpOptions};
    use std::fs;

    const ADDR_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1";

    fn write_tree(dir: &std::path::Path) -> PathBuf {
        let tree = AllocationTree::build(
            vec![
                AllocationRecord::parse("0", ADDR_A, "1000").unwrap(),
                AllocationRecord::parse("1", "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2", "2000")
                    .unwrap(),
            ],
            LeafEncoding::Packed,
        )
        .unwrap();
        let path = dir.join("tree.json");
        write_tree_file(&path, &tree, &DumpOptions::default()).unwrap();
        path
    }

    #[test]
    fn test_eligible_lookup_includes_calldata() {
        let dir = tempfile::tempdir().unwrap();
        let tree = write_tree(dir.path());

        let result = lookup(tree, ADDR_A, vec![], None, None).unwrap();
        match result {
            ClaimLookup::Eligible(payload) => {
                assert_eq!(payload.index, 0);
                assert!(payload.calldata.starts_with("0x3f31ae3f"));
            }
            other => panic!("expected eligible, got {:?}", other),
        }
    }

    #[test]
    fn test_claimed_and_unknown_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let tree = write_tree(dir.path());

        let result = lookup(tree.clone(), ADDR_A, vec![0], None, None).unwrap();
        assert!(matches!(
            result,
            ClaimLookup::AlreadyClaimed { index: 0, .. }
        ));

        let result = lookup(
            tree.clone(),
            "0xccccccccccccccccccccccccccccccccccccccc3",
            vec![],
            None,
            None,
        )
        .unwrap();
        assert!(matches!(result, ClaimLookup::NotEligible { .. }));

        assert!(matches!(
            lookup(tree, "0x1234", vec![], None, None),
            Err(CliError::Merkle(MerkleError::InvalidAddress(_)))
        ));
    }

    #[test]
    fn test_campaign_kind_comes_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let tree = write_tree(dir.path());
        let config = dir.path().join("campaign.yaml");
        fs::write(
            &config,
            "campaign_name: vesting\ncampaign:\n  kind: lockup-linear\n  cliff_seconds: 10\n  total_seconds: 100\n",
        )
        .unwrap();

        let result = lookup(tree, ADDR_A, vec![], Some(config), None).unwrap();
        match result {
            ClaimLookup::Eligible(payload) => assert_eq!(
                payload.campaign,
                CampaignKind::LockupLinear {
                    cliff_seconds: 10,
                    total_seconds: 100
                }
            ),
            other => panic!("expected eligible, got {:?}", other),
        }
    }
}
