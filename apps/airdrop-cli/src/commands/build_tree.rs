use crate::config::{load_optional, resolve_encoding};
use crate::error::CliResult;
use airdrop_merkle::{hash_to_hex, AllocationTree, LeafEncoding};
use airdrop_tree_data::{read_recipients_csv, write_tree_file, DumpOptions};
use std::path::PathBuf;
use tracing::info;

pub fn execute(
    recipients: PathBuf,
    config: Option<PathBuf>,
    encoding: Option<LeafEncoding>,
    output: PathBuf,
    with_proofs: bool,
) -> CliResult<()> {
    let config = load_optional(config)?;
    let encoding = resolve_encoding(config.as_ref(), encoding)?;

    if let Some(config) = &config {
        println!("📋 Campaign: {} ({})", config.campaign_name, config.campaign.name());
    }

    println!("📂 Reading recipients from {}...", recipients.display());
    let records = read_recipients_csv(&recipients)?;
    println!("✅ Read {} recipients", records.len());

    println!("\n🌳 Building allocation tree ({})...", encoding);
    let tree = AllocationTree::build(records, encoding)?;
    info!("Built tree with depth {}", tree.depth());

    let options = DumpOptions {
        include_proofs: with_proofs,
        ..Default::default()
    };
    write_tree_file(&output, &tree, &options)?;

    let stats = tree.stats();
    println!("✅ Wrote tree document: {}", output.display());
    println!("\n📊 Summary:");
    println!("  - Merkle root: {}", hash_to_hex(&tree.root()));
    println!("  - Recipients: {}", stats.recipient_count);
    println!("  - Total allocation: {}", stats.total_allocation);
    println!(
        "  - Allocation range: {} - {} (average {})",
        stats.min_allocation, stats.max_allocation, stats.average_allocation
    );
    println!("  - Depth: {}", stats.depth);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use airdrop_merkle::MerkleError;
    use airdrop_tree_data::read_tree_file;
    use std::fs;

    const RECIPIENTS: &str = "index,recipient,amount\n\
                              0,0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1,1000\n\
                              1,0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2,2000\n";

    #[test]
    fn test_build_tree_writes_loadable_document() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("recipients.csv");
        let out = dir.path().join("tree.json");
        fs::write(&csv, RECIPIENTS).unwrap();

        execute(csv, None, None, out.clone(), true).unwrap();

        let tree = read_tree_file(&out, LeafEncoding::Packed).unwrap();
        assert_eq!(
            hash_to_hex(&tree.root()),
            "0xb0f4888c8d586d4ba01967ac01b8fffe0be4cc825b20d7b45013d320cf7b08fd"
        );
    }

    #[test]
    fn test_build_tree_uses_config_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("recipients.csv");
        let config = dir.path().join("campaign.yaml");
        let out = dir.path().join("tree.json");
        fs::write(&csv, RECIPIENTS).unwrap();
        fs::write(&config, "campaign_name: test\nleaf_encoding: double-hashed\n").unwrap();

        execute(csv, Some(config), None, out.clone(), false).unwrap();
        assert!(read_tree_file(&out, LeafEncoding::DoubleHashed).is_ok());
    }

    #[test]
    fn test_build_tree_reports_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("recipients.csv");
        fs::write(
            &csv,
            "index,recipient,amount\n\
             0,0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1,1000\n\
             0,0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1,1000\n",
        )
        .unwrap();

        let result = execute(csv, None, None, dir.path().join("tree.json"), false);
        match result {
            Err(CliError::Merkle(MerkleError::InvalidRecords(violations))) => {
                assert_eq!(violations.len(), 2)
            }
            other => panic!("expected duplicate violations, got {:?}", other),
        }
    }
}
