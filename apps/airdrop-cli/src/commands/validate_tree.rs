use crate::config::{load_optional, resolve_encoding};
use crate::error::{CliError, CliResult};
use airdrop_merkle::{hash_from_hex, hash_to_hex, AllocationRecord, AllocationTree, LeafEncoding};
use airdrop_tree_data::{content_issues, header_issues, TreeDocument};
use std::fs;
use std::path::PathBuf;

/// Audit a tree document without trusting it: rebuild from the leaves with no
/// structural checks, then run the full integrity scan and compare roots.
pub fn execute(
    tree: PathBuf,
    config: Option<PathBuf>,
    encoding: Option<LeafEncoding>,
) -> CliResult<()> {
    let config = load_optional(config)?;
    let encoding = resolve_encoding(config.as_ref(), encoding)?;

    println!("🔍 Validating {} ({})...", tree.display(), encoding);
    let issues = audit(&fs::read_to_string(&tree)?, encoding)?;

    if issues.is_empty() {
        println!("✅ Tree is valid");
        return Ok(());
    }

    println!("❌ Found {} issue(s):", issues.len());
    for issue in &issues {
        println!("   - {}", issue);
    }
    Err(CliError::IntegrityFailed(issues.len()))
}

/// Every problem found, rendered for display. Covers everything the loader
/// refuses, but keeps going past the first problem. Malformed leaves abort the
/// audit since no tree can be built from them.
pub fn audit(json: &str, encoding: LeafEncoding) -> CliResult<Vec<String>> {
    let document: TreeDocument = serde_json::from_str(json)?;
    let mut issues: Vec<String> = header_issues(&document, encoding)
        .iter()
        .map(ToString::to_string)
        .collect();

    let records = document
        .leaves
        .iter()
        .enumerate()
        .map(|(position, leaf)| {
            AllocationRecord::parse(&leaf.index, &leaf.recipient, &leaf.amount).map_err(|e| {
                CliError::InvalidArgument(format!("leaf {} is malformed: {}", position, e))
            })
        })
        .collect::<CliResult<Vec<_>>>()?;

    let tree = AllocationTree::build_unvalidated(records, encoding)?;
    let report = tree.validate_integrity();
    issues.extend(report.errors.iter().map(ToString::to_string));

    match hash_from_hex(&document.root) {
        Ok(declared) if declared != tree.root() => issues.push(format!(
            "declared root {} differs from recomputed root {}",
            hash_to_hex(&declared),
            hash_to_hex(&tree.root())
        )),
        Ok(_) => {}
        Err(e) => issues.push(format!("declared root is malformed: {}", e)),
    }

    issues.extend(
        content_issues(&document, &tree)
            .iter()
            .map(ToString::to_string),
    );

    Ok(issues)
}
