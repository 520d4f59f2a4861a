/*!
# Tree Document Adapter

Converts between [`AllocationTree`] and the portable JSON [`TreeDocument`].

Loading never trusts the document: the tree is rebuilt from the leaves and the
recomputed root must equal the declared one. Metadata and cached proofs, when
present, must agree with the rebuilt tree too.
*/

use crate::{
    errors::{DataError, DataResult},
    schemas::{LeafEntry, TreeDocument, TreeMetadata, CURRENT_FORMAT_VERSION},
};
use airdrop_merkle::{
    hash_from_hex, hash_to_hex, AllocationRecord, AllocationTree, Hash32, LeafEncoding,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::ops::Deref;
use std::path::Path;
use tracing::{debug, error, info};

/// A tree rebuilt from a document whose declared root it reproduces.
#[derive(Debug, Clone)]
pub struct VerifiedTree {
    tree: AllocationTree,
    metadata: Option<TreeMetadata>,
}

impl VerifiedTree {
    pub fn tree(&self) -> &AllocationTree {
        &self.tree
    }

    pub fn metadata(&self) -> Option<&TreeMetadata> {
        self.metadata.as_ref()
    }

    pub fn into_tree(self) -> AllocationTree {
        self.tree
    }
}

impl Deref for VerifiedTree {
    type Target = AllocationTree;

    fn deref(&self) -> &AllocationTree {
        &self.tree
    }
}

#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Embed each leaf's sibling path
    pub include_proofs: bool,
    /// Defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

// ================================================================================================
// Load
// ================================================================================================

/// Parse and verify a JSON tree document.
pub fn load(json: &str, encoding: LeafEncoding) -> DataResult<VerifiedTree> {
    let document: TreeDocument = serde_json::from_str(json)?;
    load_document(document, encoding)
}

/// Verify an already-parsed document and rebuild its tree.
pub fn load_document(document: TreeDocument, encoding: LeafEncoding) -> DataResult<VerifiedTree> {
    first_issue(header_issues(&document, encoding))?;

    let declared_root = hash_from_hex(&document.root).map_err(|source| DataError::InvalidEntry {
        context: "root".to_string(),
        source,
    })?;

    let records = document
        .leaves
        .iter()
        .enumerate()
        .map(|(position, entry)| parse_entry(entry, position))
        .collect::<DataResult<Vec<_>>>()?;

    let tree = AllocationTree::build(records, encoding)?;

    if tree.root() != declared_root {
        let computed = hash_to_hex(&tree.root());
        error!(
            "Tree document root {} does not match recomputed root {}",
            document.root, computed
        );
        return Err(DataError::RootMismatch {
            expected: hash_to_hex(&declared_root),
            computed,
        });
    }

    first_issue(content_issues(&document, &tree))?;

    info!(
        "Loaded tree {} ({} leaves, {})",
        hash_to_hex(&tree.root()),
        tree.leaf_count(),
        encoding
    );

    Ok(VerifiedTree {
        tree,
        metadata: document.metadata,
    })
}

fn first_issue(issues: Vec<DataError>) -> DataResult<()> {
    match issues.into_iter().next() {
        Some(issue) => Err(issue),
        None => Ok(()),
    }
}

/// Format version and leaf encoding declared in the metadata, checked against
/// what this build reads and the configured `encoding`.
pub fn header_issues(document: &TreeDocument, encoding: LeafEncoding) -> Vec<DataError> {
    let mut issues = Vec::new();
    let Some(metadata) = &document.metadata else {
        return issues;
    };

    if let Some(version) = &metadata.format_version {
        if major_version(version) != major_version(CURRENT_FORMAT_VERSION) {
            issues.push(DataError::VersionMismatch {
                expected: CURRENT_FORMAT_VERSION.to_string(),
                found: version.clone(),
            });
        }
    }

    if let Some(declared) = metadata.leaf_encoding {
        if declared != encoding {
            issues.push(DataError::EncodingMismatch {
                expected: encoding.to_string(),
                found: declared.to_string(),
            });
        }
    }

    issues
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn parse_entry(entry: &LeafEntry, position: usize) -> DataResult<AllocationRecord> {
    AllocationRecord::parse(&entry.index, &entry.recipient, &entry.amount).map_err(|source| {
        DataError::InvalidEntry {
            context: format!("leaf {}", position),
            source,
        }
    })
}

/// Metadata totals and embedded proofs that disagree with `tree`, the tree
/// rebuilt from the document's own leaves.
pub fn content_issues(document: &TreeDocument, tree: &AllocationTree) -> Vec<DataError> {
    let mut issues = Vec::new();
    if let Some(metadata) = &document.metadata {
        metadata_issues(metadata, tree, &mut issues);
    }
    cached_proof_issues(&document.leaves, tree, &mut issues);
    issues
}

fn metadata_issues(metadata: &TreeMetadata, tree: &AllocationTree, issues: &mut Vec<DataError>) {
    if let Some(count) = metadata.recipient_count {
        if count != tree.leaf_count() {
            issues.push(DataError::MetadataMismatch(format!(
                "recipientCount is {} but the document has {} leaves",
                count,
                tree.leaf_count()
            )));
        }
    }

    if let Some(total) = &metadata.total_allocation {
        let actual = tree.total_allocation().to_string();
        if total.trim() != actual {
            issues.push(DataError::MetadataMismatch(format!(
                "totalAllocation is {} but the leaves sum to {}",
                total, actual
            )));
        }
    }
}

fn cached_proof_issues(entries: &[LeafEntry], tree: &AllocationTree, issues: &mut Vec<DataError>) {
    let before = issues.len();

    for (position, entry) in entries.iter().enumerate() {
        let Some(cached) = &entry.proof else {
            continue;
        };

        let index = match airdrop_merkle::parse_index(&entry.index) {
            Ok(index) => index,
            Err(source) => {
                issues.push(DataError::InvalidEntry {
                    context: format!("index of leaf {}", position),
                    source,
                });
                continue;
            }
        };
        let cached = match cached
            .iter()
            .map(|s| hash_from_hex(s))
            .collect::<Result<Vec<Hash32>, _>>()
        {
            Ok(cached) => cached,
            Err(source) => {
                issues.push(DataError::InvalidEntry {
                    context: format!("proof of leaf {}", position),
                    source,
                });
                continue;
            }
        };

        let matches = tree
            .proof_for_index(index)
            .map(|proof| proof.siblings == cached)
            .unwrap_or(false);
        if !matches {
            issues.push(DataError::CachedProofMismatch { index });
        }
    }

    if issues.len() == before {
        debug!("Cached proofs agree with rebuilt tree");
    }
}

// ================================================================================================
// Dump
// ================================================================================================

/// Serialize a tree into a document whose leaves are in index order.
pub fn dump(tree: &AllocationTree, options: &DumpOptions) -> TreeDocument {
    let leaves = tree
        .records()
        .iter()
        .map(|record| LeafEntry {
            index: record.index.to_string(),
            recipient: record.recipient.to_checksum(),
            amount: record.amount.to_string(),
            proof: options.include_proofs.then(|| {
                tree.proof_for_index(record.index)
                    .map(|proof| proof.sibling_hexes())
                    .unwrap_or_default()
            }),
        })
        .collect();

    TreeDocument {
        root: hash_to_hex(&tree.root()),
        leaves,
        metadata: Some(TreeMetadata {
            recipient_count: Some(tree.leaf_count()),
            total_allocation: Some(tree.total_allocation().to_string()),
            created_at: Some(options.created_at.unwrap_or_else(Utc::now)),
            format_version: Some(CURRENT_FORMAT_VERSION.to_string()),
            leaf_encoding: Some(tree.encoding()),
        }),
    }
}

pub fn to_json_string(tree: &AllocationTree, options: &DumpOptions) -> DataResult<String> {
    Ok(serde_json::to_string_pretty(&dump(tree, options))?)
}

// ================================================================================================
// Files
// ================================================================================================

pub fn read_tree_file<P: AsRef<Path>>(path: P, encoding: LeafEncoding) -> DataResult<VerifiedTree> {
    let json = fs::read_to_string(path)?;
    load(&json, encoding)
}

pub fn write_tree_file<P: AsRef<Path>>(
    path: P,
    tree: &AllocationTree,
    options: &DumpOptions,
) -> DataResult<()> {
    fs::write(path, to_json_string(tree, options)?)?;
    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================
