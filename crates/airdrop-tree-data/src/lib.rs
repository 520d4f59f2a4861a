/*!
# Airdrop Tree Data

Everything that moves an allocation tree across a process boundary.

## Purpose

The campaign generator publishes a tree document once; claim frontends, the
CLI and auditors load it later. This crate is the single source of truth for
that contract:

- **`schemas`**: the JSON tree document and the recipients CSV row
- **`adapter`**: load (with root cross-check) and dump of tree documents
- **`recipients`**: header-validated recipients CSV I/O
- **`store`**: async document stores, retrying fetch, and the tree handle
  that keeps the trusted tree in step with the on-chain root

A loaded document is never trusted as-is. The tree is rebuilt from its leaves
and the recomputed root must equal the declared root, otherwise loading fails.

## Usage

```rust
use airdrop_merkle::LeafEncoding;
use airdrop_tree_data::{read_recipients_csv, read_tree_file, DataResult};

fn example() -> DataResult<()> {
    let records = read_recipients_csv("recipients.csv")?;
    let tree = read_tree_file("tree.json", LeafEncoding::Packed)?;

    for record in &records {
        assert!(tree.contains(&record.recipient));
    }
    Ok(())
}
```
*/

pub mod adapter;
pub mod errors;
pub mod recipients;
pub mod schemas;
pub mod store;

// Re-export main types for convenience
pub use adapter::{
    content_issues, dump, header_issues, load, load_document, read_tree_file, to_json_string,
    write_tree_file, DumpOptions, VerifiedTree,
};
pub use errors::{DataError, DataResult};
pub use recipients::{read_recipients, read_recipients_csv, write_recipients, write_recipients_csv};
pub use schemas::{
    LeafEntry, RecipientRow, TreeDocument, TreeMetadata, CURRENT_FORMAT_VERSION,
    RECIPIENTS_CSV_HEADERS,
};
pub use store::{fetch_verified_tree, FileTreeStore, RetryPolicy, TreeHandle, TreeStore};
