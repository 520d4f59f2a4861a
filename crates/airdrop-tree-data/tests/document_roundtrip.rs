use airdrop_merkle::{hash_to_hex, AllocationTree, LeafEncoding};
use airdrop_tree_data::{
    load, read_recipients_csv, read_tree_file, to_json_string, write_tree_file, DataError,
    DumpOptions,
};
use std::fs;

const RECIPIENTS: &str = "index,recipient,amount\n\
                          1,0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB2,2000\n\
                          0,0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1,1000\n";

const GOLDEN_PACKED_ROOT: &str =
    "0xb0f4888c8d586d4ba01967ac01b8fffe0be4cc825b20d7b45013d320cf7b08fd";

#[test]
fn test_csv_to_document_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("recipients.csv");
    let tree_path = dir.path().join("tree.json");
    fs::write(&csv_path, RECIPIENTS).unwrap();

    let records = read_recipients_csv(&csv_path).unwrap();
    let tree = AllocationTree::build(records, LeafEncoding::Packed).unwrap();
    assert_eq!(hash_to_hex(&tree.root()), GOLDEN_PACKED_ROOT);

    let options = DumpOptions {
        include_proofs: true,
        ..Default::default()
    };
    write_tree_file(&tree_path, &tree, &options).unwrap();

    let loaded = read_tree_file(&tree_path, LeafEncoding::Packed).unwrap();
    assert_eq!(loaded.root(), tree.root());
    assert_eq!(loaded.records()[0].index, 0);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&tree_path).unwrap()).unwrap();
    assert_eq!(json["root"], GOLDEN_PACKED_ROOT);
    assert_eq!(json["leaves"][0]["amount"], "1000");
    assert_eq!(json["metadata"]["formatVersion"], "1.0");
    assert_eq!(json["metadata"]["leafEncoding"], "packed");
    assert_eq!(json["metadata"]["totalAllocation"], "3000");
}

#[test]
fn test_edited_document_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("recipients.csv");
    fs::write(&csv_path, RECIPIENTS).unwrap();
    let tree =
        AllocationTree::build(read_recipients_csv(&csv_path).unwrap(), LeafEncoding::Packed)
            .unwrap();

    let json = to_json_string(&tree, &DumpOptions::default()).unwrap();
    let mut document: serde_json::Value = serde_json::from_str(&json).unwrap();
    document["leaves"][1]["amount"] = "20000".into();
    document["metadata"]["totalAllocation"] = "21000".into();

    let result = load(&document.to_string(), LeafEncoding::Packed);
    assert!(matches!(result, Err(DataError::RootMismatch { .. })));
}

#[test]
fn test_document_loaded_with_wrong_encoding_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("recipients.csv");
    fs::write(&csv_path, RECIPIENTS).unwrap();
    let tree =
        AllocationTree::build(read_recipients_csv(&csv_path).unwrap(), LeafEncoding::Packed)
            .unwrap();

    let json = to_json_string(&tree, &DumpOptions::default()).unwrap();
    let mut document: serde_json::Value = serde_json::from_str(&json).unwrap();
    document.as_object_mut().unwrap().remove("metadata");

    // without metadata the mismatch still shows up as a different root
    let result = load(&document.to_string(), LeafEncoding::DoubleHashed);
    assert!(matches!(result, Err(DataError::RootMismatch { .. })));
}
