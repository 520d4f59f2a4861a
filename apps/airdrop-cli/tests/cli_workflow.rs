use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn airdrop(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_airdrop"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_fixtures_to_claim_payload() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("recipients.csv");
    let tree = dir.path().join("tree.json");

    let out = airdrop(&[
        "generate-fixtures",
        "--count",
        "25",
        "--seed",
        "9",
        "--output",
        path_str(&csv),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = airdrop(&[
        "build-tree",
        "--recipients",
        path_str(&csv),
        "--output",
        path_str(&tree),
        "--with-proofs",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Merkle root: 0x"));

    let out = airdrop(&["validate-tree", "--tree", path_str(&tree)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&tree).unwrap()).unwrap();
    let recipient = document["leaves"][0]["recipient"].as_str().unwrap();
    let out = airdrop(&[
        "check-eligibility",
        "--tree",
        path_str(&tree),
        "--address",
        recipient,
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("is eligible"));
    assert!(stdout.contains("\"calldata\": \"0x3f31ae3f"));
}

#[test]
fn test_verify_proof_exit_status() {
    let root = "0xb0f4888c8d586d4ba01967ac01b8fffe0be4cc825b20d7b45013d320cf7b08fd";
    let sibling = "0x68f04131e1eb1789602f8113598934714de1e190883dc75e72ebd91b782daac1";
    let base = [
        "verify-proof",
        "--index",
        "0",
        "--recipient",
        "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1",
        "--proof",
        sibling,
        "--root",
        root,
    ];

    let mut valid = base.to_vec();
    valid.extend(["--amount", "1000"]);
    assert!(airdrop(&valid).status.success());

    let mut invalid = base.to_vec();
    invalid.extend(["--amount", "999"]);
    assert!(!airdrop(&invalid).status.success());
}

#[test]
fn test_validate_tree_rejects_edited_document() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("recipients.csv");
    let tree = dir.path().join("tree.json");
    fs::write(
        &csv,
        "index,recipient,amount\n\
         0,0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1,1000\n\
         1,0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2,2000\n",
    )
    .unwrap();

    let out = airdrop(&[
        "build-tree",
        "--recipients",
        path_str(&csv),
        "--output",
        path_str(&tree),
    ]);
    assert!(out.status.success());

    let edited = fs::read_to_string(&tree).unwrap().replace("\"2000\"", "\"2001\"");
    fs::write(&tree, edited).unwrap();

    let out = airdrop(&["validate-tree", "--tree", path_str(&tree)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("declared root"));
}
