use crate::error::{CliError, CliResult};
use airdrop_merkle::{verify_hex, AllocationRecord, LeafEncoding, Verification};

pub fn execute(
    index: String,
    recipient: String,
    amount: String,
    proof: Vec<String>,
    root: String,
    encoding: LeafEncoding,
) -> CliResult<()> {
    let leaf = AllocationRecord::parse(&index, &recipient, &amount)?;
    println!(
        "🔍 Verifying index {} for {} ({} siblings, {})",
        leaf.index,
        leaf.recipient.to_checksum(),
        proof.len(),
        encoding
    );

    match verify_hex(&leaf, proof.as_slice(), &root, encoding) {
        Verification::Valid => {
            println!("✅ Proof is valid");
            Ok(())
        }
        Verification::Rejected(reason) => {
            println!("❌ Proof rejected: {}", reason);
            Err(CliError::ProofRejected(reason.to_string()))
        }
    }
}
